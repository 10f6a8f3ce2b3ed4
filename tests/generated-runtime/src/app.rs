//! 清单中声明的组件

use di_impl::{OptionalRef, Provider};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

static SERIAL: AtomicUsize = AtomicUsize::new(0);

/// 全局递增的创建序号
fn next_serial() -> usize {
    SERIAL.fetch_add(1, Ordering::SeqCst)
}

/// 依赖 B，创建后启动
pub struct A {
    pub serial: usize,
    pub b: Arc<B>,
    started: AtomicBool,
}

impl A {
    pub fn new(b: Arc<B>) -> Self {
        Self {
            serial: next_serial(),
            b,
            started: AtomicBool::new(false),
        }
    }

    pub fn start(&self) {
        self.started.store(true, Ordering::SeqCst);
    }

    pub fn is_started(&self) -> bool {
        self.started.load(Ordering::SeqCst)
    }
}

/// 依赖 C，销毁前关闭
pub struct B {
    pub serial: usize,
    pub c: Arc<C>,
    closed: AtomicBool,
}

impl B {
    pub fn new(c: Arc<C>) -> Self {
        Self {
            serial: next_serial(),
            c,
            closed: AtomicBool::new(false),
        }
    }

    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

pub struct C {
    pub serial: usize,
}

impl C {
    pub fn new() -> Self {
        Self {
            serial: next_serial(),
        }
    }
}

/// 原型：构造注入 A，方法注入 C
pub struct Request {
    pub serial: usize,
    pub a: Arc<A>,
    clock: Option<Arc<C>>,
}

impl Request {
    pub fn new(a: Arc<A>) -> Self {
        Self {
            serial: next_serial(),
            a,
            clock: None,
        }
    }

    pub fn attach(&mut self, clock: Arc<C>) {
        self.clock = Some(clock);
    }

    pub fn clock(&self) -> Option<&Arc<C>> {
        self.clock.as_ref()
    }
}

/// 没有注册为组件
pub struct Audit;

/// 可选依赖缺失，Provider 依赖存在
pub struct Report {
    pub audit: OptionalRef<Arc<Audit>>,
    pub clock: Provider<Arc<C>>,
}

impl Report {
    pub fn new(audit: OptionalRef<Arc<Audit>>, clock: Provider<Arc<C>>) -> Self {
        Self { audit, clock }
    }
}

pub trait Store: Send + Sync {
    fn label(&self) -> &'static str;
}

#[derive(Default)]
pub struct MemoryStore;

impl Store for MemoryStore {
    fn label(&self) -> &'static str {
        "memory"
    }
}

#[derive(Default)]
pub struct DiskStore;

impl Store for DiskStore {
    fn label(&self) -> &'static str {
        "disk"
    }
}

/// 按能力类型注入存储
pub struct Catalog {
    pub store: Arc<dyn Store>,
}

impl Catalog {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }
}

#[derive(Default)]
pub struct Lookup;

#[derive(Default)]
pub struct CreateA;
