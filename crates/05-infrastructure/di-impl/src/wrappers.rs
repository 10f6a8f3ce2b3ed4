//! 非硬依赖的包装类型
//!
//! - [`Provider`]：延迟调用，每次 `get` 都调用一次目标访问器
//! - [`LazyRef`]：首次 `get` 时解析并缓存
//! - [`OptionalRef`]：目标是否存在在构建期确定，缺失时不影响创建

use once_cell::sync::OnceCell;
use std::fmt;
use std::sync::Arc;

/// 延迟调用包装
pub struct Provider<T> {
    supplier: Arc<dyn Fn() -> T + Send + Sync>,
}

impl<T> Provider<T> {
    /// 创建包装
    pub fn new<F>(supplier: F) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        Self {
            supplier: Arc::new(supplier),
        }
    }

    /// 调用目标访问器
    pub fn get(&self) -> T {
        (self.supplier)()
    }
}

impl<T> Clone for Provider<T> {
    fn clone(&self) -> Self {
        Self {
            supplier: Arc::clone(&self.supplier),
        }
    }
}

impl<T> fmt::Debug for Provider<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Provider(..)")
    }
}

/// 惰性引用
pub struct LazyRef<T> {
    value: OnceCell<T>,
    supplier: Box<dyn Fn() -> T + Send + Sync>,
}

impl<T> LazyRef<T> {
    /// 创建惰性引用
    pub fn new<F>(supplier: F) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        Self {
            value: OnceCell::new(),
            supplier: Box::new(supplier),
        }
    }

    /// 获取目标，首次调用时解析
    pub fn get(&self) -> &T {
        self.value.get_or_init(|| (self.supplier)())
    }

    /// 是否已经解析
    pub fn is_resolved(&self) -> bool {
        self.value.get().is_some()
    }
}

impl<T: fmt::Debug> fmt::Debug for LazyRef<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyRef")
            .field("value", &self.value.get())
            .finish()
    }
}

/// 可选依赖
pub enum OptionalRef<T> {
    /// 目标存在，首次访问时解析
    Present(LazyRef<T>),
    /// 目标不存在
    Absent,
}

impl<T> OptionalRef<T> {
    /// 目标存在
    pub fn present<F>(supplier: F) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        Self::Present(LazyRef::new(supplier))
    }

    /// 目标不存在
    pub fn absent() -> Self {
        Self::Absent
    }

    /// 是否存在
    pub fn is_present(&self) -> bool {
        matches!(self, Self::Present(_))
    }

    /// 获取目标
    pub fn get(&self) -> Option<&T> {
        match self {
            Self::Present(lazy) => Some(lazy.get()),
            Self::Absent => None,
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for OptionalRef<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Present(lazy) => f.debug_tuple("Present").field(lazy).finish(),
            Self::Absent => f.write_str("Absent"),
        }
    }
}
