//! 单例单元
//!
//! 惰性或带注入的单例使用双重检查加锁：先无锁读取，未命中时加锁、再次检查、
//! 构造、发布、释放锁。实例只在注入和生命周期钩子全部完成后才发布。

use once_cell::sync::OnceCell;
use parking_lot::Mutex;

/// 双重检查加锁的单例单元
pub struct SingletonCell<T> {
    value: OnceCell<T>,
    lock: Mutex<()>,
}

impl<T> SingletonCell<T> {
    /// 创建空单元
    pub const fn new() -> Self {
        Self {
            value: OnceCell::new(),
            lock: parking_lot::const_mutex(()),
        }
    }

    /// 创建已填充的单元
    pub fn initialized(value: T) -> Self {
        Self {
            value: OnceCell::with_value(value),
            lock: Mutex::new(()),
        }
    }

    /// 无锁读取
    pub fn get(&self) -> Option<&T> {
        self.value.get()
    }

    /// 是否已发布实例
    pub fn is_initialized(&self) -> bool {
        self.value.get().is_some()
    }
}

impl<T: Clone> SingletonCell<T> {
    /// 获取实例，必要时构造
    pub fn get_or_init<F>(&self, init: F) -> T
    where
        F: FnOnce() -> T,
    {
        if let Some(value) = self.value.get() {
            return value.clone();
        }
        let _guard = self.lock.lock();
        if let Some(value) = self.value.get() {
            return value.clone();
        }
        let value = init();
        // 持有锁时只有当前线程会写入
        let _ = self.value.set(value.clone());
        value
    }

    /// 获取实例，构造可能失败，失败时不发布
    pub fn get_or_try_init<E, F>(&self, init: F) -> Result<T, E>
    where
        F: FnOnce() -> Result<T, E>,
    {
        if let Some(value) = self.value.get() {
            return Ok(value.clone());
        }
        let _guard = self.lock.lock();
        if let Some(value) = self.value.get() {
            return Ok(value.clone());
        }
        let value = init()?;
        let _ = self.value.set(value.clone());
        Ok(value)
    }
}

impl<T> Default for SingletonCell<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for SingletonCell<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SingletonCell")
            .field("value", &self.value.get())
            .finish()
    }
}
