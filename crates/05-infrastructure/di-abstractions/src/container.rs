//! 应用上下文抽象接口
//!
//! 不存在进程级的全局注册表：应用上下文由启动代码显式创建并持有，
//! 需要的地方显式传递。

use crate::registry::ComponentLookup;
use async_trait::async_trait;
use infrastructure_common::{LifecycleError, LifecycleState};
use std::sync::Arc;

/// 应用上下文 trait
#[async_trait]
pub trait ApplicationContext: Send + Sync {
    /// 上下文标识
    fn id(&self) -> &str;

    /// 当前状态
    fn state(&self) -> LifecycleState;

    /// 启动：创建所有非惰性单例并执行创建后钩子
    async fn start(&self) -> Result<(), LifecycleError>;

    /// 停止：按创建的逆序执行销毁前钩子
    async fn stop(&self) -> Result<(), LifecycleError>;

    /// 组件查找入口
    fn lookup(&self) -> Arc<dyn ComponentLookup>;
}
