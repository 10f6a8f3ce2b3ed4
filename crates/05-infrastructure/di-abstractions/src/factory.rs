//! 组件工厂抽象接口
//!
//! 间接生成策略为每个组件生成一个工厂实现：创建例程加上生命周期钩子例程。

use crate::registry::ComponentLookup;
use std::any::Any;
use std::sync::Arc;

/// 类型擦除后的组件实例
pub type Instance = Arc<dyn Any + Send + Sync>;

/// 组件工厂 trait
///
/// 由生成代码实现，创建过程只包含直接调用，不依赖运行时反射。
pub trait ComponentFactory: Send + Sync {
    /// 组件类型的完全限定名称
    fn type_name(&self) -> &'static str;

    /// 创建时需要从注册表查询的组件类型
    fn dependencies(&self) -> &'static [&'static str] {
        &[]
    }

    /// 创建组件实例，所有注入点通过注册表递归满足
    fn create(&self, lookup: &Arc<dyn ComponentLookup>) -> Instance;

    /// 创建完成后调用
    fn post_create(&self, _instance: &Instance) {}

    /// 销毁前调用
    fn pre_destroy(&self, _instance: &Instance) {}
}

impl std::fmt::Debug for dyn ComponentFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentFactory")
            .field("type_name", &self.type_name())
            .field("dependencies", &self.dependencies())
            .finish()
    }
}
