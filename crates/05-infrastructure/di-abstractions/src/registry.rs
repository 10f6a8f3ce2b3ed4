//! 组件注册表抽象接口
//!
//! 生成的注册表提供三种查找方式：按具体类型、按名称、按能力类型（一对多）。

use crate::factory::{ComponentFactory, Instance};
use std::any::Any;
use std::sync::{Arc, Weak};

/// 能力类型视图，内部装着 `Arc<dyn Capability>`
pub type CapabilityView = Box<dyn Any + Send + Sync>;

/// 组件查找 trait
pub trait ComponentLookup: Send + Sync {
    /// 按具体类型获取实例
    fn get_by_type(&self, type_name: &str) -> Option<Instance>;

    /// 按名称获取实例
    fn get_by_name(&self, name: &str) -> Option<Instance>;

    /// 按能力类型获取实例，多个实现时取最后注册的
    fn get_capability(&self, capability: &str) -> Option<CapabilityView>;

    /// 按能力类型获取全部实例，按注册顺序
    fn get_all_capability(&self, capability: &str) -> Vec<CapabilityView>;

    /// 按具体类型查找工厂
    fn factory_by_type(&self, type_name: &str) -> Option<Arc<dyn ComponentFactory>>;

    /// 按名称查找工厂
    fn factory_by_name(&self, name: &str) -> Option<Arc<dyn ComponentFactory>>;

    /// 按能力类型查找全部工厂
    fn factories_by_capability(&self, capability: &str) -> Vec<Arc<dyn ComponentFactory>>;

    /// 是否注册了指定类型
    fn contains(&self, type_name: &str) -> bool;

    /// 注册的组件数量
    fn component_count(&self) -> usize;
}

/// 带类型的查找扩展
pub trait ComponentLookupExt: ComponentLookup {
    /// 按具体类型获取并向下转型
    fn get<T>(&self, type_name: &str) -> Option<Arc<T>>
    where
        T: Any + Send + Sync,
    {
        self.get_by_type(type_name)?.downcast::<T>().ok()
    }

    /// 按具体类型获取已在构建期验证存在的依赖
    ///
    /// 仅供生成的工厂使用。依赖在构建期已绑定到具体组件，工厂又在
    /// `dependencies()` 中声明了这些类型，注册表构建时会拒绝缺少依赖的工厂；
    /// 工厂按注册的具体类型创建实例，向下转型也不会失败。因此取不到实例
    /// 只可能是手写代码破坏了这一不变式，不是可恢复的运行时错误。
    fn require<T>(&self, type_name: &str) -> Arc<T>
    where
        T: Any + Send + Sync,
    {
        match self.get::<T>(type_name) {
            Some(instance) => instance,
            None => unreachable!("组件 {type_name} 未注册或类型不匹配，注册表与生成代码不一致"),
        }
    }

    /// 按名称获取并向下转型
    fn get_named<T>(&self, name: &str) -> Option<Arc<T>>
    where
        T: Any + Send + Sync,
    {
        self.get_by_name(name)?.downcast::<T>().ok()
    }

    /// 按能力类型获取，`T` 通常是 `dyn Trait`
    fn resolve_capability<T>(&self, capability: &str) -> Option<Arc<T>>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.get_capability(capability)?
            .downcast::<Arc<T>>()
            .ok()
            .map(|view| *view)
    }

    /// 按能力类型获取全部实现
    fn resolve_all_capability<T>(&self, capability: &str) -> Vec<Arc<T>>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.get_all_capability(capability)
            .into_iter()
            .filter_map(|view| view.downcast::<Arc<T>>().ok().map(|view| *view))
            .collect()
    }
}

impl<L: ComponentLookup + ?Sized> ComponentLookupExt for L {}

/// 注册表的弱引用句柄
///
/// 生成代码中 `Provider`、`LazyRef`、`OptionalRef` 的闭包持有它而不是 `Arc`，
/// 单例持有这些包装时不会与注册表形成引用环。
#[derive(Clone)]
pub struct WeakLookup {
    lookup: Weak<dyn ComponentLookup>,
}

impl WeakLookup {
    /// 从注册表创建弱引用句柄
    pub fn new(lookup: &Arc<dyn ComponentLookup>) -> Self {
        Self {
            lookup: Arc::downgrade(lookup),
        }
    }

    /// 注册表是否仍然存活
    pub fn is_alive(&self) -> bool {
        self.lookup.strong_count() > 0
    }

    /// 见 [`ComponentLookupExt::require`]；注册表释放后调用会 panic
    pub fn require<T>(&self, type_name: &str) -> Arc<T>
    where
        T: Any + Send + Sync,
    {
        match self.lookup.upgrade() {
            Some(lookup) => lookup.require::<T>(type_name),
            None => panic!("组件注册表已释放，无法再取得 {type_name}"),
        }
    }
}

impl std::fmt::Debug for WeakLookup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeakLookup")
            .field("alive", &self.is_alive())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factory::Instance;

    struct Single(Instance);

    impl ComponentLookup for Single {
        fn get_by_type(&self, type_name: &str) -> Option<Instance> {
            (type_name == "app::Answer").then(|| Arc::clone(&self.0))
        }

        fn get_by_name(&self, _name: &str) -> Option<Instance> {
            None
        }

        fn get_capability(&self, _capability: &str) -> Option<CapabilityView> {
            None
        }

        fn get_all_capability(&self, _capability: &str) -> Vec<CapabilityView> {
            Vec::new()
        }

        fn factory_by_type(&self, _type_name: &str) -> Option<Arc<dyn ComponentFactory>> {
            None
        }

        fn factory_by_name(&self, _name: &str) -> Option<Arc<dyn ComponentFactory>> {
            None
        }

        fn factories_by_capability(&self, _capability: &str) -> Vec<Arc<dyn ComponentFactory>> {
            Vec::new()
        }

        fn contains(&self, type_name: &str) -> bool {
            type_name == "app::Answer"
        }

        fn component_count(&self) -> usize {
            1
        }
    }

    fn lookup() -> Arc<dyn ComponentLookup> {
        Arc::new(Single(Arc::new(42u32)))
    }

    #[test]
    fn test_require_returns_registered_instance() {
        assert_eq!(*lookup().require::<u32>("app::Answer"), 42);
    }

    #[test]
    #[should_panic(expected = "注册表与生成代码不一致")]
    fn test_require_treats_type_mismatch_as_broken_invariant() {
        lookup().require::<String>("app::Answer");
    }

    #[test]
    fn test_weak_lookup_does_not_keep_registry_alive() {
        let strong = lookup();
        let weak = WeakLookup::new(&strong);
        assert!(weak.is_alive());
        assert_eq!(*weak.require::<u32>("app::Answer"), 42);

        drop(strong);
        assert!(!weak.is_alive());
    }
}
