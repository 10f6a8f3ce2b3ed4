//! 组件注册表实现
//!
//! 间接生成策略的运行时部分：生成代码把每个组件的工厂注册进来，
//! 注册表按具体类型、名称和能力类型三种方式查找。

use crate::cell::SingletonCell;
use di_abstractions::{CapabilityView, ComponentFactory, ComponentLookup, Instance};
use infrastructure_common::{DependencyError, DependencyResult, Scope};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Weak};
use tracing::{debug, info, warn};

/// 把实例转换为能力类型视图
pub type CapabilityCaster = fn(Instance) -> Option<CapabilityView>;

/// 组件注册信息
#[derive(Clone)]
pub struct ComponentRegistration {
    factory: Arc<dyn ComponentFactory>,
    name: &'static str,
    scope: Scope,
    lazy: bool,
    primary: bool,
    capabilities: Vec<(&'static str, CapabilityCaster)>,
}

impl ComponentRegistration {
    /// 创建注册信息
    pub fn new(factory: Arc<dyn ComponentFactory>, name: &'static str, scope: Scope) -> Self {
        Self {
            factory,
            name,
            scope,
            lazy: false,
            primary: false,
            capabilities: Vec::new(),
        }
    }

    /// 设置惰性创建
    pub fn lazy(mut self, lazy: bool) -> Self {
        self.lazy = lazy;
        self
    }

    /// 设置为首选实现
    pub fn primary(mut self, primary: bool) -> Self {
        self.primary = primary;
        self
    }

    /// 添加能力类型
    pub fn with_capability(mut self, capability: &'static str, caster: CapabilityCaster) -> Self {
        self.capabilities.push((capability, caster));
        self
    }

    /// 组件类型
    pub fn type_name(&self) -> &'static str {
        self.factory.type_name()
    }

    /// 组件名称
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// 作用域
    pub fn scope(&self) -> Scope {
        self.scope
    }

    /// 是否惰性
    pub fn is_lazy(&self) -> bool {
        self.lazy
    }

    /// 是否首选实现
    pub fn is_primary(&self) -> bool {
        self.primary
    }
}

impl std::fmt::Debug for ComponentRegistration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentRegistration")
            .field("type_name", &self.type_name())
            .field("name", &self.name)
            .field("scope", &self.scope)
            .field("lazy", &self.lazy)
            .field("primary", &self.primary)
            .field(
                "capabilities",
                &self.capabilities.iter().map(|(name, _)| *name).collect::<Vec<_>>(),
            )
            .field("factory", &"<factory>")
            .finish()
    }
}

/// 注册表构建器
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    registrations: Vec<ComponentRegistration>,
}

impl RegistryBuilder {
    /// 添加注册信息
    pub fn register(mut self, registration: ComponentRegistration) -> Self {
        debug!("注册组件: {} ({})", registration.name, registration.type_name());
        self.registrations.push(registration);
        self
    }

    /// 添加注册信息（可变引用形式，供生成代码使用）
    pub fn push(&mut self, registration: ComponentRegistration) {
        self.registrations.push(registration);
    }

    /// 构建注册表
    ///
    /// 检查类型重复和工厂声明的依赖是否都已注册。
    pub fn build(self) -> DependencyResult<Arc<ComponentRegistryImpl>> {
        let mut by_type = HashMap::new();
        let mut by_name = HashMap::new();
        let mut by_capability: HashMap<&'static str, Vec<usize>> = HashMap::new();

        for (index, registration) in self.registrations.iter().enumerate() {
            let type_name = registration.type_name();
            if by_type.insert(type_name, index).is_some() {
                return Err(DependencyError::DuplicateRegistration {
                    type_name: type_name.to_string(),
                });
            }
            if let Some(previous) = by_name.insert(registration.name, index) {
                warn!(
                    "组件名称 '{}' 重复: {} 覆盖 {}",
                    registration.name,
                    type_name,
                    self.registrations[previous].type_name()
                );
            }
            for (capability, _) in &registration.capabilities {
                by_capability.entry(capability).or_default().push(index);
            }
        }

        let known: HashSet<&str> = by_type.keys().copied().collect();
        for registration in &self.registrations {
            if let Some(missing) = registration
                .factory
                .dependencies()
                .iter()
                .find(|dependency| !known.contains(*dependency))
            {
                return Err(DependencyError::MissingDeclaredDependency {
                    type_name: registration.type_name().to_string(),
                    dependency: (*missing).to_string(),
                });
            }
        }

        info!("组件注册表构建完成: {} 个组件", self.registrations.len());
        let entries = self
            .registrations
            .into_iter()
            .map(|registration| Entry {
                registration,
                cell: SingletonCell::new(),
            })
            .collect();

        Ok(Arc::new_cyclic(|this| ComponentRegistryImpl {
            entries,
            by_type,
            by_name,
            by_capability,
            created: Mutex::new(Vec::new()),
            this: this.clone(),
        }))
    }
}

struct Entry {
    registration: ComponentRegistration,
    cell: SingletonCell<Instance>,
}

/// 组件注册表
pub struct ComponentRegistryImpl {
    entries: Vec<Entry>,
    by_type: HashMap<&'static str, usize>,
    by_name: HashMap<&'static str, usize>,
    by_capability: HashMap<&'static str, Vec<usize>>,
    /// 单例的创建顺序
    created: Mutex<Vec<usize>>,
    this: Weak<ComponentRegistryImpl>,
}

impl ComponentRegistryImpl {
    /// 创建构建器
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// 全部注册信息，按注册顺序
    pub fn registrations(&self) -> impl Iterator<Item = &ComponentRegistration> + '_ {
        self.entries.iter().map(|entry| &entry.registration)
    }

    fn instantiate(&self, index: usize) -> Option<Instance> {
        let entry = self.entries.get(index)?;
        let this: Arc<dyn ComponentLookup> = self.this.upgrade()?;
        let factory = &entry.registration.factory;

        let instance = match entry.registration.scope {
            Scope::Singleton => entry.cell.get_or_init(|| {
                debug!("创建单例: {}", factory.type_name());
                let instance = factory.create(&this);
                factory.post_create(&instance);
                self.created.lock().push(index);
                instance
            }),
            Scope::Prototype => {
                let instance = factory.create(&this);
                factory.post_create(&instance);
                instance
            }
        };
        Some(instance)
    }

    fn view(&self, index: usize, capability: &str) -> Option<CapabilityView> {
        let caster = self.entries[index]
            .registration
            .capabilities
            .iter()
            .find(|(name, _)| *name == capability)
            .map(|(_, caster)| *caster)?;
        caster(self.instantiate(index)?)
    }

    /// 创建全部非惰性单例，返回本次新建的数量
    pub fn initialize_eager(&self) -> usize {
        let before = self.created.lock().len();
        for (index, entry) in self.entries.iter().enumerate() {
            if entry.registration.scope == Scope::Singleton && !entry.registration.lazy {
                self.instantiate(index);
            }
        }
        self.created.lock().len() - before
    }

    /// 已创建单例的类型，按创建顺序
    pub fn created_singletons(&self) -> Vec<&'static str> {
        self.created
            .lock()
            .iter()
            .map(|&index| self.entries[index].registration.type_name())
            .collect()
    }

    /// 按创建的逆序执行销毁前钩子，返回执行数量
    pub fn destroy_singletons(&self) -> usize {
        let created = std::mem::take(&mut *self.created.lock());
        let mut destroyed = 0;
        for &index in created.iter().rev() {
            let entry = &self.entries[index];
            if let Some(instance) = entry.cell.get() {
                debug!("销毁单例: {}", entry.registration.type_name());
                entry.registration.factory.pre_destroy(instance);
                destroyed += 1;
            }
        }
        destroyed
    }
}

impl ComponentLookup for ComponentRegistryImpl {
    fn get_by_type(&self, type_name: &str) -> Option<Instance> {
        self.instantiate(*self.by_type.get(type_name)?)
    }

    fn get_by_name(&self, name: &str) -> Option<Instance> {
        self.instantiate(*self.by_name.get(name)?)
    }

    fn get_capability(&self, capability: &str) -> Option<CapabilityView> {
        let candidates = self.by_capability.get(capability)?;
        // 与构建期的取舍规则一致：最后注册的首选实现，否则最后注册的实现
        let index = candidates
            .iter()
            .rev()
            .find(|&&index| self.entries[index].registration.primary)
            .or_else(|| candidates.last())
            .copied()?;
        self.view(index, capability)
    }

    fn get_all_capability(&self, capability: &str) -> Vec<CapabilityView> {
        self.by_capability
            .get(capability)
            .map(|indices| {
                indices
                    .iter()
                    .filter_map(|&index| self.view(index, capability))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn factory_by_type(&self, type_name: &str) -> Option<Arc<dyn ComponentFactory>> {
        let index = *self.by_type.get(type_name)?;
        Some(Arc::clone(&self.entries[index].registration.factory))
    }

    fn factory_by_name(&self, name: &str) -> Option<Arc<dyn ComponentFactory>> {
        let index = *self.by_name.get(name)?;
        Some(Arc::clone(&self.entries[index].registration.factory))
    }

    fn factories_by_capability(&self, capability: &str) -> Vec<Arc<dyn ComponentFactory>> {
        self.by_capability
            .get(capability)
            .map(|indices| {
                indices
                    .iter()
                    .map(|&index| Arc::clone(&self.entries[index].registration.factory))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn contains(&self, type_name: &str) -> bool {
        self.by_type.contains_key(type_name)
    }

    fn component_count(&self) -> usize {
        self.entries.len()
    }
}

impl std::fmt::Debug for ComponentRegistryImpl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentRegistryImpl")
            .field("components", &self.entries.len())
            .field("created", &self.created.lock().len())
            .finish()
    }
}
