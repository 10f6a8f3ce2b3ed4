//! 平铺数组查找表
//!
//! 直接生成策略附带的并行数组表示：类型→序号、序号→作用域、序号→访问器。
//! 数组由生成代码静态给出，这里只在首次使用时建立两个散列索引。

use di_abstractions::Instance;
use infrastructure_common::Scope;
use std::collections::HashMap;
use std::sync::Arc;

/// 组件访问器，返回类型擦除后的实例
pub type Supplier = fn() -> Instance;

/// 平铺数组查找表
pub struct FlatRegistry {
    types: &'static [&'static str],
    names: &'static [&'static str],
    scopes: &'static [u8],
    slots: &'static [Supplier],
    capabilities: &'static [(&'static str, usize)],
    type_index: HashMap<&'static str, usize>,
    name_index: HashMap<&'static str, usize>,
}

impl FlatRegistry {
    /// 从并行数组创建查找表
    pub fn new(
        types: &'static [&'static str],
        names: &'static [&'static str],
        scopes: &'static [u8],
        slots: &'static [Supplier],
    ) -> Self {
        let type_index = types.iter().enumerate().map(|(i, t)| (*t, i)).collect();
        let name_index = names.iter().enumerate().map(|(i, n)| (*n, i)).collect();
        Self {
            types,
            names,
            scopes,
            slots,
            capabilities: &[],
            type_index,
            name_index,
        }
    }

    /// 设置能力类型到所选实现序号的映射
    pub fn with_capabilities(mut self, capabilities: &'static [(&'static str, usize)]) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// 按类型查找序号
    pub fn index_of(&self, type_name: &str) -> Option<usize> {
        self.type_index.get(type_name).copied()
    }

    /// 按名称查找序号，名称重复时返回最后一个
    pub fn index_of_name(&self, name: &str) -> Option<usize> {
        self.name_index.get(name).copied()
    }

    /// 按能力类型查找所选实现的序号
    pub fn index_of_capability(&self, capability: &str) -> Option<usize> {
        self.capabilities
            .iter()
            .find(|(name, _)| *name == capability)
            .map(|(_, index)| *index)
    }

    /// 序号对应的类型名称
    pub fn type_name(&self, index: usize) -> Option<&'static str> {
        self.types.get(index).copied()
    }

    /// 序号对应的组件名称
    pub fn name(&self, index: usize) -> Option<&'static str> {
        self.names.get(index).copied()
    }

    /// 序号对应的作用域
    pub fn scope(&self, index: usize) -> Option<Scope> {
        self.scopes
            .get(index)
            .and_then(|kind| Scope::from_kind_index(*kind))
    }

    /// 序号对应的访问器
    pub fn slot(&self, index: usize) -> Option<Supplier> {
        self.slots.get(index).copied()
    }

    /// 按类型获取实例
    pub fn get(&self, type_name: &str) -> Option<Instance> {
        self.slot(self.index_of(type_name)?).map(|supplier| supplier())
    }

    /// 按名称获取实例
    pub fn get_by_name(&self, name: &str) -> Option<Instance> {
        self.slot(self.index_of_name(name)?).map(|supplier| supplier())
    }

    /// 按类型获取并向下转型
    pub fn get_typed<T>(&self, type_name: &str) -> Option<Arc<T>>
    where
        T: std::any::Any + Send + Sync,
    {
        self.get(type_name)?.downcast::<T>().ok()
    }

    /// 组件数量
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl std::fmt::Debug for FlatRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlatRegistry")
            .field("types", &self.types)
            .field("names", &self.names)
            .field("scopes", &self.scopes)
            .finish()
    }
}
