//! 已解析的组件图
//!
//! 验证流水线的输出，也是两种生成策略共同的输入：
//! 组件按注册顺序保存，构造顺序为拓扑序，每个依赖位置都绑定到确定的目标。

use infrastructure_common::{ComponentMetadata, ConfiguredValue, Dependency, TypeName};
use std::collections::{BTreeMap, HashMap};

/// 依赖位置：组件序号、注入点序号、依赖序号
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DependencySite {
    /// 组件序号
    pub component: usize,
    /// 注入点序号
    pub point: usize,
    /// 依赖在注入点中的序号
    pub dependency: usize,
}

impl DependencySite {
    /// 创建依赖位置
    pub fn new(component: usize, point: usize, dependency: usize) -> Self {
        Self {
            component,
            point,
            dependency,
        }
    }
}

/// 依赖绑定结果
#[derive(Debug, Clone, PartialEq)]
pub enum Binding {
    /// 绑定到组件
    Component(usize),
    /// 可选依赖的目标缺失
    Absent,
    /// 已转换的配置值
    Value(ConfiguredValue),
}

/// 已解析的组件图
#[derive(Debug, Clone, Default)]
pub struct ResolvedGraph {
    components: Vec<ComponentMetadata>,
    order: Vec<usize>,
    bindings: HashMap<DependencySite, Binding>,
    hard_edges: Vec<Vec<usize>>,
}

impl ResolvedGraph {
    /// 创建已解析的组件图
    ///
    /// `order` 为构造顺序，`hard_edges[i]` 为组件 i 的硬依赖。
    pub fn new(
        components: Vec<ComponentMetadata>,
        order: Vec<usize>,
        bindings: HashMap<DependencySite, Binding>,
        hard_edges: Vec<Vec<usize>>,
    ) -> Self {
        Self {
            components,
            order,
            bindings,
            hard_edges,
        }
    }

    /// 按注册顺序的全部组件
    pub fn components(&self) -> &[ComponentMetadata] {
        &self.components
    }

    /// 指定序号的组件
    pub fn component(&self, index: usize) -> &ComponentMetadata {
        &self.components[index]
    }

    /// 构造顺序
    pub fn order(&self) -> &[usize] {
        &self.order
    }

    /// 按构造顺序遍历组件
    pub fn construction_order(&self) -> impl Iterator<Item = (usize, &ComponentMetadata)> + '_ {
        self.order
            .iter()
            .map(move |&index| (index, &self.components[index]))
    }

    /// 依赖位置的绑定
    pub fn binding(&self, site: DependencySite) -> Option<&Binding> {
        self.bindings.get(&site)
    }

    /// 指定组件的依赖及其绑定，按注入点和依赖顺序
    pub fn bound_dependencies(
        &self,
        component: usize,
        point: usize,
    ) -> impl Iterator<Item = (&Dependency, Option<&Binding>)> + '_ {
        self.components[component].injection_points[point]
            .dependencies
            .iter()
            .enumerate()
            .map(move |(dependency, dep)| {
                (
                    dep,
                    self.binding(DependencySite::new(component, point, dependency)),
                )
            })
    }

    /// 组件的硬依赖（含 depends_on）
    pub fn hard_dependencies(&self, index: usize) -> &[usize] {
        self.hard_edges.get(index).map_or(&[], Vec::as_slice)
    }

    /// 按具体类型查找组件序号
    pub fn index_of(&self, type_name: &str) -> Option<usize> {
        self.components
            .iter()
            .position(|component| component.type_name.as_str() == type_name)
    }

    /// 能力类型到实现组件的映射，实现按注册顺序
    pub fn capability_index(&self) -> BTreeMap<TypeName, Vec<usize>> {
        let mut index: BTreeMap<TypeName, Vec<usize>> = BTreeMap::new();
        for (position, component) in self.components.iter().enumerate() {
            for capability in &component.capabilities {
                index.entry(capability.clone()).or_default().push(position);
            }
        }
        index
    }

    /// 组件数量
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}
