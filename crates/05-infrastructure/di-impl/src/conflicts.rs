//! 接口冲突检查
//!
//! 同一能力类型存在多个实现且没有首选或限定符时给出警告。
//! 解析时的取舍规则：有首选实现时取最后注册的首选实现，否则取最后注册的实现。
//! 多个组件使用同一名称时同样给出警告，按名称查找只会得到最后注册的那个。

use infrastructure_common::{ComponentMetadata, Diagnostics, TypeName};
use std::collections::BTreeMap;
use tracing::debug;

/// 接口冲突
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceConflict {
    /// 能力类型
    pub capability: TypeName,
    /// 全部实现，按注册顺序
    pub implementors: Vec<TypeName>,
    /// 实际选中的实现
    pub chosen: TypeName,
}

/// 名称冲突
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameConflict {
    /// 组件名称
    pub name: String,
    /// 使用该名称的组件，按注册顺序
    pub components: Vec<TypeName>,
}

/// 在候选组件中选出实现
///
/// `candidates` 为按注册顺序排列的组件序号，不能为空。
pub fn select_implementation(components: &[ComponentMetadata], candidates: &[usize]) -> Option<usize> {
    candidates
        .iter()
        .rev()
        .copied()
        .find(|&index| components[index].primary)
        .or_else(|| candidates.last().copied())
}

/// 接口冲突检查器
#[derive(Debug, Clone, Copy, Default)]
pub struct InterfaceConflictValidator;

impl InterfaceConflictValidator {
    /// 创建检查器
    pub fn new() -> Self {
        Self
    }

    /// 查找全部冲突，按能力类型名称排序
    pub fn find_conflicts(&self, components: &[ComponentMetadata]) -> Vec<InterfaceConflict> {
        let mut implementations: BTreeMap<&TypeName, Vec<usize>> = BTreeMap::new();
        for (index, component) in components.iter().enumerate() {
            for capability in &component.capabilities {
                implementations.entry(capability).or_default().push(index);
            }
        }

        let mut conflicts = Vec::new();
        for (capability, candidates) in implementations {
            if candidates.len() < 2 {
                continue;
            }
            let primaries = candidates.iter().filter(|&&i| components[i].primary).count();
            let qualified = candidates
                .iter()
                .any(|&i| components[i].qualifier.is_some());
            if primaries == 1 || (primaries == 0 && qualified) {
                debug!("能力类型 {} 的多个实现已消除歧义", capability);
                continue;
            }
            let Some(chosen) = select_implementation(components, &candidates) else {
                continue;
            };
            conflicts.push(InterfaceConflict {
                capability: capability.clone(),
                implementors: candidates
                    .iter()
                    .map(|&i| components[i].type_name.clone())
                    .collect(),
                chosen: components[chosen].type_name.clone(),
            });
        }
        conflicts
    }

    /// 检查并记录警告
    pub fn validate(
        &self,
        components: &[ComponentMetadata],
        diagnostics: &mut Diagnostics,
    ) -> Vec<InterfaceConflict> {
        let conflicts = self.find_conflicts(components);
        for conflict in &conflicts {
            let implementors: Vec<&str> = conflict
                .implementors
                .iter()
                .map(TypeName::as_str)
                .collect();
            diagnostics.warning(
                format!(
                    "能力类型 {} 存在多个实现 [{}] 且未指定首选或限定符，将使用最后注册的 {}",
                    conflict.capability,
                    implementors.join(", "),
                    conflict.chosen
                ),
                Some(&conflict.capability),
            );
        }
        conflicts
    }

    /// 查找被多个组件使用的名称，按名称排序
    pub fn find_name_conflicts(&self, components: &[ComponentMetadata]) -> Vec<NameConflict> {
        let mut by_name: BTreeMap<&str, Vec<&TypeName>> = BTreeMap::new();
        for component in components {
            let owners = by_name.entry(component.name.as_str()).or_default();
            // 同一类型重复注册由结构检查报告
            if !owners.contains(&&component.type_name) {
                owners.push(&component.type_name);
            }
        }
        by_name
            .into_iter()
            .filter(|(_, owners)| owners.len() > 1)
            .map(|(name, owners)| NameConflict {
                name: name.to_string(),
                components: owners.into_iter().cloned().collect(),
            })
            .collect()
    }

    /// 检查名称冲突并记录警告
    pub fn validate_names(
        &self,
        components: &[ComponentMetadata],
        diagnostics: &mut Diagnostics,
    ) -> Vec<NameConflict> {
        let conflicts = self.find_name_conflicts(components);
        for conflict in &conflicts {
            let owners: Vec<&str> = conflict.components.iter().map(TypeName::as_str).collect();
            let last = owners.last().copied().unwrap_or_default();
            diagnostics.warning(
                format!(
                    "组件名称 '{}' 被多个组件使用 [{}]，按名称查找将得到最后注册的 {}",
                    conflict.name,
                    owners.join(", "),
                    last
                ),
                conflict.components.last(),
            );
        }
        conflicts
    }
}
