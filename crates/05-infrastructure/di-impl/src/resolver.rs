//! 依赖解析
//!
//! 在构建期把每个依赖绑定到唯一的组件。
//! 匹配顺序：限定符（按限定符或组件名称）、具体类型、能力类型。

use crate::conflicts::select_implementation;
use infrastructure_common::{decapitalize, ComponentMetadata, Dependency};

/// 单个依赖的解析结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// 绑定到组件，`ambiguous` 表示按取舍规则从多个候选中选出
    Bound {
        /// 组件序号
        index: usize,
        /// 是否存在多个候选
        ambiguous: bool,
    },
    /// 可选依赖的目标缺失
    Absent,
    /// 没有匹配的组件
    Missing,
}

/// 依赖解析器
#[derive(Debug, Clone, Copy)]
pub struct DependencyResolver<'a> {
    components: &'a [ComponentMetadata],
}

impl<'a> DependencyResolver<'a> {
    /// 创建解析器
    pub fn new(components: &'a [ComponentMetadata]) -> Self {
        Self { components }
    }

    /// 指定序号的组件
    pub fn component(&self, index: usize) -> &'a ComponentMetadata {
        &self.components[index]
    }

    /// 满足依赖类型的候选组件，按注册顺序
    pub fn candidates(&self, dependency: &Dependency) -> Vec<usize> {
        let lookup = dependency.lookup_type();
        let candidates = self
            .components
            .iter()
            .enumerate()
            .filter(|(_, component)| component.satisfies(lookup));

        match &dependency.qualifier {
            Some(qualifier) => candidates
                .filter(|(_, component)| {
                    component.qualifier.as_deref() == Some(qualifier.as_str())
                        || &component.name == qualifier
                })
                .map(|(index, _)| index)
                .collect(),
            None => candidates.map(|(index, _)| index).collect(),
        }
    }

    /// 解析依赖
    pub fn resolve(&self, dependency: &Dependency) -> Resolution {
        let candidates = self.candidates(dependency);
        let lookup = dependency.lookup_type();

        if candidates.is_empty() {
            return if dependency.allows_missing() {
                Resolution::Absent
            } else {
                Resolution::Missing
            };
        }

        // 具体类型完全匹配时优先
        if let Some(&exact) = candidates
            .iter()
            .find(|&&index| &self.components[index].type_name == lookup)
        {
            return Resolution::Bound {
                index: exact,
                ambiguous: false,
            };
        }

        match select_implementation(self.components, &candidates) {
            Some(index) => Resolution::Bound {
                index,
                ambiguous: candidates.len() > 1,
            },
            None => Resolution::Missing,
        }
    }

    /// 按名称查找组件（用于 depends_on）
    ///
    /// 依次尝试限定符、组件名称、简单类型名、完整类型名，最后做大小写和分隔符无关的比较。
    pub fn resolve_name(&self, name: &str) -> Option<usize> {
        let exact = self.components.iter().position(|component| {
            component.qualifier.as_deref() == Some(name)
                || component.name == name
                || decapitalize(component.simple_name()) == name
                || component.simple_name() == name
                || component.type_name.as_str() == name
        });
        if exact.is_some() {
            return exact;
        }

        let wanted = normalize(name);
        self.components.iter().position(|component| {
            normalize(&component.name) == wanted || normalize(component.simple_name()) == wanted
        })
    }

    /// 为未知名称给出最相近的组件名称
    pub fn suggest_name(&self, name: &str) -> Option<String> {
        self.components
            .iter()
            .map(|component| {
                (
                    similarity(&name.to_lowercase(), &component.name.to_lowercase()),
                    &component.name,
                )
            })
            .filter(|(score, _)| *score >= 0.6)
            .max_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(_, candidate)| candidate.clone())
    }

    /// 为缺失的类型依赖生成修复提示
    pub fn missing_hint(&self, dependency: &Dependency) -> String {
        let lookup = dependency.lookup_type();
        let similar = self
            .components
            .iter()
            .find(|component| component.simple_name() == lookup.simple_name());
        match (similar, &dependency.qualifier) {
            (_, Some(qualifier)) => format!(
                "请确认存在名称或限定符为 '{qualifier}' 且实现 {lookup} 的组件"
            ),
            (Some(component), None) => format!(
                "存在同名组件 {}，请检查类型路径是否正确",
                component.type_name
            ),
            (None, None) => format!(
                "请将 {lookup} 注册为组件、为某个组件声明该能力类型，或把依赖声明为可选"
            ),
        }
    }
}

fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| *c != '-' && *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

/// 编辑距离相似度，范围 0.0 ~ 1.0
fn similarity(a: &str, b: &str) -> f64 {
    let longest = a.chars().count().max(b.chars().count());
    if longest == 0 {
        return 1.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let score = 1.0 - levenshtein(a, b) as f64 / longest as f64;
    score
}

fn levenshtein(a: &str, b: &str) -> usize {
    let b: Vec<char> = b.chars().collect();
    let mut previous: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0; b.len() + 1];

    for (i, ca) in a.chars().enumerate() {
        current[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != *cb);
            current[j + 1] = (previous[j + 1] + 1)
                .min(current[j] + 1)
                .min(previous[j] + cost);
        }
        std::mem::swap(&mut previous, &mut current);
    }
    previous[b.len()]
}
