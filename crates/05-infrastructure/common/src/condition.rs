//! 条件注册
//!
//! 条件谓词只作为数据携带，求值由外部的 [`ConditionEvaluator`] 完成。
//! 被排除的组件及其依赖边在环检测之前移除。

use crate::metadata::{ComponentMetadata, TypeName};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 条件谓词
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Condition {
    /// 属性存在（或等于指定值）
    OnProperty {
        /// 属性名
        name: String,
        /// 期望值
        #[serde(default)]
        having_value: Option<String>,
        /// 属性缺失时是否匹配
        #[serde(default)]
        match_if_missing: bool,
    },
    /// 指定类型存在
    OnClass {
        /// 类型列表
        types: Vec<String>,
    },
    /// 指定组件存在
    OnBean {
        /// 组件类型
        types: Vec<TypeName>,
    },
    /// 指定组件不存在
    OnMissingBean {
        /// 组件类型
        types: Vec<TypeName>,
    },
    /// 激活的配置档
    Profile {
        /// 配置档名称
        profiles: Vec<String>,
    },
    /// 全部满足
    All {
        /// 子条件
        conditions: Vec<Condition>,
    },
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OnProperty {
                name, having_value, ..
            } => match having_value {
                Some(value) => write!(f, "property {name}={value}"),
                None => write!(f, "property {name}"),
            },
            Self::OnClass { types } => write!(f, "class [{}]", types.join(", ")),
            Self::OnBean { types } => write!(f, "bean [{}]", join_types(types)),
            Self::OnMissingBean { types } => write!(f, "missing bean [{}]", join_types(types)),
            Self::Profile { profiles } => write!(f, "profile [{}]", profiles.join(", ")),
            Self::All { conditions } => {
                let parts: Vec<String> = conditions.iter().map(ToString::to_string).collect();
                write!(f, "all({})", parts.join(" && "))
            }
        }
    }
}

fn join_types(types: &[TypeName]) -> String {
    types
        .iter()
        .map(TypeName::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// 条件求值上下文
#[derive(Debug, Clone, Copy)]
pub struct ConditionContext<'a> {
    /// 参与求值的全部候选组件
    pub candidates: &'a [ComponentMetadata],
}

impl<'a> ConditionContext<'a> {
    /// 创建上下文
    pub fn new(candidates: &'a [ComponentMetadata]) -> Self {
        Self { candidates }
    }

    /// 是否存在满足给定类型的候选组件
    pub fn has_component(&self, type_name: &TypeName) -> bool {
        self.candidates
            .iter()
            .any(|component| component.satisfies(type_name))
    }
}

/// 条件求值器
pub trait ConditionEvaluator: Send + Sync {
    /// 判断组件是否应当注册
    fn matches(
        &self,
        component: &ComponentMetadata,
        condition: &Condition,
        context: &ConditionContext<'_>,
    ) -> bool;
}

/// 接受所有组件的求值器
#[derive(Debug, Clone, Copy, Default)]
pub struct IncludeAll;

impl ConditionEvaluator for IncludeAll {
    fn matches(
        &self,
        _component: &ComponentMetadata,
        _condition: &Condition,
        _context: &ConditionContext<'_>,
    ) -> bool {
        true
    }
}

impl<F> ConditionEvaluator for F
where
    F: Fn(&ComponentMetadata, &Condition, &ConditionContext<'_>) -> bool + Send + Sync,
{
    fn matches(
        &self,
        component: &ComponentMetadata,
        condition: &Condition,
        context: &ConditionContext<'_>,
    ) -> bool {
        self(component, condition, context)
    }
}
