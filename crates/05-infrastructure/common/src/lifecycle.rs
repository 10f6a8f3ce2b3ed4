//! 生命周期管理
//!
//! 定义组件作用域、生命周期钩子以及应用上下文的状态。

use serde::{Deserialize, Serialize};
use std::fmt;

/// 组件作用域
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    /// 单例，整个应用共享一个实例
    #[default]
    Singleton,
    /// 原型，每次获取创建新实例
    Prototype,
}

impl Scope {
    /// 扁平数组中的作用域编码
    pub fn kind_index(self) -> u8 {
        match self {
            Self::Singleton => 0,
            Self::Prototype => 1,
        }
    }

    /// 从作用域编码还原
    pub fn from_kind_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(Self::Singleton),
            1 => Some(Self::Prototype),
            _ => None,
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Singleton => f.write_str("singleton"),
            Self::Prototype => f.write_str("prototype"),
        }
    }
}

/// 生命周期钩子
///
/// 钩子方法以 `&self` 调用。
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LifecycleHooks {
    /// 创建完成后调用的方法
    pub post_create: Option<String>,
    /// 销毁前调用的方法
    pub pre_destroy: Option<String>,
}

impl LifecycleHooks {
    /// 是否没有任何钩子
    pub fn is_empty(&self) -> bool {
        self.post_create.is_none() && self.pre_destroy.is_none()
    }
}

/// 生命周期状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    /// 已创建
    Created,
    /// 启动中
    Starting,
    /// 运行中
    Running,
    /// 停止中
    Stopping,
    /// 已停止
    Stopped,
}

impl Default for LifecycleState {
    fn default() -> Self {
        Self::Created
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Created => "created",
            Self::Starting => "starting",
            Self::Running => "running",
            Self::Stopping => "stopping",
            Self::Stopped => "stopped",
        };
        f.write_str(text)
    }
}
