//! # Infrastructure Common
//!
//! 这个 crate 提供了 Lorn DI 编译器各层共享的元数据模型和工具。
//!
//! ## 核心组件
//!
//! - [`ComponentMetadata`] - 组件元数据
//! - [`InjectionPoint`] / [`Dependency`] - 注入点与依赖
//! - [`Scope`] - 组件作用域
//! - [`ConfigurationResolver`] - 配置值解析接口
//! - [`ConditionEvaluator`] - 条件注册求值接口
//! - [`Diagnostics`] - 构建诊断收集器
//!
//! ## 设计原则
//!
//! - 元数据是纯数据，不做语义校验
//! - 所有组件必须在构建期可解析，否则构建失败

pub mod condition;
pub mod configuration;
pub mod diagnostics;
pub mod errors;
pub mod lifecycle;
pub mod metadata;

pub use condition::*;
pub use configuration::*;
pub use diagnostics::*;
pub use errors::*;
pub use lifecycle::*;
pub use metadata::*;
