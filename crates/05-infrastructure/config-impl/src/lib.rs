//! # Configuration Implementation
//!
//! 配置值解析的具体实现。
//!
//! ## 主要组件
//!
//! - [`PropertyResolver`] - `${key:default}` 占位符解析器
//! - [`PropertySource`] - 属性文件加载与展平

pub mod resolver;
pub mod sources;

pub use resolver::*;
pub use sources::*;
