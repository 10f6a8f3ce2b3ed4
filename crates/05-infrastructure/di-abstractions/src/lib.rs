//! # Dependency Injection Abstractions
//!
//! 依赖注入抽象层，定义编译器各阶段之间以及生成代码与运行时之间的接口。
//!
//! ## 核心接口
//!
//! - [`MetadataReader`] - 元数据读取接口
//! - [`GraphCompiler`] - 图编译器接口
//! - [`ResolvedGraph`] - 验证后的组件图
//! - [`ComponentFactory`] - 组件工厂接口
//! - [`ComponentLookup`] - 组件查找接口
//! - [`ApplicationContext`] - 应用上下文接口

pub mod compiler;
pub mod container;
pub mod factory;
pub mod registry;
pub mod resolver;
pub mod scanner;

pub use compiler::*;
pub use container::*;
pub use factory::*;
pub use registry::*;
pub use resolver::*;
pub use scanner::*;
