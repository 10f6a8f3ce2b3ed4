//! # 依赖注入具体实现
//!
//! 构建期部分：依赖图、接口冲突检查、依赖解析和验证流水线。
//! 运行时部分：生成代码使用的单例单元、包装类型、注册表和应用上下文。
//!
//! ## 使用示例
//!
//! ```rust,ignore
//! let mut diagnostics = Diagnostics::new();
//! let validated = GraphValidator::new().validate(components, &mut diagnostics)?;
//! let order = validated.resolved.order();
//! ```

pub mod cell;
pub mod conflicts;
pub mod context;
pub mod flat;
pub mod graph;
pub mod registry;
pub mod resolver;
pub mod validator;
pub mod wrappers;

pub use cell::SingletonCell;
pub use conflicts::{select_implementation, InterfaceConflict, InterfaceConflictValidator, NameConflict};
pub use context::ApplicationContextImpl;
pub use flat::{FlatRegistry, Supplier};
pub use graph::DependencyGraph;
pub use registry::{CapabilityCaster, ComponentRegistration, ComponentRegistryImpl, RegistryBuilder};
pub use resolver::{DependencyResolver, Resolution};
pub use validator::{GraphValidator, ValidatedGraph};
pub use wrappers::{LazyRef, OptionalRef, Provider};

/// 生成代码通过这里引用静态初始化所需的类型
pub use once_cell;
