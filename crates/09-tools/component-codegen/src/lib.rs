//! # Component Codegen
//!
//! 把验证后的组件图编译为不使用运行时反射的 Rust 源代码。
//!
//! ## 生成策略
//!
//! - [`RegistryCompiler`] - 间接策略：每个组件一个工厂，注册进组件注册表
//! - [`DirectCompiler`] - 直接策略：静态访问器、静态初始化块和平铺数组查找表
//!
//! 两种策略实现同一个 [`GraphCompiler`] trait，由 [`compiler_for`] 按构建参数选择。
//!
//! ## 使用示例
//!
//! ```rust,no_run
//! use component_codegen::compiler_for;
//! use di_abstractions::EmissionStrategy;
//! use di_impl::GraphValidator;
//! use infrastructure_common::{ComponentMetadata, Diagnostics};
//!
//! let mut diagnostics = Diagnostics::new();
//! let validated = GraphValidator::new()
//!     .validate(vec![ComponentMetadata::new("app::Clock")], &mut diagnostics)
//!     .expect("组件图有效");
//! let artifacts = compiler_for(EmissionStrategy::Direct)
//!     .compile(&validated.resolved, &mut diagnostics)
//!     .expect("生成成功");
//! assert_eq!(artifacts.files.len(), 1);
//! ```

pub mod expressions;
pub mod naming;
pub mod registry_generator;
pub mod render;
pub mod routines;
pub mod static_generator;

pub use di_abstractions::GraphCompiler;
pub use naming::{assign_names, ComponentNames};
pub use registry_generator::{RegistryCompiler, DEFAULT_REGISTRY_FILE};
pub use static_generator::{promoted_lazy_singletons, DirectCompiler, DEFAULT_CONTAINER_FILE};

use di_abstractions::EmissionStrategy;

/// 按生成策略创建图编译器
pub fn compiler_for(strategy: EmissionStrategy) -> Box<dyn GraphCompiler> {
    match strategy {
        EmissionStrategy::Indirect => Box::new(RegistryCompiler::new()),
        EmissionStrategy::Direct => Box::new(DirectCompiler::new()),
    }
}
