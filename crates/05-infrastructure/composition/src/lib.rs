//! # DI 编译器组合层
//!
//! 把元数据读取、组件图验证和代码生成组合成一条编译流水线。
//!
//! ## 主要功能
//!
//! - **编译器设置**: 从配置文件和 `DI_` 环境变量加载生成策略、严格模式和输出目录
//! - **清单读取**: 从 JSON/TOML 组件清单读取组件元数据
//! - **编译流水线**: 验证组件图，按策略生成代码并写出
//!
//! ## 基本使用
//!
//! ```rust,no_run
//! use infrastructure_composition::{CompilerBuilder, LoggingConfig};
//! use di_abstractions::EmissionStrategy;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let compiler = CompilerBuilder::new()
//!         .with_strategy(EmissionStrategy::Direct)
//!         .add_manifest_dir("components")
//!         .add_property_file("application.toml")
//!         .with_logging(LoggingConfig::development())
//!         .build()?;
//!
//!     let output = compiler.run_and_write().await?;
//!     println!("生成 {} 个文件", output.artifacts.files.len());
//!     Ok(())
//! }
//! ```

pub mod builder;
pub mod compiler;
pub mod manifest;
pub mod settings;

pub use builder::{initialize_logging, CompilerBuilder, LoggingConfig};
pub use compiler::{CompilationOutput, DiCompiler, GRAPH_FILE, MODULE_FILE};
pub use manifest::{ComponentManifest, ManifestMetadataReader, ManifestSource};
pub use settings::{CompilerSettings, ENV_PREFIX};

// 重新导出错误类型
pub use infrastructure_common::InfrastructureError;
