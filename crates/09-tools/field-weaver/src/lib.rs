//! # Field Weaver
//!
//! 构建期预处理：为需要注入的非公开字段织入合成访问器 `__di_set_<field>`，
//! 使生成代码无需放宽字段可见性即可完成字段注入。
//!
//! 访问器名称由 [`infrastructure_common::accessor_name`] 推导，
//! 代码生成器使用同一规则预测名称。

pub mod artifact;
pub mod weaver;

pub use artifact::{
    ComponentArtifact, FieldEntry, FieldType, Instruction, LoadOpcode, MethodAccess, MethodEntry,
};
pub use infrastructure_common::{WeaveError, WeaveResult};
pub use weaver::{FieldAccessorWeaver, WeavingResult, ARTIFACT_EXTENSION};
