//! 错误类型定义

use crate::configuration::PrimitiveType;
use std::path::PathBuf;
use thiserror::Error;

/// 配置错误类型
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("配置文件不存在: {path}")]
    FileNotFound { path: String },

    #[error("配置文件读取失败: {source}")]
    FileReadError {
        #[from]
        source: std::io::Error,
    },

    #[error("配置解析失败: {message}")]
    ParseError { message: String },

    #[error("配置键不存在: {key}")]
    KeyNotFound { key: String },

    #[error("无法解析占位符 '{key}'，表达式: {expression}")]
    UnresolvedPlaceholder { expression: String, key: String },

    #[error("配置类型转换失败: 无法将 '{literal}' 转换为 {target}")]
    TypeConversionError {
        literal: String,
        target: PrimitiveType,
    },

    #[error("配置验证失败: {message}")]
    ValidationError { message: String },
}

impl ConfigError {
    /// 创建类型转换错误
    pub fn type_conversion(literal: impl Into<String>, target: PrimitiveType) -> Self {
        Self::TypeConversionError {
            literal: literal.into(),
            target,
        }
    }

    /// 创建解析错误
    pub fn parse_error(message: impl Into<String>) -> Self {
        Self::ParseError {
            message: message.into(),
        }
    }
}

/// 依赖注入运行时错误类型
#[derive(Error, Debug)]
pub enum DependencyError {
    #[error("组件未注册: {type_name}")]
    ComponentNotRegistered { type_name: String },

    #[error("组件重复注册: {type_name}")]
    DuplicateRegistration { type_name: String },

    #[error("组件 {type_name} 声明的依赖 {dependency} 未注册")]
    MissingDeclaredDependency { type_name: String, dependency: String },

    #[error("组件类型不匹配: {type_name}")]
    TypeMismatch { type_name: String },
}

/// 组件元数据错误类型
#[derive(Error, Debug)]
pub enum ComponentError {
    #[error("组件扫描失败: {message}")]
    ScanError { message: String },

    #[error("组件元数据无效: {message}")]
    InvalidMetadata { message: String },
}

impl ComponentError {
    /// 创建扫描错误
    pub fn scan_error(message: impl Into<String>) -> Self {
        Self::ScanError {
            message: message.into(),
        }
    }

    /// 创建元数据错误
    pub fn invalid_metadata(message: impl Into<String>) -> Self {
        Self::InvalidMetadata {
            message: message.into(),
        }
    }
}

/// 编译期错误类型
///
/// 任一编译期错误都会终止整个构建，不会输出部分注册表。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    #[error("组件 {component} 结构错误: {message}")]
    Structural { component: String, message: String },

    #[error("检测到循环依赖: {cycle}")]
    CircularDependency { cycle: String },

    #[error(
        "无法解析依赖: 组件 {component} 的 {point} 第 {position} 个参数需要 {dependency_type}，但没有匹配的组件。{hint}"
    )]
    UnresolvedDependency {
        component: String,
        point: String,
        position: usize,
        dependency_type: String,
        hint: String,
    },

    #[error("组件 {component} 的 depends_on 引用了未知组件 '{name}'{}", suggestion_text(.suggestion))]
    UnknownDependsOn {
        component: String,
        name: String,
        suggestion: Option<String>,
    },

    #[error("组件 {component} 的配置值 '{literal}' 无法转换为 {target}: {message}")]
    Conversion {
        component: String,
        literal: String,
        target: String,
        message: String,
    },

    #[error("严格模式: {message}")]
    Strict { message: String },

    #[error("无效的类型路径 '{type_name}': {message}")]
    InvalidTypePath { type_name: String, message: String },

    #[error("代码生成失败: {message}")]
    Generation { message: String },
}

fn suggestion_text(suggestion: &Option<String>) -> String {
    suggestion
        .as_ref()
        .map(|name| format!("，是否想引用 '{name}'?"))
        .unwrap_or_default()
}

impl CompileError {
    /// 创建结构错误
    pub fn structural(component: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Structural {
            component: component.into(),
            message: message.into(),
        }
    }

    /// 创建代码生成错误
    pub fn generation(message: impl Into<String>) -> Self {
        Self::Generation {
            message: message.into(),
        }
    }
}

/// 生命周期错误类型
#[derive(Error, Debug)]
pub enum LifecycleError {
    #[error("生命周期状态无效: 期望 {expected}, 实际 {actual}")]
    InvalidState { expected: String, actual: String },

    #[error("组件启动失败: {component}, 原因: {message}")]
    StartFailed { component: String, message: String },

    #[error("组件停止失败: {component}, 原因: {message}")]
    StopFailed { component: String, message: String },
}

/// 字段访问器织入错误类型
#[derive(Error, Debug)]
pub enum WeaveError {
    #[error("构件读取失败: {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("构件格式无效: {message}")]
    InvalidArtifact { message: String },

    #[error("访问器 {accessor} 已存在但签名不符: 期望 {expected}，实际 {actual}")]
    AccessorConflict {
        accessor: String,
        expected: String,
        actual: String,
    },

    #[error("目录匹配模式无效: {pattern}: {message}")]
    InvalidPattern { pattern: String, message: String },
}

impl WeaveError {
    /// 创建 I/O 错误
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// 创建构件格式错误
    pub fn invalid_artifact(message: impl Into<String>) -> Self {
        Self::InvalidArtifact {
            message: message.into(),
        }
    }
}

/// 基础设施错误类型
#[derive(Error, Debug)]
pub enum InfrastructureError {
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),

    #[error("依赖注入错误: {0}")]
    Dependency(#[from] DependencyError),

    #[error("组件错误: {0}")]
    Component(#[from] ComponentError),

    #[error("生命周期错误: {0}")]
    Lifecycle(#[from] LifecycleError),

    #[error("织入错误: {0}")]
    Weave(#[from] WeaveError),

    #[error("编译失败，共 {} 个错误: {}", .errors.len(), join_errors(.errors))]
    Compile { errors: Vec<CompileError> },

    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),

    #[error("基础设施启动失败: {message}")]
    BootstrapFailed { message: String },
}

fn join_errors(errors: &[CompileError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl From<Vec<CompileError>> for InfrastructureError {
    fn from(errors: Vec<CompileError>) -> Self {
        Self::Compile { errors }
    }
}

/// 配置结果类型
pub type ConfigResult<T> = Result<T, ConfigError>;

/// 依赖注入结果类型
pub type DependencyResult<T> = Result<T, DependencyError>;

/// 组件结果类型
pub type ComponentResult<T> = Result<T, ComponentError>;

/// 生命周期结果类型
pub type LifecycleResult<T> = Result<T, LifecycleError>;

/// 织入结果类型
pub type WeaveResult<T> = Result<T, WeaveError>;

/// 基础设施结果类型
pub type InfrastructureResult<T> = Result<T, InfrastructureError>;
