//! 图编译器抽象接口
//!
//! 两种生成策略都实现 [`GraphCompiler`]，由构建期开关选择，
//! 共享同一条验证流水线。

use crate::resolver::ResolvedGraph;
use infrastructure_common::{CompileError, Diagnostics};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// 生成策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmissionStrategy {
    /// 工厂 + 注册表
    #[default]
    Indirect,
    /// 静态初始化 + 直接访问器
    Direct,
}

impl fmt::Display for EmissionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Indirect => f.write_str("indirect"),
            Self::Direct => f.write_str("direct"),
        }
    }
}

impl FromStr for EmissionStrategy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "indirect" | "registry" => Ok(Self::Indirect),
            "direct" | "static" | "fast" => Ok(Self::Direct),
            other => Err(format!("未知的生成策略: {other}")),
        }
    }
}

/// 生成的文件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    /// 相对输出目录的路径
    pub path: PathBuf,
    /// 文件内容
    pub contents: String,
}

impl GeneratedFile {
    /// 创建生成文件
    pub fn new(path: impl Into<PathBuf>, contents: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            contents: contents.into(),
        }
    }
}

/// 生成结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedArtifacts {
    /// 使用的生成策略
    pub strategy: EmissionStrategy,
    /// 生成的文件
    pub files: Vec<GeneratedFile>,
}

impl GeneratedArtifacts {
    /// 创建空的生成结果
    pub fn new(strategy: EmissionStrategy) -> Self {
        Self {
            strategy,
            files: Vec::new(),
        }
    }

    /// 添加文件
    pub fn with_file(mut self, file: GeneratedFile) -> Self {
        self.files.push(file);
        self
    }

    /// 按路径查找文件
    pub fn file(&self, path: &str) -> Option<&GeneratedFile> {
        self.files
            .iter()
            .find(|file| file.path.to_string_lossy() == path)
    }
}

/// 图编译器 trait
pub trait GraphCompiler: Send + Sync {
    /// 生成策略
    fn strategy(&self) -> EmissionStrategy;

    /// 把已验证的组件图编译为源代码
    fn compile(
        &self,
        graph: &ResolvedGraph,
        diagnostics: &mut Diagnostics,
    ) -> Result<GeneratedArtifacts, CompileError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_from_str() {
        assert_eq!("direct".parse::<EmissionStrategy>(), Ok(EmissionStrategy::Direct));
        assert_eq!("Indirect".parse::<EmissionStrategy>(), Ok(EmissionStrategy::Indirect));
        assert!("reflective".parse::<EmissionStrategy>().is_err());
    }
}
