//! 组件清单读取
//!
//! 清单是 JSON 或 TOML 文件，顶层 `components` 数组保存组件元数据。
//! 目录来源会递归发现 `*.components.json` 与 `*.components.toml`。

use async_trait::async_trait;
use di_abstractions::MetadataReader;
use infrastructure_common::{decapitalize, ComponentError, ComponentMetadata};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// 清单文件后缀
pub const MANIFEST_SUFFIXES: [&str; 2] = ["components.json", "components.toml"];

/// 清单文件内容
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentManifest {
    /// 组件列表，按注册顺序
    #[serde(default)]
    pub components: Vec<ComponentMetadata>,
}

impl ComponentManifest {
    /// 按扩展名解析清单文本
    pub fn parse(path: &Path, text: &str) -> Result<Self, ComponentError> {
        let extension = path.extension().and_then(|e| e.to_str()).unwrap_or_default();
        let mut manifest: Self = match extension {
            "json" => serde_json::from_str(text)
                .map_err(|e| ComponentError::invalid_metadata(format!("{}: {e}", path.display())))?,
            "toml" => toml::from_str(text)
                .map_err(|e| ComponentError::invalid_metadata(format!("{}: {e}", path.display())))?,
            other => {
                return Err(ComponentError::invalid_metadata(format!(
                    "{}: 不支持的清单格式 '{other}'",
                    path.display()
                )))
            }
        };
        for component in &mut manifest.components {
            if component.name.is_empty() {
                component.name = decapitalize(component.type_name.simple_name());
            }
        }
        Ok(manifest)
    }
}

/// 清单来源
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManifestSource {
    /// 单个清单文件
    File(PathBuf),
    /// 递归发现清单的目录
    Directory(PathBuf),
}

/// 基于清单文件的元数据读取器
#[derive(Debug, Clone, Default)]
pub struct ManifestMetadataReader {
    sources: Vec<ManifestSource>,
}

impl ManifestMetadataReader {
    /// 创建读取器
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加清单文件
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.sources.push(ManifestSource::File(path.into()));
        self
    }

    /// 添加清单目录
    pub fn with_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.sources.push(ManifestSource::Directory(dir.into()));
        self
    }

    /// 展开全部来源为清单文件列表
    pub fn manifest_files(&self) -> Result<Vec<PathBuf>, ComponentError> {
        let mut files = Vec::new();
        for source in &self.sources {
            match source {
                ManifestSource::File(path) => files.push(path.clone()),
                ManifestSource::Directory(dir) => files.extend(discover(dir)?),
            }
        }
        Ok(files)
    }
}

fn discover(dir: &Path) -> Result<Vec<PathBuf>, ComponentError> {
    if !dir.is_dir() {
        return Err(ComponentError::scan_error(format!(
            "清单目录不存在: {}",
            dir.display()
        )));
    }
    let mut files = Vec::new();
    for suffix in MANIFEST_SUFFIXES {
        let pattern = dir.join("**").join(format!("*.{suffix}"));
        let pattern = pattern.to_string_lossy();
        let entries = glob::glob(&pattern)
            .map_err(|e| ComponentError::scan_error(format!("{pattern}: {e}")))?;
        for entry in entries {
            files.push(entry.map_err(|e| ComponentError::scan_error(e.to_string()))?);
        }
    }
    files.sort();
    debug!("在 {} 发现 {} 个清单", dir.display(), files.len());
    Ok(files)
}

#[async_trait]
impl MetadataReader for ManifestMetadataReader {
    async fn read(&self) -> Result<Vec<ComponentMetadata>, ComponentError> {
        let mut components = Vec::new();
        for path in self.manifest_files()? {
            let text = tokio::fs::read_to_string(&path).await.map_err(|e| {
                ComponentError::scan_error(format!("读取清单失败: {}: {e}", path.display()))
            })?;
            let manifest = ComponentManifest::parse(&path, &text)?;
            debug!("清单 {}: {} 个组件", path.display(), manifest.components.len());
            components.extend(manifest.components);
        }
        info!("从清单读取 {} 个组件", components.len());
        Ok(components)
    }

    fn name(&self) -> &str {
        "manifest"
    }
}
