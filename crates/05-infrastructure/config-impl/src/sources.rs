//! 属性文件加载
//!
//! 借助 `config` crate 读取 TOML/JSON/YAML 文件，并把嵌套结构展平为以 `.` 分隔的键。

use infrastructure_common::{ConfigError, ConfigResult};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

/// 默认属性文件，按加载顺序排列，后加载的覆盖先加载的
pub const DEFAULT_PROPERTY_FILES: &[&str] = &[
    "application",
    "config/application",
    "di",
    "config/di",
];

/// 展平后的属性集合
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertySource {
    properties: BTreeMap<String, String>,
}

impl PropertySource {
    /// 创建空属性集合
    pub fn new() -> Self {
        Self::default()
    }

    /// 从单个文件加载，格式由扩展名决定
    pub fn from_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::FileNotFound {
                path: path.display().to_string(),
            });
        }

        debug!("加载属性文件: {}", path.display());
        let settings = config::Config::builder()
            .add_source(config::File::from(path))
            .build()
            .map_err(|e| ConfigError::parse_error(format!("{}: {}", path.display(), e)))?;
        Self::from_settings(settings)
    }

    /// 在目录下按默认文件名查找并加载，缺失的文件跳过
    pub fn from_default_files<P: AsRef<Path>>(base_dir: P) -> ConfigResult<Self> {
        let base_dir = base_dir.as_ref();
        let mut builder = config::Config::builder();
        for name in DEFAULT_PROPERTY_FILES {
            let candidate = base_dir.join(name);
            builder = builder.add_source(
                config::File::with_name(&candidate.to_string_lossy()).required(false),
            );
        }
        let settings = builder
            .build()
            .map_err(|e| ConfigError::parse_error(e.to_string()))?;
        Self::from_settings(settings)
    }

    fn from_settings(settings: config::Config) -> ConfigResult<Self> {
        let tree: Value = settings
            .try_deserialize()
            .map_err(|e| ConfigError::parse_error(e.to_string()))?;
        let mut source = Self::new();
        flatten(&tree, String::new(), &mut source.properties);
        debug!("属性加载完成: {} 项", source.properties.len());
        Ok(source)
    }

    /// 设置属性
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.properties.insert(key.into(), value.into());
    }

    /// 合并另一组属性，冲突时以对方为准
    pub fn merge(&mut self, other: PropertySource) {
        self.properties.extend(other.properties);
    }

    /// 查找属性
    pub fn get(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    /// 全部键，按字典序
    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.properties.keys().map(String::as_str)
    }

    /// 属性数量
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

fn flatten(value: &Value, prefix: String, out: &mut BTreeMap<String, String>) {
    match value {
        Value::Object(map) => {
            for (key, nested) in map {
                let key = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{prefix}.{key}")
                };
                flatten(nested, key, out);
            }
        }
        Value::Array(items) => {
            for (index, nested) in items.iter().enumerate() {
                flatten(nested, format!("{prefix}[{index}]"), out);
            }
        }
        Value::String(text) => {
            out.insert(prefix, text.clone());
        }
        Value::Null => {}
        other => {
            out.insert(prefix, other.to_string());
        }
    }
}
