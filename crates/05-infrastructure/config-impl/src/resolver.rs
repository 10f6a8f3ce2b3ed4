//! 属性占位符解析器
//!
//! 支持 `${key}` 和 `${key:default}`。整个表达式是单个占位符时返回属性值；
//! 占位符嵌在文本中时逐个替换；不含占位符的表达式按字面返回。
//!
//! 属性查找顺序：显式设置的属性、环境变量（原名，再试大写下划线形式）、属性文件。

use crate::sources::PropertySource;
use infrastructure_common::{ConfigError, ConfigResult, ConfigurationResolver};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\{([^}:]+)(?::([^}]*))?\}").expect("占位符正则无效"));

/// 属性占位符解析器
#[derive(Debug, Clone)]
pub struct PropertyResolver {
    properties: HashMap<String, String>,
    files: PropertySource,
    use_environment: bool,
}

impl PropertyResolver {
    /// 创建解析器，默认读取环境变量
    pub fn new() -> Self {
        Self {
            properties: HashMap::new(),
            files: PropertySource::new(),
            use_environment: true,
        }
    }

    /// 设置显式属性，优先级最高
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// 批量设置显式属性
    pub fn with_properties<I, K, V>(mut self, properties: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.properties
            .extend(properties.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// 加载属性文件
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> ConfigResult<Self> {
        self.files.merge(PropertySource::from_file(path)?);
        Ok(self)
    }

    /// 加载目录下的默认属性文件
    pub fn with_default_files<P: AsRef<Path>>(mut self, base_dir: P) -> ConfigResult<Self> {
        self.files.merge(PropertySource::from_default_files(base_dir)?);
        Ok(self)
    }

    /// 添加已加载的属性集合
    pub fn with_source(mut self, source: PropertySource) -> Self {
        self.files.merge(source);
        self
    }

    /// 是否读取环境变量
    pub fn with_environment(mut self, enabled: bool) -> Self {
        self.use_environment = enabled;
        self
    }

    /// 查找属性
    pub fn lookup(&self, key: &str) -> Option<String> {
        if let Some(value) = self.properties.get(key) {
            return Some(value.clone());
        }
        if self.use_environment {
            if let Ok(value) = std::env::var(key) {
                return Some(value);
            }
            if let Ok(value) = std::env::var(env_name(key)) {
                return Some(value);
            }
        }
        self.files.get(key).map(str::to_string)
    }

    fn substitute(&self, expression: &str, captures: &Captures<'_>) -> ConfigResult<String> {
        let key = captures.get(1).map_or("", |m| m.as_str()).trim();
        match self.lookup(key) {
            Some(value) => Ok(value),
            None => captures
                .get(2)
                .map(|default| default.as_str().to_string())
                .ok_or_else(|| ConfigError::UnresolvedPlaceholder {
                    expression: expression.to_string(),
                    key: key.to_string(),
                }),
        }
    }
}

impl Default for PropertyResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigurationResolver for PropertyResolver {
    fn resolve(&self, expression: &str) -> Result<String, ConfigError> {
        let mut result = String::with_capacity(expression.len());
        let mut last = 0;
        for captures in PLACEHOLDER.captures_iter(expression) {
            let Some(whole) = captures.get(0) else {
                continue;
            };
            result.push_str(&expression[last..whole.start()]);
            result.push_str(&self.substitute(expression, &captures)?);
            last = whole.end();
        }
        if last == 0 {
            return Ok(expression.to_string());
        }
        result.push_str(&expression[last..]);
        debug!("配置表达式 {} 解析为 {}", expression, result);
        Ok(result)
    }
}

/// `app.max-size` → `APP_MAX_SIZE`
fn env_name(key: &str) -> String {
    key.chars()
        .map(|c| match c {
            '.' | '-' => '_',
            c => c.to_ascii_uppercase(),
        })
        .collect()
}
