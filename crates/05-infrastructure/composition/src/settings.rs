//! 编译器设置
//!
//! 从可选的配置文件和 `DI_` 前缀的环境变量加载，环境变量优先。

use config::{Config, Environment, File};
use di_abstractions::EmissionStrategy;
use infrastructure_common::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// 默认环境变量前缀
pub const ENV_PREFIX: &str = "DI";

/// 编译器设置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerSettings {
    /// 生成策略
    pub strategy: EmissionStrategy,
    /// 严格模式：警告升级为错误
    pub strict: bool,
    /// 调试模式：记录解析细节
    pub debug: bool,
    /// 生成模块名称，也是输出子目录名
    pub module_name: String,
    /// 输出目录
    pub output_dir: PathBuf,
    /// 是否输出依赖图
    pub emit_graph: bool,
    /// 配置值解析使用的属性文件
    pub property_files: Vec<PathBuf>,
}

impl Default for CompilerSettings {
    fn default() -> Self {
        Self {
            strategy: EmissionStrategy::Indirect,
            strict: false,
            debug: false,
            module_name: "di_generated".to_string(),
            output_dir: PathBuf::from("target/di"),
            emit_graph: false,
            property_files: Vec::new(),
        }
    }
}

impl CompilerSettings {
    /// 从配置文件（可选）和 `DI_` 环境变量加载
    pub fn load(path: Option<&Path>) -> ConfigResult<Self> {
        Self::load_with_prefix(path, ENV_PREFIX)
    }

    /// 使用指定的环境变量前缀加载
    pub fn load_with_prefix(path: Option<&Path>, prefix: &str) -> ConfigResult<Self> {
        let mut builder = Config::builder();

        if let Some(path) = path {
            if !path.exists() {
                return Err(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                });
            }
            info!("加载编译器配置文件: {}", path.display());
            builder = builder.add_source(File::from(path));
        }

        builder = builder.add_source(
            Environment::with_prefix(prefix)
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("property_files"),
        );

        let settings: Self = builder
            .build()
            .and_then(Config::try_deserialize)
            .map_err(|e| ConfigError::parse_error(e.to_string()))?;
        settings.validate()?;
        debug!("编译器设置: {:?}", settings);
        Ok(settings)
    }

    /// 生成模块的输出目录
    pub fn module_dir(&self) -> PathBuf {
        self.output_dir.join(&self.module_name)
    }

    fn validate(&self) -> ConfigResult<()> {
        let valid = !self.module_name.is_empty()
            && !self.module_name.starts_with(|c: char| c.is_ascii_digit())
            && self
                .module_name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_');
        if !valid {
            return Err(ConfigError::ValidationError {
                message: format!("模块名称不是合法标识符: '{}'", self.module_name),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults_without_sources() {
        let settings = CompilerSettings::load_with_prefix(None, "DI_TEST_DEFAULTS").unwrap();
        assert_eq!(settings, CompilerSettings::default());
        assert_eq!(settings.module_dir(), PathBuf::from("target/di/di_generated"));
    }

    #[test]
    fn test_file_then_environment() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "strategy = \"direct\"\nstrict = true\nmodule_name = \"shop_di\"\nemit_graph = true"
        )
        .unwrap();

        std::env::set_var("DI_TEST_OVERRIDE_STRICT", "false");
        std::env::set_var("DI_TEST_OVERRIDE_OUTPUT_DIR", "build/generated");
        let settings =
            CompilerSettings::load_with_prefix(Some(file.path()), "DI_TEST_OVERRIDE").unwrap();
        std::env::remove_var("DI_TEST_OVERRIDE_STRICT");
        std::env::remove_var("DI_TEST_OVERRIDE_OUTPUT_DIR");

        assert_eq!(settings.strategy, EmissionStrategy::Direct);
        assert!(!settings.strict);
        assert!(settings.emit_graph);
        assert_eq!(settings.module_dir(), PathBuf::from("build/generated/shop_di"));
    }

    #[test]
    fn test_missing_file_and_bad_module_name() {
        let missing = CompilerSettings::load_with_prefix(
            Some(Path::new("/nonexistent/di.toml")),
            "DI_TEST_MISSING",
        );
        assert!(matches!(missing, Err(ConfigError::FileNotFound { .. })));

        let mut file: NamedTempFile = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"{{ "module_name": "9lives" }}"#).unwrap();
        let invalid = CompilerSettings::load_with_prefix(Some(file.path()), "DI_TEST_INVALID");
        assert!(matches!(invalid, Err(ConfigError::ValidationError { .. })));
    }
}
