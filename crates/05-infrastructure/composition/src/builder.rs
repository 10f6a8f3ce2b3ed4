//! 编译器构建器

use crate::compiler::DiCompiler;
use crate::manifest::ManifestMetadataReader;
use crate::settings::CompilerSettings;
use component_codegen::compiler_for;
use config_impl::PropertyResolver;
use di_abstractions::{EmissionStrategy, MetadataReader, StaticMetadataReader};
use di_impl::GraphValidator;
use infrastructure_common::{
    ComponentMetadata, ConditionEvaluator, ConfigurationResolver, InfrastructureError,
    InfrastructureResult,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

/// DI 编译器构建器
pub struct CompilerBuilder {
    settings: CompilerSettings,
    readers: Vec<Box<dyn MetadataReader>>,
    condition_evaluator: Option<Arc<dyn ConditionEvaluator>>,
    configuration: Option<Arc<dyn ConfigurationResolver>>,
    properties: Vec<(String, String)>,
    property_files: Vec<PathBuf>,
    logging_config: Option<LoggingConfig>,
}

impl CompilerBuilder {
    /// 创建新的构建器
    pub fn new() -> Self {
        Self {
            settings: CompilerSettings::default(),
            readers: Vec::new(),
            condition_evaluator: None,
            configuration: None,
            properties: Vec::new(),
            property_files: Vec::new(),
            logging_config: None,
        }
    }

    /// 使用给定设置
    pub fn with_settings(mut self, settings: CompilerSettings) -> Self {
        self.settings = settings;
        self
    }

    /// 从配置文件和环境变量加载设置
    pub fn load_settings(mut self, path: Option<&Path>) -> InfrastructureResult<Self> {
        self.settings = CompilerSettings::load(path)?;
        Ok(self)
    }

    /// 设置生成策略
    pub fn with_strategy(mut self, strategy: EmissionStrategy) -> Self {
        self.settings.strategy = strategy;
        self
    }

    /// 启用严格模式
    pub fn strict(mut self, enabled: bool) -> Self {
        self.settings.strict = enabled;
        self
    }

    /// 启用调试诊断
    pub fn debug(mut self, enabled: bool) -> Self {
        self.settings.debug = enabled;
        self
    }

    /// 添加元数据读取器
    pub fn add_reader<T: MetadataReader + 'static>(mut self, reader: T) -> Self {
        self.readers.push(Box::new(reader));
        self
    }

    /// 添加清单文件
    pub fn add_manifest<P: AsRef<Path>>(self, path: P) -> InfrastructureResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(InfrastructureError::BootstrapFailed {
                message: format!("清单文件不存在: {}", path.display()),
            });
        }
        Ok(self.add_reader(ManifestMetadataReader::new().with_file(path)))
    }

    /// 添加清单目录
    pub fn add_manifest_dir<P: AsRef<Path>>(self, dir: P) -> Self {
        self.add_reader(ManifestMetadataReader::new().with_directory(dir.as_ref()))
    }

    /// 直接添加组件元数据
    pub fn add_components(self, components: Vec<ComponentMetadata>) -> Self {
        self.add_reader(StaticMetadataReader::new(components))
    }

    /// 设置条件求值器
    pub fn with_condition_evaluator(mut self, evaluator: Arc<dyn ConditionEvaluator>) -> Self {
        self.condition_evaluator = Some(evaluator);
        self
    }

    /// 添加属性
    pub fn add_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.push((key.into(), value.into()));
        self
    }

    /// 添加属性文件
    pub fn add_property_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.property_files.push(path.into());
        self
    }

    /// 替换默认的配置解析器，此时属性与属性文件不再生效
    pub fn with_configuration(mut self, configuration: Arc<dyn ConfigurationResolver>) -> Self {
        self.configuration = Some(configuration);
        self
    }

    /// 配置日志
    pub fn with_logging(mut self, config: LoggingConfig) -> Self {
        self.logging_config = Some(config);
        self
    }

    /// 构建编译器
    pub fn build(self) -> InfrastructureResult<DiCompiler> {
        if let Some(logging) = &self.logging_config {
            initialize_logging(logging)?;
        }

        let configuration = match self.configuration {
            Some(configuration) => configuration,
            None => {
                let mut resolver = PropertyResolver::new().with_environment(true);
                for path in self.settings.property_files.iter().chain(&self.property_files) {
                    resolver = resolver.with_file(path)?;
                }
                Arc::new(resolver.with_properties(self.properties)) as Arc<dyn ConfigurationResolver>
            }
        };

        let mut validator = GraphValidator::new().with_configuration(configuration);
        if let Some(evaluator) = self.condition_evaluator {
            validator = validator.with_condition_evaluator(evaluator);
        }

        info!(
            "构建 DI 编译器: {} 策略, {} 个元数据来源",
            self.settings.strategy,
            self.readers.len()
        );
        let compiler = compiler_for(self.settings.strategy);
        Ok(DiCompiler::new(self.settings, self.readers, validator, compiler))
    }
}

impl Default for CompilerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// 初始化日志系统
pub fn initialize_logging(config: &LoggingConfig) -> InfrastructureResult<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(config.level)
        .with_target(config.show_target)
        .with_thread_ids(config.show_thread_ids)
        .with_file(config.show_file)
        .with_line_number(config.show_line_number);

    if config.json_format {
        subscriber.json().try_init()
    } else {
        subscriber.try_init()
    }
    .map_err(|e| InfrastructureError::BootstrapFailed {
        message: format!("日志初始化失败: {}", e),
    })?;

    info!("日志系统初始化完成");
    Ok(())
}

/// 日志配置
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// 日志级别
    pub level: tracing::Level,
    /// 是否显示目标
    pub show_target: bool,
    /// 是否显示线程ID
    pub show_thread_ids: bool,
    /// 是否显示文件名
    pub show_file: bool,
    /// 是否显示行号
    pub show_line_number: bool,
    /// 是否使用 JSON 格式
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: tracing::Level::INFO,
            show_target: true,
            show_thread_ids: false,
            show_file: false,
            show_line_number: false,
            json_format: false,
        }
    }
}

impl LoggingConfig {
    /// 本地调试用：输出解析细节
    pub fn development() -> Self {
        Self {
            level: tracing::Level::DEBUG,
            show_target: true,
            show_thread_ids: true,
            show_file: true,
            show_line_number: true,
            json_format: false,
        }
    }

    /// 构建服务器用：JSON 输出便于采集
    pub fn production() -> Self {
        Self {
            level: tracing::Level::INFO,
            show_target: false,
            show_thread_ids: false,
            show_file: false,
            show_line_number: false,
            json_format: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use infrastructure_common::{Dependency, InjectionPoint, PrimitiveType};

    #[test]
    fn test_builder_applies_settings() {
        let compiler = CompilerBuilder::new()
            .with_strategy(EmissionStrategy::Direct)
            .strict(true)
            .build()
            .unwrap();
        assert_eq!(compiler.settings().strategy, EmissionStrategy::Direct);
        assert!(compiler.settings().strict);
    }

    #[test]
    fn test_missing_manifest_is_rejected() {
        let result = CompilerBuilder::new().add_manifest("/nonexistent/app.components.json");
        assert!(matches!(result, Err(InfrastructureError::BootstrapFailed { .. })));
    }

    #[tokio::test]
    async fn test_properties_feed_value_dependencies() {
        let compiler = CompilerBuilder::new()
            .add_property("pool.size", "16")
            .add_components(vec![ComponentMetadata::new("app::Pool").with_injection_point(
                InjectionPoint::constructor("new")
                    .with_dependency(Dependency::value("${pool.size:4}", PrimitiveType::U32)),
            )])
            .build()
            .unwrap();

        let output = compiler.run().await.unwrap();
        let source = &output.artifacts.files[0].contents;
        assert!(source.contains("16u32"));
    }
}
