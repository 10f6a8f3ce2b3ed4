//! 元数据读取抽象接口
//!
//! 元数据提取由外部完成（注解扫描、清单文件等），编译器只消费结果。

use async_trait::async_trait;
use infrastructure_common::{ComponentError, ComponentMetadata};

/// 元数据读取器 trait
#[async_trait]
pub trait MetadataReader: Send + Sync {
    /// 读取全部组件元数据，保持发现顺序
    async fn read(&self) -> Result<Vec<ComponentMetadata>, ComponentError>;

    /// 读取器名称
    fn name(&self) -> &str;
}

/// 内存中的元数据读取器
#[derive(Debug, Clone, Default)]
pub struct StaticMetadataReader {
    components: Vec<ComponentMetadata>,
}

impl StaticMetadataReader {
    /// 创建读取器
    pub fn new(components: Vec<ComponentMetadata>) -> Self {
        Self { components }
    }

    /// 添加组件
    pub fn with_component(mut self, component: ComponentMetadata) -> Self {
        self.components.push(component);
        self
    }
}

#[async_trait]
impl MetadataReader for StaticMetadataReader {
    async fn read(&self) -> Result<Vec<ComponentMetadata>, ComponentError> {
        Ok(self.components.clone())
    }

    fn name(&self) -> &str {
        "static"
    }
}
