//! 编译流水线
//!
//! 读取元数据 → 验证组件图 → 按策略生成代码 → 写出文件。

use crate::settings::CompilerSettings;
use chrono::{DateTime, Utc};
use di_abstractions::{GeneratedArtifacts, GraphCompiler, MetadataReader};
use di_impl::{DependencyGraph, GraphValidator};
use infrastructure_common::{
    ComponentMetadata, Diagnostics, InfrastructureError, InfrastructureResult, Severity,
};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// 依赖图输出文件名
pub const GRAPH_FILE: &str = "dependency-graph.dot";

/// 模块入口文件名
pub const MODULE_FILE: &str = "mod.rs";

/// 一次编译的产物
#[derive(Debug)]
pub struct CompilationOutput {
    /// 生成的源文件
    pub artifacts: GeneratedArtifacts,
    /// 编译过程中的诊断
    pub diagnostics: Diagnostics,
    /// 硬依赖图
    pub dependency_graph: DependencyGraph,
    /// 依赖图 DOT 文本，仅在开启图输出时存在
    pub graph_dot: Option<String>,
    /// 生成模块名称
    pub module_name: String,
    /// 生成时间
    pub generated_at: DateTime<Utc>,
}

impl CompilationOutput {
    /// 模块入口文件内容：声明全部生成文件并重新导出
    pub fn module_source(&self) -> String {
        let mut source = format!(
            "// 由 DI 编译器生成于 {}，请勿手动修改\n",
            self.generated_at.to_rfc3339()
        );
        for file in &self.artifacts.files {
            if let Some(stem) = file.path.file_stem().and_then(|s| s.to_str()) {
                source.push_str(&format!("pub mod {stem};\npub use {stem}::*;\n"));
            }
        }
        source
    }

    /// 写出到 `dir/<module_name>/`，返回写出的文件路径
    pub async fn write_to(&self, dir: &Path) -> InfrastructureResult<Vec<PathBuf>> {
        let module_dir = dir.join(&self.module_name);
        tokio::fs::create_dir_all(&module_dir).await?;

        let mut written = Vec::new();
        for file in &self.artifacts.files {
            let path = module_dir.join(&file.path);
            if let Some(parent) = path.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            tokio::fs::write(&path, &file.contents).await?;
            debug!("写出 {}", path.display());
            written.push(path);
        }

        let module_path = module_dir.join(MODULE_FILE);
        tokio::fs::write(&module_path, self.module_source()).await?;
        written.push(module_path);

        if let Some(dot) = &self.graph_dot {
            let graph_path = module_dir.join(GRAPH_FILE);
            tokio::fs::write(&graph_path, dot).await?;
            written.push(graph_path);
        }

        info!("生成代码写入 {}: {} 个文件", module_dir.display(), written.len());
        Ok(written)
    }
}

/// DI 编译器
pub struct DiCompiler {
    settings: CompilerSettings,
    readers: Vec<Box<dyn MetadataReader>>,
    validator: GraphValidator,
    compiler: Box<dyn GraphCompiler>,
}

impl DiCompiler {
    pub(crate) fn new(
        settings: CompilerSettings,
        readers: Vec<Box<dyn MetadataReader>>,
        validator: GraphValidator,
        compiler: Box<dyn GraphCompiler>,
    ) -> Self {
        Self {
            settings,
            readers,
            validator,
            compiler,
        }
    }

    /// 当前设置
    pub fn settings(&self) -> &CompilerSettings {
        &self.settings
    }

    /// 依次执行全部读取器并编译
    pub async fn run(&self) -> InfrastructureResult<CompilationOutput> {
        let mut components = Vec::new();
        for reader in &self.readers {
            let read = reader.read().await?;
            debug!("读取器 '{}' 提供 {} 个组件", reader.name(), read.len());
            components.extend(read);
        }
        self.compile(components)
    }

    /// 编译给定的组件
    pub fn compile(&self, components: Vec<ComponentMetadata>) -> InfrastructureResult<CompilationOutput> {
        let started = std::time::Instant::now();
        let mut diagnostics = Diagnostics::new()
            .with_strict(self.settings.strict)
            .with_debug(self.settings.debug);

        let validated = match self.validator.validate(components, &mut diagnostics) {
            Ok(validated) => validated,
            Err(errors) => {
                report(&diagnostics);
                return Err(errors.into());
            }
        };

        let artifacts = match self.compiler.compile(&validated.resolved, &mut diagnostics) {
            Ok(artifacts) => artifacts,
            Err(error) => {
                report(&diagnostics);
                return Err(InfrastructureError::Compile { errors: vec![error] });
            }
        };
        report(&diagnostics);

        let graph_dot = self
            .settings
            .emit_graph
            .then(|| validated.dependency_graph.to_dot());

        info!(
            "编译完成: {} 策略, {} 个组件, {} 个警告, 耗时 {:?}",
            self.compiler.strategy(),
            validated.resolved.components().len(),
            diagnostics.warning_count(),
            started.elapsed()
        );

        Ok(CompilationOutput {
            artifacts,
            diagnostics,
            dependency_graph: validated.dependency_graph,
            graph_dot,
            module_name: self.settings.module_name.clone(),
            generated_at: Utc::now(),
        })
    }

    /// 编译并写出到设置中的输出目录
    pub async fn run_and_write(&self) -> InfrastructureResult<CompilationOutput> {
        let output = self.run().await?;
        output.write_to(&self.settings.output_dir).await?;
        Ok(output)
    }
}

fn report(diagnostics: &Diagnostics) {
    for diagnostic in diagnostics.iter() {
        match diagnostic.severity {
            Severity::Error => warn!("错误: {}", diagnostic),
            Severity::Warning => warn!("{}", diagnostic),
            Severity::Note => debug!("{}", diagnostic),
        }
    }
}
