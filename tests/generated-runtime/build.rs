//! 构建时按组件清单运行 DI 编译器，两种生成策略的产物都写入 `OUT_DIR`

use di_abstractions::EmissionStrategy;
use infrastructure_composition::{CompilerBuilder, ComponentManifest};
use std::path::PathBuf;

const MANIFEST: &str = "app.components.toml";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("cargo:rerun-if-changed={MANIFEST}");

    let manifest_dir = PathBuf::from(std::env::var("CARGO_MANIFEST_DIR")?);
    let out_dir = PathBuf::from(std::env::var("OUT_DIR")?);
    let path = manifest_dir.join(MANIFEST);
    let manifest = ComponentManifest::parse(&path, &std::fs::read_to_string(&path)?)?;

    for strategy in [EmissionStrategy::Direct, EmissionStrategy::Indirect] {
        let output = CompilerBuilder::new()
            .with_strategy(strategy)
            .build()?
            .compile(manifest.components.clone())?;
        for file in &output.artifacts.files {
            std::fs::write(out_dir.join(&file.path), &file.contents)?;
        }
    }
    Ok(())
}
