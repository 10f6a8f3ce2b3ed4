//! 代码生成集成测试：清单 → 编译流水线 → 两种生成策略，以及织入器与生成代码的访问器约定

use component_codegen::{DEFAULT_CONTAINER_FILE, DEFAULT_REGISTRY_FILE};
use di_abstractions::EmissionStrategy;
use field_weaver::{ComponentArtifact, FieldAccessorWeaver, FieldEntry, FieldType};
use infrastructure_common::{
    CompileError, ComponentMetadata, Condition, ConditionContext, ConditionEvaluator, Dependency,
    InfrastructureError, InjectionPoint, Visibility,
};
use infrastructure_composition::{CompilerBuilder, CompilerSettings, GRAPH_FILE, MODULE_FILE};
use std::sync::Arc;
use tempfile::TempDir;

const SHOP_MANIFEST: &str = r#"{
    "components": [
        {
            "type_name": "shop::OrderService",
            "injection_points": [
                {
                    "kind": "constructor",
                    "target": "new",
                    "dependencies": [
                        { "type_name": "shop::Inventory", "kind": "direct" },
                        { "type_name": "u32", "kind": "value", "expression": "${orders.batch:25}", "target": "u32" }
                    ]
                },
                {
                    "kind": "field",
                    "target": "audit",
                    "visibility": "private",
                    "dependencies": [ { "type_name": "shop::AuditLog", "kind": "optional" } ]
                }
            ],
            "hooks": { "post_create": "start" }
        },
        { "type_name": "shop::Inventory", "lazy": true, "capabilities": ["shop::Stock"] },
        { "type_name": "shop::AuditLog", "scope": "prototype" }
    ]
}"#;

fn write_manifest(dir: &TempDir) {
    std::fs::write(dir.path().join("shop.components.json"), SHOP_MANIFEST).unwrap();
}

#[tokio::test]
async fn test_both_strategies_from_one_manifest() {
    let manifests = TempDir::new().unwrap();
    write_manifest(&manifests);

    let indirect = CompilerBuilder::new()
        .with_strategy(EmissionStrategy::Indirect)
        .add_manifest_dir(manifests.path())
        .build()
        .unwrap()
        .run()
        .await
        .unwrap();
    let registry = &indirect.artifacts.file(DEFAULT_REGISTRY_FILE).unwrap().contents;
    assert!(registry.contains("pub struct OrderServiceFactory;"));
    assert!(registry.contains("pub struct InventoryFactory;"));
    assert!(registry.contains("25u32"));
    assert!(registry.contains("instance.__di_set_audit("));

    let direct = CompilerBuilder::new()
        .with_strategy(EmissionStrategy::Direct)
        .add_manifest_dir(manifests.path())
        .add_property("orders.batch", "50")
        .build()
        .unwrap()
        .run()
        .await
        .unwrap();
    let container = &direct.artifacts.file(DEFAULT_CONTAINER_FILE).unwrap().contents;
    assert!(container.contains("pub fn order_service()"));
    assert!(container.contains("pub fn inventory()"));
    assert!(container.contains("50u32"));
    assert!(container.contains("instance.__di_set_audit("));
    assert!(container.contains("instance.start();"));

    // 惰性单例被急切单例依赖，提升到静态初始化
    assert!(direct
        .diagnostics
        .iter()
        .any(|d| d.message.contains("shop::Inventory") && d.message.contains("静态初始化")));
}

#[tokio::test]
async fn test_settings_drive_output_layout() {
    let manifests = TempDir::new().unwrap();
    write_manifest(&manifests);
    let output_dir = TempDir::new().unwrap();

    let settings = CompilerSettings {
        strategy: EmissionStrategy::Direct,
        module_name: "shop_di".to_string(),
        output_dir: output_dir.path().to_path_buf(),
        emit_graph: true,
        ..CompilerSettings::default()
    };
    let compiler = CompilerBuilder::new()
        .with_settings(settings)
        .add_manifest(manifests.path().join("shop.components.json"))
        .unwrap()
        .build()
        .unwrap();
    compiler.run_and_write().await.unwrap();

    let module_dir = output_dir.path().join("shop_di");
    assert!(module_dir.join(DEFAULT_CONTAINER_FILE).exists());
    assert!(module_dir.join(MODULE_FILE).exists());
    let dot = std::fs::read_to_string(module_dir.join(GRAPH_FILE)).unwrap();
    assert!(dot.contains("\"shop::OrderService\" -> \"shop::Inventory\""));
}

#[tokio::test]
async fn test_strict_mode_turns_conflicts_into_errors() {
    let components = || {
        vec![
            ComponentMetadata::new("shop::MemoryStock").with_capability("shop::Stock"),
            ComponentMetadata::new("shop::DiskStock").with_capability("shop::Stock"),
        ]
    };

    let relaxed = CompilerBuilder::new()
        .add_components(components())
        .build()
        .unwrap()
        .run()
        .await
        .unwrap();
    assert_eq!(relaxed.diagnostics.warning_count(), 1);

    let strict = CompilerBuilder::new()
        .strict(true)
        .add_components(components())
        .build()
        .unwrap()
        .run()
        .await;
    match strict {
        Err(InfrastructureError::Compile { errors }) => {
            assert!(errors.iter().all(|e| matches!(e, CompileError::Strict { .. })));
        }
        other => panic!("strict build should fail, got ok = {}", other.is_ok()),
    }
}

struct ActiveProfile(&'static str);

impl ConditionEvaluator for ActiveProfile {
    fn matches(
        &self,
        _component: &ComponentMetadata,
        condition: &Condition,
        _context: &ConditionContext<'_>,
    ) -> bool {
        match condition {
            Condition::Profile { profiles } => profiles.iter().any(|p| p == self.0),
            _ => true,
        }
    }
}

#[tokio::test]
async fn test_condition_evaluator_excludes_components() {
    let output = CompilerBuilder::new()
        .with_strategy(EmissionStrategy::Direct)
        .with_condition_evaluator(Arc::new(ActiveProfile("prod")))
        .add_components(vec![
            ComponentMetadata::new("shop::FakeMailer").with_condition(Condition::Profile {
                profiles: vec!["test".to_string()],
            }),
            ComponentMetadata::new("shop::SmtpMailer").with_condition(Condition::Profile {
                profiles: vec!["prod".to_string()],
            }),
        ])
        .build()
        .unwrap()
        .run()
        .await
        .unwrap();

    let container = &output.artifacts.file(DEFAULT_CONTAINER_FILE).unwrap().contents;
    assert!(container.contains("smtp_mailer"));
    assert!(!container.contains("fake_mailer"));
}

#[test]
fn test_woven_accessor_matches_generated_call() {
    let point = InjectionPoint::field("clock", Dependency::direct("shop::Clock"))
        .with_visibility(Visibility::Private);
    let expected = point.accessor_name().unwrap();

    let mut artifact = ComponentArtifact::new("shop::OrderService").with_field(
        FieldEntry::new("clock", FieldType::Reference("shop::Clock".into())).injected(),
    );
    let added = FieldAccessorWeaver::new().weave(&mut artifact).unwrap();
    assert_eq!(added, vec![expected.clone()]);

    let output = CompilerBuilder::new()
        .build()
        .unwrap()
        .compile(vec![
            ComponentMetadata::new("shop::Clock"),
            ComponentMetadata::new("shop::OrderService").with_injection_point(point),
        ])
        .unwrap();
    let registry = &output.artifacts.file(DEFAULT_REGISTRY_FILE).unwrap().contents;
    assert!(registry.contains(&format!("instance.{expected}(")));
}
