//! 间接生成策略的产物在运行时的行为

use di_abstractions::{ApplicationContext, ComponentLookupExt};
use generated_runtime::app::{Catalog, Report, Request, Store, A, B, C};
use generated_runtime::indirect;
use std::sync::Arc;

#[tokio::test]
async fn test_context_start_creates_dependencies_first() {
    let context = indirect::application_context().unwrap();
    context.start().await.unwrap();

    let created = context.registry().created_singletons();
    let position = |type_name: &str| created.iter().position(|t| *t == type_name).unwrap();
    assert!(position("crate::app::C") < position("crate::app::B"));
    assert!(position("crate::app::B") < position("crate::app::A"));

    let registry = context.registry();
    let a = registry.get::<A>("crate::app::A").unwrap();
    let b = registry.get::<B>("crate::app::B").unwrap();
    assert!(a.is_started());
    assert!(Arc::ptr_eq(&a.b, &b));
    assert!(b.c.serial < b.serial);

    context.stop().await.unwrap();
    assert!(b.is_closed());
}

#[test]
fn test_prototypes_are_distinct_and_injected() {
    let registry = indirect::build_registry().unwrap();
    let first = registry.get::<Request>("crate::app::Request").unwrap();
    let second = registry.get::<Request>("crate::app::Request").unwrap();

    assert!(!Arc::ptr_eq(&first, &second));
    assert_ne!(first.serial, second.serial);
    assert!(Arc::ptr_eq(&first.a, &second.a));
    let c = registry.get::<C>("crate::app::C").unwrap();
    for request in [&first, &second] {
        assert!(Arc::ptr_eq(request.clock().unwrap(), &c));
    }
}

#[test]
fn test_optional_absent_and_provider_present() {
    let registry = indirect::build_registry().unwrap();
    let report = registry.get::<Report>("crate::app::Report").unwrap();
    assert!(!report.audit.is_present());

    let c = registry.get::<C>("crate::app::C").unwrap();
    assert!(Arc::ptr_eq(&report.clock.get(), &c));
}

#[test]
fn test_capability_resolves_to_later_registration() {
    let registry = indirect::build_registry().unwrap();
    let store = registry.resolve_capability::<dyn Store>("crate::app::Store").unwrap();
    assert_eq!(store.label(), "disk");
    assert_eq!(registry.resolve_all_capability::<dyn Store>("crate::app::Store").len(), 2);

    let catalog = registry.get::<Catalog>("crate::app::Catalog").unwrap();
    assert_eq!(catalog.store.label(), "disk");
}

#[test]
fn test_wrapped_dependencies_do_not_keep_registry_alive() {
    let registry = indirect::build_registry().unwrap();
    let report = registry.get::<Report>("crate::app::Report").unwrap();
    let weak = Arc::downgrade(&registry);

    drop(registry);
    assert!(weak.upgrade().is_none());
    assert!(!report.audit.is_present());
}
