//! 直接生成策略的产物在运行时的行为
//!
//! 静态量在整个测试进程内共享，断言只依赖与执行顺序无关的性质。

use generated_runtime::app::{DiskStore, Lookup, A, B, C};
use generated_runtime::direct;
use std::sync::Arc;

#[test]
fn test_static_init_creates_dependencies_first() {
    direct::initialize();
    direct::initialize();

    let a = direct::a();
    let b = direct::b();
    let c = direct::c();
    assert!(c.serial < b.serial);
    assert!(b.serial < a.serial);
    assert!(Arc::ptr_eq(&a.b, &b));
    assert!(Arc::ptr_eq(&b.c, &c));
    assert!(a.is_started());

    direct::shutdown();
    assert!(b.is_closed());
}

#[test]
fn test_prototypes_are_distinct_and_injected() {
    let first = direct::request();
    let second = direct::request();

    assert!(!Arc::ptr_eq(&first, &second));
    assert_ne!(first.serial, second.serial);
    assert!(Arc::ptr_eq(&first.a, &second.a));
    assert!(Arc::ptr_eq(&first.a, &direct::a()));
    for request in [&first, &second] {
        let clock = request.clock().expect("方法注入应当已执行");
        assert!(Arc::ptr_eq(clock, &direct::c()));
    }
}

#[test]
fn test_optional_absent_and_provider_present() {
    let report = direct::report();
    assert!(!report.audit.is_present());
    assert!(report.audit.get().is_none());
    assert!(Arc::ptr_eq(&report.clock.get(), &direct::c()));
}

#[test]
fn test_capability_resolves_to_later_registration() {
    assert_eq!(direct::catalog().store.label(), "disk");

    let chosen = direct::LOOKUP.index_of_capability("crate::app::Store");
    assert_eq!(chosen, direct::LOOKUP.index_of("crate::app::DiskStore"));
    let store = direct::LOOKUP
        .get_typed::<DiskStore>("crate::app::DiskStore")
        .unwrap();
    assert!(Arc::ptr_eq(&store, &direct::disk_store()));
}

#[test]
fn test_flat_lookup_by_type_and_name() {
    let a = direct::LOOKUP.get_typed::<A>("crate::app::A").unwrap();
    assert!(Arc::ptr_eq(&a, &direct::a()));

    let b = direct::LOOKUP.get_by_name("b").unwrap().downcast::<B>().ok().unwrap();
    assert!(Arc::ptr_eq(&b, &direct::b()));

    let c = direct::LOOKUP.get_typed::<C>("crate::app::C").unwrap();
    assert!(Arc::ptr_eq(&c, &direct::c()));
}

#[test]
fn test_colliding_component_names_get_own_accessors() {
    // `Lookup` 与查找表同名，`CreateA` 与 A 的创建例程同名
    let lookup: Arc<Lookup> = direct::lookup_1();
    assert!(Arc::ptr_eq(&lookup, &direct::lookup_1()));
    let _ = direct::create_a_1();
    assert_eq!(direct::LOOKUP.len(), 10);
}
