//! di-impl 集成测试：运行时注册表生命周期与组件图验证

use config_impl::PropertyResolver;
use di_abstractions::{
    ApplicationContext, Binding, CapabilityView, ComponentFactory, ComponentLookup,
    ComponentLookupExt, Instance, WeakLookup,
};
use di_impl::{
    ApplicationContextImpl, ComponentRegistration, ComponentRegistryImpl, GraphValidator, Provider,
};
use infrastructure_common::{
    CompileError, ComponentMetadata, Dependency, Diagnostics, InjectionPoint,
    LifecycleState, PrimitiveType, Scope,
};
use parking_lot::Mutex;
use std::sync::Arc;

type Journal = Arc<Mutex<Vec<String>>>;

trait Store: Send + Sync {
    fn label(&self) -> &'static str;
}

struct Database;

impl Store for Database {
    fn label(&self) -> &'static str {
        "database"
    }
}

struct Cache {
    database: Arc<Database>,
}

impl Store for Cache {
    fn label(&self) -> &'static str {
        "cache"
    }
}

struct Report;

struct DatabaseFactory {
    journal: Journal,
}

impl ComponentFactory for DatabaseFactory {
    fn type_name(&self) -> &'static str {
        "app::Database"
    }

    fn create(&self, _lookup: &Arc<dyn ComponentLookup>) -> Instance {
        self.journal.lock().push("create database".to_string());
        Arc::new(Database)
    }

    fn pre_destroy(&self, _instance: &Instance) {
        self.journal.lock().push("close database".to_string());
    }
}

struct CacheFactory {
    journal: Journal,
}

impl ComponentFactory for CacheFactory {
    fn type_name(&self) -> &'static str {
        "app::Cache"
    }

    fn dependencies(&self) -> &'static [&'static str] {
        &["app::Database"]
    }

    fn create(&self, lookup: &Arc<dyn ComponentLookup>) -> Instance {
        let database = lookup.require::<Database>("app::Database");
        self.journal.lock().push("create cache".to_string());
        Arc::new(Cache { database })
    }

    fn post_create(&self, _instance: &Instance) {
        self.journal.lock().push("warm cache".to_string());
    }

    fn pre_destroy(&self, _instance: &Instance) {
        self.journal.lock().push("flush cache".to_string());
    }
}

struct ReportFactory;

impl ComponentFactory for ReportFactory {
    fn type_name(&self) -> &'static str {
        "app::Report"
    }

    fn create(&self, _lookup: &Arc<dyn ComponentLookup>) -> Instance {
        Arc::new(Report)
    }
}

fn as_store<T: Store + 'static>(instance: Instance) -> Option<CapabilityView> {
    let typed: Arc<T> = instance.downcast::<T>().ok()?;
    let view: Arc<dyn Store> = typed;
    Some(Box::new(view))
}

fn registry(journal: &Journal) -> Arc<ComponentRegistryImpl> {
    // 注册顺序故意让依赖者在前
    ComponentRegistryImpl::builder()
        .register(
            ComponentRegistration::new(
                Arc::new(CacheFactory {
                    journal: Arc::clone(journal),
                }),
                "cache",
                Scope::Singleton,
            )
            .with_capability("app::Store", as_store::<Cache>),
        )
        .register(
            ComponentRegistration::new(
                Arc::new(DatabaseFactory {
                    journal: Arc::clone(journal),
                }),
                "database",
                Scope::Singleton,
            )
            .primary(true)
            .with_capability("app::Store", as_store::<Database>),
        )
        .register(ComponentRegistration::new(Arc::new(ReportFactory), "report", Scope::Prototype))
        .build()
        .expect("registry should build")
}

#[tokio::test]
async fn test_context_lifecycle_runs_hooks_in_dependency_order() {
    let journal: Journal = Arc::default();
    let context = ApplicationContextImpl::new(registry(&journal));
    assert_eq!(context.state(), LifecycleState::Created);

    context.start().await.unwrap();
    assert_eq!(context.state(), LifecycleState::Running);
    assert!(context.started_at().is_some());
    assert_eq!(
        context.registry().created_singletons(),
        vec!["app::Database", "app::Cache"]
    );

    let lookup = context.lookup();
    let cache = lookup.get::<Cache>("app::Cache").unwrap();
    let database = lookup.get_named::<Database>("database").unwrap();
    assert!(Arc::ptr_eq(&cache.database, &database));

    context.stop().await.unwrap();
    assert_eq!(context.state(), LifecycleState::Stopped);
    assert_eq!(
        journal.lock().clone(),
        vec![
            "create database",
            "create cache",
            "warm cache",
            "flush cache",
            "close database"
        ]
    );
}

#[tokio::test]
async fn test_context_rejects_invalid_transitions() {
    let journal: Journal = Arc::default();
    let context = ApplicationContextImpl::new(registry(&journal));
    assert!(context.stop().await.is_err());
    context.start().await.unwrap();
    assert!(context.start().await.is_err());
}

#[test]
fn test_capability_prefers_primary_and_prototypes_are_fresh() {
    let journal: Journal = Arc::default();
    let registry = registry(&journal);

    let store = registry.resolve_capability::<dyn Store>("app::Store").unwrap();
    assert_eq!(store.label(), "database");
    assert_eq!(registry.get_all_capability("app::Store").len(), 2);

    let first = registry.get::<Report>("app::Report").unwrap();
    let second = registry.get::<Report>("app::Report").unwrap();
    assert!(!Arc::ptr_eq(&first, &second));
    assert_eq!(registry.component_count(), 3);
}

#[test]
fn test_registry_rejects_undeclared_dependency() {
    let journal: Journal = Arc::default();
    let result = ComponentRegistryImpl::builder()
        .register(ComponentRegistration::new(
            Arc::new(CacheFactory { journal }),
            "cache",
            Scope::Singleton,
        ))
        .build();
    assert!(result.is_err());
}

struct Dispatcher {
    database: Provider<Arc<Database>>,
}

struct DispatcherFactory;

impl ComponentFactory for DispatcherFactory {
    fn type_name(&self) -> &'static str {
        "app::Dispatcher"
    }

    fn dependencies(&self) -> &'static [&'static str] {
        &["app::Database"]
    }

    fn create(&self, lookup: &Arc<dyn ComponentLookup>) -> Instance {
        let lookup = WeakLookup::new(lookup);
        Arc::new(Dispatcher {
            database: Provider::new(move || lookup.require::<Database>("app::Database")),
        })
    }
}

#[test]
fn test_singleton_holding_provider_does_not_pin_registry() {
    let journal: Journal = Arc::default();
    let registry = ComponentRegistryImpl::builder()
        .register(ComponentRegistration::new(
            Arc::new(DatabaseFactory {
                journal: Arc::clone(&journal),
            }),
            "database",
            Scope::Singleton,
        ))
        .register(ComponentRegistration::new(
            Arc::new(DispatcherFactory),
            "dispatcher",
            Scope::Singleton,
        ))
        .build()
        .expect("registry should build");

    let dispatcher = registry.get::<Dispatcher>("app::Dispatcher").unwrap();
    let database = registry.get::<Database>("app::Database").unwrap();
    assert!(Arc::ptr_eq(&dispatcher.database.get(), &database));

    let weak = Arc::downgrade(&registry);
    drop(database);
    drop(dispatcher);
    drop(registry);
    assert!(weak.upgrade().is_none());
}

fn service(type_name: &str, dependencies: &[&str]) -> ComponentMetadata {
    let mut constructor = InjectionPoint::constructor("new");
    for dependency in dependencies {
        constructor = constructor.with_dependency(Dependency::direct(*dependency));
    }
    ComponentMetadata::new(type_name).with_injection_point(constructor)
}

#[test]
fn test_validator_orders_dependencies_first() {
    let mut diagnostics = Diagnostics::new();
    let validated = GraphValidator::new()
        .validate(
            vec![
                service("app::Api", &["app::Cache"]),
                service("app::Cache", &["app::Database"]),
                service("app::Database", &[]),
            ],
            &mut diagnostics,
        )
        .unwrap();

    let order: Vec<&str> = validated
        .resolved
        .construction_order()
        .map(|(_, component)| component.type_name.as_str())
        .collect();
    assert_eq!(order, vec!["app::Database", "app::Cache", "app::Api"]);
    assert_eq!(validated.dependency_graph.edge_count(), 2);
    assert!(!diagnostics.has_errors());
}

#[test]
fn test_validator_reports_cycle_with_simple_names() {
    let mut diagnostics = Diagnostics::new();
    let errors = GraphValidator::new()
        .validate(
            vec![
                service("app::A", &["app::B"]),
                service("app::B", &["app::C"]),
                service("app::C", &["app::A"]),
            ],
            &mut diagnostics,
        )
        .err()
        .unwrap();

    let cycle = errors
        .iter()
        .find_map(|error| match error {
            CompileError::CircularDependency { cycle } => Some(cycle.clone()),
            _ => None,
        })
        .unwrap();
    assert_eq!(cycle, "A → B → C → A");
    assert!(diagnostics.has_errors());
}

#[test]
fn test_validator_resolves_configured_values() {
    let resolver = PropertyResolver::new().with_property("cache.capacity", "512");
    let component = ComponentMetadata::new("app::Cache").with_injection_point(
        InjectionPoint::constructor("new")
            .with_dependency(Dependency::value("${cache.capacity:64}", PrimitiveType::U32))
            .with_dependency(Dependency::value("${cache.name:main}", PrimitiveType::String)),
    );

    let mut diagnostics = Diagnostics::new();
    let validated = GraphValidator::new()
        .with_configuration(Arc::new(resolver))
        .validate(vec![component], &mut diagnostics)
        .unwrap();

    let bound: Vec<&Binding> = validated
        .resolved
        .bound_dependencies(0, 0)
        .filter_map(|(_, binding)| binding)
        .collect();
    assert_eq!(bound.len(), 2);
    assert!(bound.iter().all(|binding| matches!(binding, Binding::Value(_))));
}

#[test]
fn test_validator_rejects_unresolvable_dependency_and_bad_value() {
    let component = ComponentMetadata::new("app::Api").with_injection_point(
        InjectionPoint::constructor("new")
            .with_dependency(Dependency::direct("app::Missing"))
            .with_dependency(Dependency::optional("app::AlsoMissing")),
    );
    let mut diagnostics = Diagnostics::new();
    let errors = GraphValidator::new()
        .validate(vec![component], &mut diagnostics)
        .err()
        .unwrap();
    assert_eq!(errors.len(), 1);
    assert!(matches!(errors[0], CompileError::UnresolvedDependency { .. }));

    let bad_value = ComponentMetadata::new("app::Pool").with_injection_point(
        InjectionPoint::constructor("new")
            .with_dependency(Dependency::value("lots", PrimitiveType::U16)),
    );
    let errors = GraphValidator::new()
        .validate(vec![bad_value], &mut Diagnostics::new())
        .err()
        .unwrap();
    assert!(matches!(errors[0], CompileError::Conversion { .. }));
}
