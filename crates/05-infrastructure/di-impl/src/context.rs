//! 应用上下文实现
//!
//! 持有间接生成策略构建出的注册表，负责非惰性单例的创建和销毁。

use crate::registry::ComponentRegistryImpl;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use di_abstractions::{ApplicationContext, ComponentLookup};
use infrastructure_common::{LifecycleError, LifecycleState};
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::info;

/// 应用上下文
pub struct ApplicationContextImpl {
    id: String,
    registry: Arc<ComponentRegistryImpl>,
    state: RwLock<LifecycleState>,
    started_at: RwLock<Option<DateTime<Utc>>>,
}

impl ApplicationContextImpl {
    /// 创建上下文
    pub fn new(registry: Arc<ComponentRegistryImpl>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            registry,
            state: RwLock::new(LifecycleState::Created),
            started_at: RwLock::new(None),
        }
    }

    /// 注册表
    pub fn registry(&self) -> &Arc<ComponentRegistryImpl> {
        &self.registry
    }

    /// 启动时间
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        *self.started_at.read()
    }

    fn transition(
        &self,
        expected: LifecycleState,
        next: LifecycleState,
    ) -> Result<(), LifecycleError> {
        let mut state = self.state.write();
        if *state != expected {
            return Err(LifecycleError::InvalidState {
                expected: expected.to_string(),
                actual: state.to_string(),
            });
        }
        *state = next;
        Ok(())
    }
}

#[async_trait]
impl ApplicationContext for ApplicationContextImpl {
    fn id(&self) -> &str {
        &self.id
    }

    fn state(&self) -> LifecycleState {
        *self.state.read()
    }

    async fn start(&self) -> Result<(), LifecycleError> {
        self.transition(LifecycleState::Created, LifecycleState::Starting)?;
        info!("启动应用上下文: {}", self.id);

        let created = self.registry.initialize_eager();
        *self.started_at.write() = Some(Utc::now());
        *self.state.write() = LifecycleState::Running;

        info!("应用上下文启动完成，创建单例 {} 个", created);
        Ok(())
    }

    async fn stop(&self) -> Result<(), LifecycleError> {
        self.transition(LifecycleState::Running, LifecycleState::Stopping)?;
        info!("停止应用上下文: {}", self.id);

        let destroyed = self.registry.destroy_singletons();
        *self.state.write() = LifecycleState::Stopped;

        info!("应用上下文已停止，销毁单例 {} 个", destroyed);
        Ok(())
    }

    fn lookup(&self) -> Arc<dyn ComponentLookup> {
        self.registry.clone()
    }
}

impl std::fmt::Debug for ApplicationContextImpl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApplicationContextImpl")
            .field("id", &self.id)
            .field("state", &*self.state.read())
            .field("registry", &self.registry)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ComponentRegistration;
    use di_abstractions::{ComponentFactory, ComponentLookupExt, Instance};
    use infrastructure_common::Scope;
    use parking_lot::Mutex;

    struct Pool {
        open: Mutex<bool>,
    }

    struct PoolFactory {
        events: Arc<Mutex<Vec<String>>>,
    }

    impl ComponentFactory for PoolFactory {
        fn type_name(&self) -> &'static str {
            "app::Pool"
        }

        fn create(&self, _lookup: &Arc<dyn ComponentLookup>) -> Instance {
            self.events.lock().push("create".to_string());
            Arc::new(Pool {
                open: Mutex::new(false),
            })
        }

        fn post_create(&self, instance: &Instance) {
            if let Some(pool) = instance.downcast_ref::<Pool>() {
                *pool.open.lock() = true;
            }
            self.events.lock().push("post_create".to_string());
        }

        fn pre_destroy(&self, instance: &Instance) {
            if let Some(pool) = instance.downcast_ref::<Pool>() {
                *pool.open.lock() = false;
            }
            self.events.lock().push("pre_destroy".to_string());
        }
    }

    fn context(events: &Arc<Mutex<Vec<String>>>) -> ApplicationContextImpl {
        let registry = ComponentRegistryImpl::builder()
            .register(ComponentRegistration::new(
                Arc::new(PoolFactory {
                    events: Arc::clone(events),
                }),
                "pool",
                Scope::Singleton,
            ))
            .build()
            .unwrap();
        ApplicationContextImpl::new(registry)
    }

    #[tokio::test]
    async fn test_start_and_stop_run_hooks() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let context = context(&events);
        assert_eq!(context.state(), LifecycleState::Created);

        context.start().await.unwrap();
        assert_eq!(context.state(), LifecycleState::Running);
        assert!(context.started_at().is_some());

        let pool = context.lookup().get::<Pool>("app::Pool").unwrap();
        assert!(*pool.open.lock());

        context.stop().await.unwrap();
        assert_eq!(context.state(), LifecycleState::Stopped);
        assert!(!*pool.open.lock());
        assert_eq!(
            *events.lock(),
            vec!["create", "post_create", "pre_destroy"]
        );
    }

    #[tokio::test]
    async fn test_invalid_transitions() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let context = context(&events);

        assert!(matches!(
            context.stop().await,
            Err(LifecycleError::InvalidState { .. })
        ));
        context.start().await.unwrap();
        assert!(context.start().await.is_err());
    }

    #[tokio::test]
    async fn test_lazy_singleton_not_created_on_start() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let registry = ComponentRegistryImpl::builder()
            .register(
                ComponentRegistration::new(
                    Arc::new(PoolFactory {
                        events: Arc::clone(&events),
                    }),
                    "pool",
                    Scope::Singleton,
                )
                .lazy(true),
            )
            .build()
            .unwrap();
        let context = ApplicationContextImpl::new(registry);

        context.start().await.unwrap();
        assert!(events.lock().is_empty());
        assert!(context.lookup().get::<Pool>("app::Pool").is_some());
        assert_eq!(events.lock().len(), 2);
    }
}
