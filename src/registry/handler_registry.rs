//! # Handler Registry
//!
//! Thread-safe, in-memory [`Resolver`] with typed registration.
//!
//! Each `register_*` method fixes the concrete trait object stored for its
//! role, so providers coming out of this registry always downcast cleanly.
//! Request and fire-and-forget handlers are unique per message type; every
//! other role accepts any number of providers, kept in registration order.

use super::{HandlerKey, NotificationSubscription, Provider, Resolver, StageRole, TypeKey};
use crate::error::{MediatorError, MediatorResult};
use crate::handlers::{
    FireAndForgetHandler, NotificationHandler, PipelineBehavior, PostProcessor, PreProcessor,
    RequestHandler, RequestPostProcessor,
};
use crate::logging::log_registry_operation;
use crate::messages::{kind_of, FireAndForget, Message, MessageKind, Notification, Request};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Registry of every stage the mediator can resolve
#[derive(Default)]
pub struct HandlerRegistry {
    entries: DashMap<HandlerKey, Vec<Provider>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the handler answering request type `R`
    pub fn register_request_handler<R, H>(&self, handler: H) -> MediatorResult<()>
    where
        R: Request,
        H: RequestHandler<R> + 'static,
    {
        let name = handler.handler_name().to_string();
        let handler: Arc<dyn RequestHandler<R>> = Arc::new(handler);
        self.insert_unique(
            HandlerKey::for_request::<R>(StageRole::Handler),
            Arc::new(handler),
            &name,
        )
    }

    /// Register the handler executing fire-and-forget command `C`
    pub fn register_command_handler<C, H>(&self, handler: H) -> MediatorResult<()>
    where
        C: FireAndForget,
        H: FireAndForgetHandler<C> + 'static,
    {
        let name = handler.handler_name().to_string();
        let handler: Arc<dyn FireAndForgetHandler<C>> = Arc::new(handler);
        self.insert_unique(
            HandlerKey::for_message::<C>(StageRole::Handler),
            Arc::new(handler),
            &name,
        )
    }

    /// Subscribe a handler to notification `N` at the priority it declares
    pub fn register_notification_handler<N, H>(&self, handler: H) -> MediatorResult<()>
    where
        N: Notification,
        H: NotificationHandler<N> + 'static,
    {
        let subscription = NotificationSubscription::new(Arc::new(handler));
        self.insert_subscription(subscription)
    }

    /// Subscribe a handler to notification `N`, overriding its priority
    pub fn register_notification_handler_with_priority<N, H>(
        &self,
        handler: H,
        priority: i32,
    ) -> MediatorResult<()>
    where
        N: Notification,
        H: NotificationHandler<N> + 'static,
    {
        let subscription = NotificationSubscription::with_priority(Arc::new(handler), priority);
        self.insert_subscription(subscription)
    }

    /// Add a behavior around the handler of request type `R`
    pub fn register_request_behavior<R, B>(&self, behavior: B) -> MediatorResult<()>
    where
        R: Request,
        B: PipelineBehavior<R, R::Response> + 'static,
    {
        let name = behavior.behavior_name().to_string();
        let behavior: Arc<dyn PipelineBehavior<R, R::Response>> = Arc::new(behavior);
        self.append(
            HandlerKey::for_request::<R>(StageRole::Behavior),
            Arc::new(behavior),
            &name,
        );
        Ok(())
    }

    /// Add a behavior around the handlers of a command or notification type
    pub fn register_behavior<M, B>(&self, behavior: B) -> MediatorResult<()>
    where
        M: Message,
        B: PipelineBehavior<M> + 'static,
    {
        reject_request::<M>(StageRole::Behavior, "register_request_behavior")?;
        let name = behavior.behavior_name().to_string();
        let behavior: Arc<dyn PipelineBehavior<M>> = Arc::new(behavior);
        self.append(
            HandlerKey::for_message::<M>(StageRole::Behavior),
            Arc::new(behavior),
            &name,
        );
        Ok(())
    }

    pub fn register_request_pre_processor<R, P>(&self, processor: P) -> MediatorResult<()>
    where
        R: Request,
        P: PreProcessor<R> + 'static,
    {
        let name = processor.processor_name().to_string();
        let processor: Arc<dyn PreProcessor<R>> = Arc::new(processor);
        self.append(
            HandlerKey::for_request::<R>(StageRole::PreProcessor),
            Arc::new(processor),
            &name,
        );
        Ok(())
    }

    pub fn register_pre_processor<M, P>(&self, processor: P) -> MediatorResult<()>
    where
        M: Message,
        P: PreProcessor<M> + 'static,
    {
        reject_request::<M>(StageRole::PreProcessor, "register_request_pre_processor")?;
        let name = processor.processor_name().to_string();
        let processor: Arc<dyn PreProcessor<M>> = Arc::new(processor);
        self.append(
            HandlerKey::for_message::<M>(StageRole::PreProcessor),
            Arc::new(processor),
            &name,
        );
        Ok(())
    }

    pub fn register_request_post_processor<R, P>(&self, processor: P) -> MediatorResult<()>
    where
        R: Request,
        P: RequestPostProcessor<R> + 'static,
    {
        let name = processor.processor_name().to_string();
        let processor: Arc<dyn RequestPostProcessor<R>> = Arc::new(processor);
        self.append(
            HandlerKey::for_request::<R>(StageRole::PostProcessor),
            Arc::new(processor),
            &name,
        );
        Ok(())
    }

    pub fn register_post_processor<M, P>(&self, processor: P) -> MediatorResult<()>
    where
        M: Message,
        P: PostProcessor<M> + 'static,
    {
        reject_request::<M>(StageRole::PostProcessor, "register_request_post_processor")?;
        let name = processor.processor_name().to_string();
        let processor: Arc<dyn PostProcessor<M>> = Arc::new(processor);
        self.append(
            HandlerKey::for_message::<M>(StageRole::PostProcessor),
            Arc::new(processor),
            &name,
        );
        Ok(())
    }

    /// Store a raw provider under an arbitrary key.
    ///
    /// Bypasses the typed registration methods, so nothing guarantees the
    /// provider has the shape the engine expects for `key`.
    pub fn register_provider(&self, key: HandlerKey, provider: Provider) {
        warn!(key = %key, "Registering untyped provider");
        self.append(key, provider, "untyped");
    }

    /// Remove every provider registered under `key`
    pub fn unregister(&self, key: &HandlerKey) -> bool {
        let removed = self.entries.remove(key).is_some();
        let status = if removed { "removed" } else { "not_found" };
        log_registry_operation("unregister", &key.to_string(), status, None);
        removed
    }

    pub fn contains(&self, key: &HandlerKey) -> bool {
        self.entries.contains_key(key)
    }

    /// Message types with at least one registered stage
    pub fn registered_message_types(&self) -> Vec<TypeKey> {
        let mut types: Vec<TypeKey> = Vec::new();
        for entry in self.entries.iter() {
            if !types.contains(&entry.key().message) {
                types.push(entry.key().message);
            }
        }
        types
    }

    pub fn registered_keys(&self) -> Vec<HandlerKey> {
        self.entries.iter().map(|entry| *entry.key()).collect()
    }

    pub fn stats(&self) -> RegistryStats {
        let mut stats = RegistryStats {
            message_types: self.registered_message_types().len(),
            ..RegistryStats::default()
        };

        for entry in self.entries.iter() {
            let count = entry.value().len();
            match entry.key().role {
                StageRole::Handler => stats.handlers += count,
                StageRole::NotificationHandler => stats.notification_handlers += count,
                StageRole::Behavior => stats.behaviors += count,
                StageRole::PreProcessor => stats.pre_processors += count,
                StageRole::PostProcessor => stats.post_processors += count,
            }
        }

        stats
    }

    fn insert_subscription<N: Notification>(
        &self,
        subscription: NotificationSubscription<N>,
    ) -> MediatorResult<()> {
        let name = subscription.handler_name().to_string();
        let priority = subscription.priority;
        self.append(
            HandlerKey::for_message::<N>(StageRole::NotificationHandler),
            Arc::new(subscription),
            &name,
        );
        debug!(handler = %name, priority, "Notification subscription priority recorded");
        Ok(())
    }

    fn insert_unique(&self, key: HandlerKey, provider: Provider, name: &str) -> MediatorResult<()> {
        match self.entries.entry(key) {
            Entry::Occupied(_) => {
                warn!(key = %key, handler = %name, "Rejected duplicate handler registration");
                Err(MediatorError::registration(format!(
                    "a handler is already registered for '{}'",
                    key.message
                )))
            }
            Entry::Vacant(slot) => {
                slot.insert(vec![provider]);
                info!(key = %key, handler = %name, "Registered handler");
                Ok(())
            }
        }
    }

    fn append(&self, key: HandlerKey, provider: Provider, name: &str) {
        let mut providers = self.entries.entry(key).or_default();
        providers.push(provider);
        info!(key = %key, stage = %name, position = providers.len(), "Registered pipeline stage");
    }
}

impl Resolver for HandlerRegistry {
    fn resolve(&self, key: &HandlerKey) -> Vec<Provider> {
        self.entries
            .get(key)
            .map(|providers| providers.value().clone())
            .unwrap_or_default()
    }

    fn resolver_name(&self) -> &str {
        "HandlerRegistry"
    }
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("stats", &self.stats())
            .finish()
    }
}

fn reject_request<M: Message>(role: StageRole, use_instead: &str) -> MediatorResult<()> {
    if kind_of::<M>() == MessageKind::Request {
        return Err(MediatorError::registration(format!(
            "{role} for request '{}' must be registered with {use_instead}",
            M::message_name()
        )));
    }
    Ok(())
}

/// Counts of registered providers per role
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryStats {
    pub message_types: usize,
    pub handlers: usize,
    pub notification_handlers: usize,
    pub behaviors: usize,
    pub pre_processors: usize,
    pub post_processors: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HandlerResult;
    use crate::pipeline::TracingBehavior;
    use async_trait::async_trait;
    use tokio_util::sync::CancellationToken;

    struct Ping;
    crate::impl_request!(Ping => &'static str);

    struct Purge;
    crate::impl_fire_and_forget!(Purge);

    struct Tick;
    crate::impl_notification!(Tick);

    struct PongHandler;

    #[async_trait]
    impl RequestHandler<Ping> for PongHandler {
        async fn handle(&self, _: &Ping, _: &CancellationToken) -> HandlerResult<&'static str> {
            Ok("pong")
        }
    }

    struct PurgeHandler;

    #[async_trait]
    impl FireAndForgetHandler<Purge> for PurgeHandler {
        async fn handle(&self, _: &Purge, _: &CancellationToken) -> HandlerResult<()> {
            Ok(())
        }
    }

    struct TickHandler;

    #[async_trait]
    impl NotificationHandler<Tick> for TickHandler {
        async fn handle(&self, _: &Tick, _: &CancellationToken) -> HandlerResult<()> {
            Ok(())
        }
    }

    struct NoopPre;

    #[async_trait]
    impl<M: Message> PreProcessor<M> for NoopPre {
        async fn process(&self, _: &M, _: &CancellationToken) -> HandlerResult<()> {
            Ok(())
        }
    }

    #[test]
    fn test_registry_creation() {
        let registry = HandlerRegistry::new();
        assert_eq!(registry.stats(), RegistryStats::default());
        assert!(registry.registered_keys().is_empty());
    }

    #[test]
    fn test_handler_registration_and_resolution() {
        let registry = HandlerRegistry::new();
        registry.register_request_handler(PongHandler).unwrap();
        registry.register_command_handler(PurgeHandler).unwrap();

        let providers =
            registry.resolve_handler(TypeKey::of::<Ping>(), Some(TypeKey::of::<&'static str>()));
        assert_eq!(providers.len(), 1);
        assert!(providers[0]
            .downcast_ref::<Arc<dyn RequestHandler<Ping>>>()
            .is_some());

        assert!(registry.contains(&HandlerKey::for_message::<Purge>(StageRole::Handler)));
        assert_eq!(registry.stats().handlers, 2);
    }

    #[test]
    fn test_duplicate_handler_is_rejected() {
        let registry = HandlerRegistry::new();
        registry.register_request_handler(PongHandler).unwrap();

        let result = registry.register_request_handler(PongHandler);

        match result {
            Err(MediatorError::RegistrationFailed { reason }) => {
                assert!(reason.contains("already registered"));
            }
            other => panic!("Expected RegistrationFailed, got {other:?}"),
        }
        assert_eq!(registry.stats().handlers, 1);
    }

    #[test]
    fn test_stages_keep_registration_order() {
        let registry = HandlerRegistry::new();
        registry
            .register_behavior::<Tick, _>(TracingBehavior::with_label("first"))
            .unwrap();
        registry
            .register_behavior::<Tick, _>(TracingBehavior::with_label("second"))
            .unwrap();
        registry.register_notification_handler(TickHandler).unwrap();
        registry
            .register_notification_handler_with_priority(TickHandler, 9)
            .unwrap();

        let behaviors = registry.resolve_behaviors(TypeKey::of::<Tick>(), None);
        assert_eq!(behaviors.len(), 2);

        let subscriptions = registry.resolve_handlers(TypeKey::of::<Tick>());
        let priorities: Vec<i32> = subscriptions
            .iter()
            .filter_map(|p| p.downcast_ref::<NotificationSubscription<Tick>>())
            .map(|s| s.priority)
            .collect();
        assert_eq!(priorities, vec![0, 9]);
    }

    #[test]
    fn test_void_stages_rejected_for_requests() {
        let registry = HandlerRegistry::new();

        assert!(registry.register_pre_processor::<Ping, _>(NoopPre).is_err());
        assert!(registry
            .register_request_pre_processor::<Ping, _>(NoopPre)
            .is_ok());
        assert!(registry.register_pre_processor::<Purge, _>(NoopPre).is_ok());
        assert_eq!(registry.stats().pre_processors, 2);
    }

    #[test]
    fn test_unregister() {
        let registry = HandlerRegistry::new();
        registry.register_command_handler(PurgeHandler).unwrap();
        let key = HandlerKey::for_message::<Purge>(StageRole::Handler);

        assert!(registry.unregister(&key));
        assert!(!registry.unregister(&key));
        assert!(registry.registered_message_types().is_empty());
    }
}
