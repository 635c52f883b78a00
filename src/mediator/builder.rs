use super::Mediator;
use crate::config::MediatorConfig;
use crate::error::{MediatorError, MediatorResult};
use crate::handlers::{
    FireAndForgetHandler, NotificationHandler, PipelineBehavior, PostProcessor, PreProcessor,
    RequestHandler, RequestPostProcessor,
};
use crate::messages::{FireAndForget, Message, Notification, Request};
use crate::registry::HandlerRegistry;
use std::sync::Arc;
use tracing::warn;

/// Fluent registration front-end over [`HandlerRegistry`]
///
/// Registration errors do not interrupt the chain; the first one is kept and
/// returned from [`build`](Self::build).
///
/// ```rust
/// use vali_mediator::{
///     async_trait, impl_request, CancellationToken, HandlerResult, Mediator, RequestHandler,
/// };
///
/// struct Ping;
/// impl_request!(Ping => &'static str);
///
/// struct PongHandler;
///
/// #[async_trait]
/// impl RequestHandler<Ping> for PongHandler {
///     async fn handle(&self, _: &Ping, _: &CancellationToken) -> HandlerResult<&'static str> {
///         Ok("pong")
///     }
/// }
///
/// let mediator = Mediator::builder().request_handler(PongHandler).build().unwrap();
/// assert_eq!(mediator.stats().requests, 0);
/// ```
#[derive(Debug, Default)]
pub struct MediatorBuilder {
    registry: HandlerRegistry,
    config: MediatorConfig,
    first_error: Option<MediatorError>,
}

impl MediatorBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn config(mut self, config: MediatorConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn request_handler<R, H>(self, handler: H) -> Self
    where
        R: Request,
        H: RequestHandler<R> + 'static,
    {
        let result = self.registry.register_request_handler(handler);
        self.track(result)
    }

    #[must_use]
    pub fn command_handler<C, H>(self, handler: H) -> Self
    where
        C: FireAndForget,
        H: FireAndForgetHandler<C> + 'static,
    {
        let result = self.registry.register_command_handler(handler);
        self.track(result)
    }

    #[must_use]
    pub fn notification_handler<N, H>(self, handler: H) -> Self
    where
        N: Notification,
        H: NotificationHandler<N> + 'static,
    {
        let result = self.registry.register_notification_handler(handler);
        self.track(result)
    }

    #[must_use]
    pub fn notification_handler_with_priority<N, H>(self, handler: H, priority: i32) -> Self
    where
        N: Notification,
        H: NotificationHandler<N> + 'static,
    {
        let result = self
            .registry
            .register_notification_handler_with_priority(handler, priority);
        self.track(result)
    }

    #[must_use]
    pub fn request_behavior<R, B>(self, behavior: B) -> Self
    where
        R: Request,
        B: PipelineBehavior<R, R::Response> + 'static,
    {
        let result = self.registry.register_request_behavior(behavior);
        self.track(result)
    }

    #[must_use]
    pub fn behavior<M, B>(self, behavior: B) -> Self
    where
        M: Message,
        B: PipelineBehavior<M> + 'static,
    {
        let result = self.registry.register_behavior(behavior);
        self.track(result)
    }

    #[must_use]
    pub fn request_pre_processor<R, P>(self, processor: P) -> Self
    where
        R: Request,
        P: PreProcessor<R> + 'static,
    {
        let result = self.registry.register_request_pre_processor(processor);
        self.track(result)
    }

    #[must_use]
    pub fn pre_processor<M, P>(self, processor: P) -> Self
    where
        M: Message,
        P: PreProcessor<M> + 'static,
    {
        let result = self.registry.register_pre_processor(processor);
        self.track(result)
    }

    #[must_use]
    pub fn request_post_processor<R, P>(self, processor: P) -> Self
    where
        R: Request,
        P: RequestPostProcessor<R> + 'static,
    {
        let result = self.registry.register_request_post_processor(processor);
        self.track(result)
    }

    #[must_use]
    pub fn post_processor<M, P>(self, processor: P) -> Self
    where
        M: Message,
        P: PostProcessor<M> + 'static,
    {
        let result = self.registry.register_post_processor(processor);
        self.track(result)
    }

    /// Hand the registry and configuration to a new mediator
    pub fn build(self) -> MediatorResult<Mediator> {
        if let Some(error) = self.first_error {
            return Err(error);
        }
        Ok(Mediator::with_config(Arc::new(self.registry), self.config))
    }

    fn track(mut self, result: MediatorResult<()>) -> Self {
        if let Err(error) = result {
            warn!(error = %error, "Registration failed while building mediator");
            self.first_error.get_or_insert(error);
        }
        self
    }
}
