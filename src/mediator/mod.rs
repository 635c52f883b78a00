//! # Dispatch Engine
//!
//! [`Mediator`] routes a message to the stages a [`Resolver`] returns for its
//! type and runs them in a fixed order:
//!
//! ```text
//! pre-processors ─► behavior chain ─► handler(s) ─► post-processors
//! ```
//!
//! - **Requests** resolve exactly one handler. Post-processors see the
//!   response and run only when the chain produced one.
//! - **Fire-and-forget commands** follow the same path without a response;
//!   their post-processors run whenever the chain completes.
//! - **Notifications** resolve every subscriber, order them by descending
//!   priority and run them one after another, each wrapped in a fresh chain
//!   built from the shared behaviors. Pre- and post-processors run once per
//!   publish, also when nobody is subscribed.
//!
//! The engine holds no mutable state besides its counters; clones share the
//! resolver and the counters, and concurrent dispatches never interact.

mod builder;
mod stats;

pub use builder::MediatorBuilder;
pub use stats::{MediatorStats, StatsSnapshot};

use crate::config::{MediatorConfig, NotificationFailurePolicy};
use crate::error::{MediatorError, MediatorResult, SubscriberFailure};
use crate::handlers::{
    FireAndForgetHandler, PipelineBehavior, PostProcessor, PreProcessor, RequestHandler,
    RequestPostProcessor,
};
use crate::logging::{log_dispatch_operation, log_error};
use crate::messages::{FireAndForget, Message, MessageKind, Notification, Request};
use crate::pipeline::{compose, Next};
use crate::registry::{
    order_by_priority, NotificationSubscription, Provider, Resolver, StageRole, TypeKey,
};
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};
use uuid::Uuid;

/// In-process dispatcher for requests, commands and notifications
#[derive(Clone)]
pub struct Mediator {
    resolver: Arc<dyn Resolver>,
    config: MediatorConfig,
    stats: Arc<MediatorStats>,
}

impl Mediator {
    pub fn new(resolver: Arc<dyn Resolver>) -> Self {
        Self::with_config(resolver, MediatorConfig::default())
    }

    pub fn with_config(resolver: Arc<dyn Resolver>, config: MediatorConfig) -> Self {
        debug!(
            resolver = resolver.resolver_name(),
            policy = ?config.notification_failure_policy,
            "Creating mediator"
        );
        Self {
            resolver,
            config,
            stats: Arc::new(MediatorStats::new()),
        }
    }

    pub fn builder() -> MediatorBuilder {
        MediatorBuilder::new()
    }

    pub fn config(&self) -> &MediatorConfig {
        &self.config
    }

    pub fn resolver(&self) -> &Arc<dyn Resolver> {
        &self.resolver
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// Zero the counters shared by this mediator and its clones
    pub fn reset_stats(&self) {
        self.stats.reset();
    }

    /// Send a request to its handler and return the response
    pub async fn send<R: Request>(&self, request: &R) -> MediatorResult<R::Response> {
        self.send_with_cancellation(request, &CancellationToken::new())
            .await
    }

    #[instrument(
        name = "mediator.send",
        skip_all,
        fields(
            dispatch_id = %Uuid::new_v4(),
            message_type = R::message_name(),
            kind = %MessageKind::Request
        )
    )]
    pub async fn send_with_cancellation<R: Request>(
        &self,
        request: &R,
        cancel: &CancellationToken,
    ) -> MediatorResult<R::Response> {
        let started = Instant::now();
        let result = self.dispatch_request(request, cancel).await;
        self.complete(
            MessageKind::Request,
            R::message_name(),
            started,
            result.as_ref().err(),
        );
        result
    }

    /// Send a fire-and-forget command to its handler
    pub async fn send_command<C: FireAndForget>(&self, command: &C) -> MediatorResult<()> {
        self.send_command_with_cancellation(command, &CancellationToken::new())
            .await
    }

    #[instrument(
        name = "mediator.send_command",
        skip_all,
        fields(
            dispatch_id = %Uuid::new_v4(),
            message_type = C::message_name(),
            kind = %MessageKind::FireAndForget
        )
    )]
    pub async fn send_command_with_cancellation<C: FireAndForget>(
        &self,
        command: &C,
        cancel: &CancellationToken,
    ) -> MediatorResult<()> {
        let started = Instant::now();
        let result = self.dispatch_command(command, cancel).await;
        self.complete(
            MessageKind::FireAndForget,
            C::message_name(),
            started,
            result.as_ref().err(),
        );
        result
    }

    /// Deliver a notification to every subscriber, highest priority first
    pub async fn publish<N: Notification>(&self, notification: &N) -> MediatorResult<()> {
        self.publish_with_cancellation(notification, &CancellationToken::new())
            .await
    }

    #[instrument(
        name = "mediator.publish",
        skip_all,
        fields(
            dispatch_id = %Uuid::new_v4(),
            message_type = N::message_name(),
            kind = %MessageKind::Notification
        )
    )]
    pub async fn publish_with_cancellation<N: Notification>(
        &self,
        notification: &N,
        cancel: &CancellationToken,
    ) -> MediatorResult<()> {
        let started = Instant::now();
        let result = self.dispatch_notification(notification, cancel).await;
        self.complete(
            MessageKind::Notification,
            N::message_name(),
            started,
            result.as_ref().err(),
        );
        result
    }

    async fn dispatch_request<R: Request>(
        &self,
        request: &R,
        cancel: &CancellationToken,
    ) -> MediatorResult<R::Response> {
        let message_type = R::message_name();
        self.admit(request, message_type, cancel)?;

        let message = TypeKey::of::<R>();
        let response = Some(TypeKey::of::<R::Response>());

        let handler: Arc<dyn RequestHandler<R>> = resolve_single(
            MessageKind::Request,
            message_type,
            self.resolver.resolve_handler(message, response),
        )?;
        let pre_processors: Vec<Arc<dyn PreProcessor<R>>> = resolve_many(
            StageRole::PreProcessor,
            message_type,
            self.resolver.resolve_pre_processors(message, response),
        )?;
        let behaviors: Vec<Arc<dyn PipelineBehavior<R, R::Response>>> = resolve_many(
            StageRole::Behavior,
            message_type,
            self.resolver.resolve_behaviors(message, response),
        )?;
        let post_processors: Vec<Arc<dyn RequestPostProcessor<R>>> = resolve_many(
            StageRole::PostProcessor,
            message_type,
            self.resolver.resolve_post_processors(message, response),
        )?;

        debug!(
            handler = handler.handler_name(),
            behaviors = behaviors.len(),
            pre_processors = pre_processors.len(),
            post_processors = post_processors.len(),
            "Resolved request pipeline"
        );

        run_pre_processors(&pre_processors, request, message_type, cancel).await?;

        let terminal = Next::new(|| handler.handle(request, cancel));
        let response = compose(&behaviors, request, cancel, terminal)
            .run()
            .await
            .map_err(|e| MediatorError::from_stage_error(message_type, e))?;

        for processor in &post_processors {
            processor
                .process(request, &response, cancel)
                .await
                .map_err(|e| MediatorError::from_stage_error(message_type, e))?;
        }

        Ok(response)
    }

    async fn dispatch_command<C: FireAndForget>(
        &self,
        command: &C,
        cancel: &CancellationToken,
    ) -> MediatorResult<()> {
        let message_type = C::message_name();
        self.admit(command, message_type, cancel)?;

        let message = TypeKey::of::<C>();

        let handler: Arc<dyn FireAndForgetHandler<C>> = resolve_single(
            MessageKind::FireAndForget,
            message_type,
            self.resolver.resolve_handler(message, None),
        )?;
        let pre_processors: Vec<Arc<dyn PreProcessor<C>>> = resolve_many(
            StageRole::PreProcessor,
            message_type,
            self.resolver.resolve_pre_processors(message, None),
        )?;
        let behaviors: Vec<Arc<dyn PipelineBehavior<C>>> = resolve_many(
            StageRole::Behavior,
            message_type,
            self.resolver.resolve_behaviors(message, None),
        )?;
        let post_processors: Vec<Arc<dyn PostProcessor<C>>> = resolve_many(
            StageRole::PostProcessor,
            message_type,
            self.resolver.resolve_post_processors(message, None),
        )?;

        debug!(
            handler = handler.handler_name(),
            behaviors = behaviors.len(),
            "Resolved command pipeline"
        );

        run_pre_processors(&pre_processors, command, message_type, cancel).await?;

        let terminal = Next::new(|| handler.handle(command, cancel));
        compose(&behaviors, command, cancel, terminal)
            .run()
            .await
            .map_err(|e| MediatorError::from_stage_error(message_type, e))?;

        run_post_processors(&post_processors, command, message_type, cancel).await
    }

    async fn dispatch_notification<N: Notification>(
        &self,
        notification: &N,
        cancel: &CancellationToken,
    ) -> MediatorResult<()> {
        let message_type = N::message_name();
        self.admit(notification, message_type, cancel)?;

        let message = TypeKey::of::<N>();

        let subscriptions = order_by_priority(resolve_subscriptions::<N>(
            message_type,
            self.resolver.resolve_handlers(message),
        )?);
        let pre_processors: Vec<Arc<dyn PreProcessor<N>>> = resolve_many(
            StageRole::PreProcessor,
            message_type,
            self.resolver.resolve_pre_processors(message, None),
        )?;
        let behaviors: Vec<Arc<dyn PipelineBehavior<N>>> = resolve_many(
            StageRole::Behavior,
            message_type,
            self.resolver.resolve_behaviors(message, None),
        )?;
        let post_processors: Vec<Arc<dyn PostProcessor<N>>> = resolve_many(
            StageRole::PostProcessor,
            message_type,
            self.resolver.resolve_post_processors(message, None),
        )?;

        debug!(
            subscribers = subscriptions.len(),
            behaviors = behaviors.len(),
            "Resolved notification pipeline"
        );

        run_pre_processors(&pre_processors, notification, message_type, cancel).await?;

        let mut failures = Vec::new();
        for subscription in &subscriptions {
            if let Err(cancelled) = self.check_cancelled(message_type, cancel) {
                if failures.is_empty() {
                    return Err(cancelled);
                }
                // Collected failures are reported together with the skipped subscriber.
                failures.push(SubscriberFailure {
                    handler_name: subscription.handler_name().to_string(),
                    priority: subscription.priority,
                    error: cancelled,
                });
                break;
            }

            let terminal = Next::new(|| subscription.handler.handle(notification, cancel));
            let outcome = compose(&behaviors, notification, cancel, terminal)
                .run()
                .await
                .map_err(|e| MediatorError::from_stage_error(message_type, e));

            match outcome {
                Ok(()) => {
                    if self.config.record_stats {
                        self.stats.record_delivery();
                    }
                }
                Err(error) => match self.config.notification_failure_policy {
                    NotificationFailurePolicy::AbortOnFirst => {
                        debug!(
                            handler = subscription.handler_name(),
                            priority = subscription.priority,
                            "Subscriber failed, aborting remaining fan-out"
                        );
                        return Err(error);
                    }
                    NotificationFailurePolicy::CollectAll => {
                        failures.push(SubscriberFailure {
                            handler_name: subscription.handler_name().to_string(),
                            priority: subscription.priority,
                            error,
                        });
                    }
                },
            }
        }

        if !failures.is_empty() {
            return Err(MediatorError::NotificationFailures {
                message_type,
                failures,
            });
        }

        run_post_processors(&post_processors, notification, message_type, cancel).await
    }

    /// Validation and cancellation checks shared by every path
    fn admit<M: Message>(
        &self,
        message: &M,
        message_type: &'static str,
        cancel: &CancellationToken,
    ) -> MediatorResult<()> {
        message
            .validate()
            .map_err(|reason| MediatorError::ArgumentInvalid {
                message_type,
                reason,
            })?;
        self.check_cancelled(message_type, cancel)
    }

    fn check_cancelled(
        &self,
        message_type: &'static str,
        cancel: &CancellationToken,
    ) -> MediatorResult<()> {
        if self.config.observe_cancellation && cancel.is_cancelled() {
            return Err(MediatorError::Cancelled { message_type });
        }
        Ok(())
    }

    fn complete(
        &self,
        kind: MessageKind,
        message_type: &'static str,
        started: Instant,
        error: Option<&MediatorError>,
    ) {
        let duration_ms = started.elapsed().as_millis() as u64;

        if self.config.record_stats {
            self.stats.record_dispatch(kind, error);
        }

        match error {
            None => {
                debug!(duration_ms, "Dispatch completed");
                if self.config.log_dispatches {
                    log_dispatch_operation(kind, message_type, "success", duration_ms, None);
                }
            }
            Some(error) => {
                debug!(duration_ms, error_kind = error.error_kind(), "Dispatch failed");
                log_error(
                    "mediator",
                    kind.as_str(),
                    &error.to_string(),
                    Some(message_type),
                );
            }
        }
    }
}

impl std::fmt::Debug for Mediator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mediator")
            .field("resolver", &self.resolver.resolver_name())
            .field("config", &self.config)
            .field("stats", &self.stats.snapshot())
            .finish()
    }
}

async fn run_pre_processors<M: Message>(
    processors: &[Arc<dyn PreProcessor<M>>],
    message: &M,
    message_type: &'static str,
    cancel: &CancellationToken,
) -> MediatorResult<()> {
    for processor in processors {
        processor
            .process(message, cancel)
            .await
            .map_err(|e| MediatorError::from_stage_error(message_type, e))?;
    }
    Ok(())
}

async fn run_post_processors<M: Message>(
    processors: &[Arc<dyn PostProcessor<M>>],
    message: &M,
    message_type: &'static str,
    cancel: &CancellationToken,
) -> MediatorResult<()> {
    for processor in processors {
        processor
            .process(message, cancel)
            .await
            .map_err(|e| MediatorError::from_stage_error(message_type, e))?;
    }
    Ok(())
}

/// Exactly one handler, or `HandlerNotFound` / `AmbiguousHandler`
fn resolve_single<S>(
    kind: MessageKind,
    message_type: &'static str,
    providers: Vec<Provider>,
) -> MediatorResult<Arc<S>>
where
    S: ?Sized + Send + Sync + 'static,
{
    match providers.as_slice() {
        [] => Err(MediatorError::HandlerNotFound { kind, message_type }),
        [provider] => downcast_stage(StageRole::Handler, message_type, provider),
        many => Err(MediatorError::AmbiguousHandler {
            kind,
            message_type,
            count: many.len(),
        }),
    }
}

fn resolve_many<S>(
    role: StageRole,
    message_type: &'static str,
    providers: Vec<Provider>,
) -> MediatorResult<Vec<Arc<S>>>
where
    S: ?Sized + Send + Sync + 'static,
{
    providers
        .iter()
        .map(|provider| downcast_stage(role, message_type, provider))
        .collect()
}

fn resolve_subscriptions<N: Notification>(
    message_type: &'static str,
    providers: Vec<Provider>,
) -> MediatorResult<Vec<NotificationSubscription<N>>> {
    providers
        .iter()
        .map(|provider| {
            provider
                .downcast_ref::<NotificationSubscription<N>>()
                .cloned()
                .ok_or_else(|| MediatorError::MalformedStage {
                    role: StageRole::NotificationHandler,
                    message_type,
                    reason: format!(
                        "expected {}",
                        std::any::type_name::<NotificationSubscription<N>>()
                    ),
                })
        })
        .collect()
}

fn downcast_stage<S>(
    role: StageRole,
    message_type: &'static str,
    provider: &Provider,
) -> MediatorResult<Arc<S>>
where
    S: ?Sized + Send + Sync + 'static,
{
    provider
        .downcast_ref::<Arc<S>>()
        .cloned()
        .ok_or_else(|| MediatorError::MalformedStage {
            role,
            message_type,
            reason: format!("expected {}", std::any::type_name::<Arc<S>>()),
        })
}
