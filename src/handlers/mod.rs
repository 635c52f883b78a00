//! # Stage Contracts
//!
//! Traits implemented by the components the mediator resolves at dispatch time.
//!
//! ## Overview
//!
//! - **Handlers** are the authoritative processors: [`RequestHandler`],
//!   [`FireAndForgetHandler`] and the prioritised [`NotificationHandler`].
//! - **Behaviors** ([`PipelineBehavior`]) wrap the handler invocation and decide
//!   whether to call `next`.
//! - **Processors** ([`PreProcessor`], [`PostProcessor`],
//!   [`RequestPostProcessor`]) are side-effect hooks around the wrapped chain.
//!
//! Every stage receives the message by reference and the dispatch-wide
//! [`CancellationToken`], and returns a [`HandlerResult`]. Any error type works
//! with `?`; the engine reports it as `MediatorError::HandlerFailure`.

mod behavior;
mod processors;

pub use behavior::PipelineBehavior;
pub use processors::{PostProcessor, PreProcessor, RequestPostProcessor};

use crate::error::HandlerResult;
use crate::messages::{FireAndForget, Notification, Request};
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

/// Priority given to notification handlers that do not override it.
pub const DEFAULT_PRIORITY: i32 = 0;

/// The single handler answering a request type
#[async_trait]
pub trait RequestHandler<R: Request>: Send + Sync {
    async fn handle(&self, request: &R, cancel: &CancellationToken) -> HandlerResult<R::Response>;

    fn handler_name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// The single handler executing a fire-and-forget command
#[async_trait]
pub trait FireAndForgetHandler<C: FireAndForget>: Send + Sync {
    async fn handle(&self, command: &C, cancel: &CancellationToken) -> HandlerResult<()>;

    fn handler_name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// A subscriber to a notification type
///
/// Subscribers run sequentially, highest [`priority`](Self::priority) first.
/// Subscribers sharing a priority keep their registration order.
#[async_trait]
pub trait NotificationHandler<N: Notification>: Send + Sync {
    async fn handle(&self, notification: &N, cancel: &CancellationToken) -> HandlerResult<()>;

    fn priority(&self) -> i32 {
        DEFAULT_PRIORITY
    }

    fn handler_name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}
