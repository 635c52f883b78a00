//! # Pipeline Composition
//!
//! Folds an ordered list of [`PipelineBehavior`]s around a terminal
//! continuation into one executable chain.
//!
//! ## Ordering
//!
//! ```text
//! registration order:  [B1, B2]
//!
//! B1.pre ─► B2.pre ─► handler ─► B2.post ─► B1.post
//! ```
//!
//! The fold walks the behaviors in reverse, wrapping the chain built so far as
//! the `next` of the current behavior, which leaves the first registered
//! behavior outermost. An empty behavior list yields the terminal continuation
//! itself.

mod tracing_behavior;

pub use tracing_behavior::TracingBehavior;

use crate::error::HandlerResult;
use crate::handlers::PipelineBehavior;
use crate::messages::Message;
use futures::future::BoxFuture;
use std::future::Future;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// One-shot continuation handed to a behavior
///
/// Calling [`run`](Self::run) executes the rest of the chain (inner behaviors
/// and finally the handler). It consumes the continuation, so the rest of the
/// chain runs at most once per dispatch.
pub struct Next<'a, T> {
    inner: Box<dyn FnOnce() -> BoxFuture<'a, HandlerResult<T>> + Send + 'a>,
}

impl<'a, T: 'a> Next<'a, T> {
    pub fn new<F, Fut>(continuation: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'a,
        Fut: Future<Output = HandlerResult<T>> + Send + 'a,
    {
        Self {
            inner: Box::new(move || -> BoxFuture<'a, HandlerResult<T>> {
                Box::pin(continuation())
            }),
        }
    }

    /// Run the rest of the chain
    pub fn run(self) -> BoxFuture<'a, HandlerResult<T>> {
        (self.inner)()
    }
}

impl<T> std::fmt::Debug for Next<'_, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Next")
            .field("inner", &"<continuation>")
            .finish()
    }
}

/// Wrap `terminal` in `behaviors`, first registered outermost.
pub fn compose<'a, M, T>(
    behaviors: &'a [Arc<dyn PipelineBehavior<M, T>>],
    message: &'a M,
    cancel: &'a CancellationToken,
    terminal: Next<'a, T>,
) -> Next<'a, T>
where
    M: Message,
    T: Send + 'static,
{
    behaviors.iter().rev().fold(terminal, |next, behavior| {
        Next::new(move || behavior.handle(message, next, cancel))
    })
}
