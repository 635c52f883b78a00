use crate::error::HandlerResult;
use crate::messages::Message;
use crate::pipeline::Next;
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

/// Middleware wrapping a handler invocation
///
/// `T` is the value produced by the wrapped chain: the response type for
/// request behaviors, `()` for fire-and-forget and notification behaviors.
///
/// Behaviors nest in registration order: the first one registered is the
/// outermost layer, so its code before `next.run()` runs first and its code
/// after `next.run()` runs last. Returning without calling `next` ends the
/// dispatch early and the returned value becomes the final result.
///
/// ```rust
/// use async_trait::async_trait;
/// use tokio_util::sync::CancellationToken;
/// use vali_mediator::{HandlerResult, Message, Next, PipelineBehavior};
///
/// struct RejectEmpty;
///
/// #[async_trait]
/// impl<M: Message> PipelineBehavior<M, String> for RejectEmpty {
///     async fn handle(
///         &self,
///         _message: &M,
///         next: Next<'_, String>,
///         _cancel: &CancellationToken,
///     ) -> HandlerResult<String> {
///         let response = next.run().await?;
///         if response.is_empty() {
///             return Err("empty response".into());
///         }
///         Ok(response)
///     }
/// }
/// ```
#[async_trait]
pub trait PipelineBehavior<M, T = ()>: Send + Sync
where
    M: Message,
    T: Send + 'static,
{
    async fn handle(
        &self,
        message: &M,
        next: Next<'_, T>,
        cancel: &CancellationToken,
    ) -> HandlerResult<T>;

    fn behavior_name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}
