use crate::error::HandlerResult;
use crate::messages::{Message, Request};
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

/// Hook run once before the behavior chain
///
/// Pre-processors run sequentially in registration order. They cannot stop
/// the dispatch by returning a value, only by failing.
#[async_trait]
pub trait PreProcessor<M: Message>: Send + Sync {
    async fn process(&self, message: &M, cancel: &CancellationToken) -> HandlerResult<()>;

    fn processor_name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// Hook run once after a fire-and-forget command or a notification fan-out
/// completed successfully
#[async_trait]
pub trait PostProcessor<M: Message>: Send + Sync {
    async fn process(&self, message: &M, cancel: &CancellationToken) -> HandlerResult<()>;

    fn processor_name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// Hook run after a request produced its response
///
/// Never runs when the handler or any behavior failed.
#[async_trait]
pub trait RequestPostProcessor<R: Request>: Send + Sync {
    async fn process(
        &self,
        request: &R,
        response: &R::Response,
        cancel: &CancellationToken,
    ) -> HandlerResult<()>;

    fn processor_name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}
