use crate::error::HandlerResult;
use crate::handlers::PipelineBehavior;
use crate::messages::Message;
use crate::pipeline::Next;
use async_trait::async_trait;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Behavior that logs every pass through the chain
///
/// Works for any message and response type, so one instance can be registered
/// for requests, commands and notifications alike.
#[derive(Debug, Clone, Default)]
pub struct TracingBehavior {
    label: Option<String>,
}

impl TracingBehavior {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tag emitted log lines with a fixed label
    pub fn with_label(label: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
        }
    }

    fn label(&self) -> &str {
        self.label.as_deref().unwrap_or("pipeline")
    }
}

#[async_trait]
impl<M, T> PipelineBehavior<M, T> for TracingBehavior
where
    M: Message,
    T: Send + 'static,
{
    async fn handle(
        &self,
        message: &M,
        next: Next<'_, T>,
        _cancel: &CancellationToken,
    ) -> HandlerResult<T> {
        let started = Instant::now();
        debug!(
            label = %self.label(),
            message_type = M::message_name(),
            kind = %message.kind(),
            "➡️ Entering pipeline"
        );

        let result = next.run().await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match &result {
            Ok(_) => debug!(
                label = %self.label(),
                message_type = M::message_name(),
                elapsed_ms,
                "✅ Pipeline completed"
            ),
            Err(e) => warn!(
                label = %self.label(),
                message_type = M::message_name(),
                elapsed_ms,
                error = %e,
                "❌ Pipeline failed"
            ),
        }

        result
    }

    fn behavior_name(&self) -> &str {
        "TracingBehavior"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::compose;
    use std::sync::Arc;

    struct Heartbeat;
    crate::impl_notification!(Heartbeat);

    #[tokio::test]
    async fn test_tracing_behavior_is_transparent() {
        let behaviors: Vec<Arc<dyn PipelineBehavior<Heartbeat>>> =
            vec![Arc::new(TracingBehavior::with_label("test"))];
        let cancel = CancellationToken::new();

        let result = compose(&behaviors, &Heartbeat, &cancel, Next::new(|| async { Ok(()) }))
            .run()
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_tracing_behavior_returns_inner_error() {
        let behaviors: Vec<Arc<dyn PipelineBehavior<Heartbeat>>> =
            vec![Arc::new(TracingBehavior::new())];
        let cancel = CancellationToken::new();
        let failing = Next::new(|| async { Err::<(), crate::error::HandlerError>("down".into()) });

        let error = compose(&behaviors, &Heartbeat, &cancel, failing)
            .run()
            .await
            .unwrap_err();

        assert_eq!(error.to_string(), "down");
    }
}
