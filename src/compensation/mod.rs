//! # Compensation
//!
//! An operation can declare an alternate fire-and-forget command that undoes
//! or offsets its effects. Nothing in the mediator invokes it: the caller
//! decides when to call [`Compensable::compensate`], typically from its own
//! error path.
//!
//! ```rust,no_run
//! # use vali_mediator::{impl_fire_and_forget, CompensationDescriptor, Compensable};
//! # use vali_mediator::{Mediator, MediatorResult};
//! struct ReleaseStock { sku: String }
//! impl_fire_and_forget!(ReleaseStock);
//!
//! # async fn reserve(mediator: &Mediator) -> MediatorResult<()> {
//! let undo = CompensationDescriptor::new("reserve_stock", || {
//!     Some(ReleaseStock { sku: "A-1".into() })
//! });
//!
//! // ...the reservation fails further down...
//! undo.compensate(mediator, &Default::default()).await
//! # }
//! ```

use crate::error::MediatorResult;
use crate::mediator::Mediator;
use crate::messages::FireAndForget;
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// An operation carrying an optional compensating command
#[async_trait]
pub trait Compensable: Send + Sync {
    type Compensation: FireAndForget;

    /// The compensating command, if this operation declares one
    fn compensation(&self) -> Option<Self::Compensation>;

    fn operation_name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Dispatch the compensating command through the fire-and-forget path.
    ///
    /// Completes immediately when no compensation is declared.
    async fn compensate(
        &self,
        mediator: &Mediator,
        cancel: &CancellationToken,
    ) -> MediatorResult<()> {
        match self.compensation() {
            None => {
                debug!(
                    operation = self.operation_name(),
                    "No compensation declared, nothing to dispatch"
                );
                Ok(())
            }
            Some(command) => {
                info!(
                    operation = self.operation_name(),
                    command = <Self::Compensation as crate::messages::Message>::message_name(),
                    "↩️ Dispatching compensation"
                );
                mediator
                    .send_command_with_cancellation(&command, cancel)
                    .await
            }
        }
    }
}

type CompensationFactory<C> = Box<dyn Fn() -> Option<C> + Send + Sync>;

/// Named operation with a lazily built compensating command
pub struct CompensationDescriptor<C: FireAndForget> {
    operation: String,
    factory: CompensationFactory<C>,
}

impl<C: FireAndForget> CompensationDescriptor<C> {
    pub fn new<F>(operation: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> Option<C> + Send + Sync + 'static,
    {
        Self {
            operation: operation.into(),
            factory: Box::new(factory),
        }
    }

    /// Descriptor for an operation that has nothing to compensate
    pub fn none(operation: impl Into<String>) -> Self {
        Self::new(operation, || None)
    }

    pub fn operation(&self) -> &str {
        &self.operation
    }
}

impl<C: FireAndForget> Compensable for CompensationDescriptor<C> {
    type Compensation = C;

    fn compensation(&self) -> Option<C> {
        (self.factory)()
    }

    fn operation_name(&self) -> &str {
        &self.operation
    }
}

impl<C: FireAndForget> std::fmt::Debug for CompensationDescriptor<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompensationDescriptor")
            .field("operation", &self.operation)
            .field("compensation", &std::any::type_name::<C>())
            .finish()
    }
}
