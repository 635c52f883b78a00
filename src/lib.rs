#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Vali Mediator
//!
//! In-process mediator: callers hand a message to a [`Mediator`] instead of
//! calling its handler directly, and cross-cutting behaviors wrap every
//! dispatch without the handler knowing about them.
//!
//! ## Message Kinds
//!
//! - **Request**: exactly one handler, typed response
//! - **Fire-and-forget**: exactly one handler, no response
//! - **Notification**: any number of prioritized subscribers, run in order
//!
//! ## Pipeline
//!
//! ```text
//! pre-processors ─► B1 ─► B2 ─► handler ─► B2 ─► B1 ─► post-processors
//! ```
//!
//! Behaviors ([`PipelineBehavior`]) nest in registration order. Pre- and
//! post-processors run once per dispatch, side effects only.
//!
//! ## Module Organization
//!
//! - [`messages`] - Message traits and declaration macros
//! - [`handlers`] - Handler, behavior and processor contracts
//! - [`pipeline`] - Behavior composition
//! - [`registry`] - Resolver interface and the default registry
//! - [`mediator`] - Dispatch engine, builder and counters
//! - [`compensation`] - Explicit compensating commands
//! - [`config`] - Engine configuration
//! - [`error`] - Structured error handling
//! - [`logging`] - Tracing setup and structured log helpers
//!
//! ## Quick Start
//!
//! ```rust
//! use vali_mediator::{
//!     async_trait, impl_request, CancellationToken, HandlerResult, Mediator, RequestHandler,
//!     TracingBehavior,
//! };
//!
//! struct GetGreeting { name: String }
//! impl_request!(GetGreeting => String);
//!
//! struct GreetingHandler;
//!
//! #[async_trait]
//! impl RequestHandler<GetGreeting> for GreetingHandler {
//!     async fn handle(
//!         &self,
//!         request: &GetGreeting,
//!         _: &CancellationToken,
//!     ) -> HandlerResult<String> {
//!         Ok(format!("Hello, {}!", request.name))
//!     }
//! }
//!
//! # tokio_test::block_on(async {
//! let mediator = Mediator::builder()
//!     .request_handler(GreetingHandler)
//!     .request_behavior::<GetGreeting, _>(TracingBehavior::new())
//!     .build()?;
//!
//! let greeting = mediator.send(&GetGreeting { name: "Ada".into() }).await?;
//! assert_eq!(greeting, "Hello, Ada!");
//! # Ok::<(), vali_mediator::MediatorError>(())
//! # }).unwrap();
//! ```

pub mod compensation;
pub mod config;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod mediator;
pub mod messages;
pub mod pipeline;
pub mod registry;

pub use compensation::{Compensable, CompensationDescriptor};
pub use config::{MediatorConfig, NotificationFailurePolicy};
pub use error::{HandlerError, HandlerResult, MediatorError, MediatorResult, SubscriberFailure};
pub use handlers::{
    FireAndForgetHandler, NotificationHandler, PipelineBehavior, PostProcessor, PreProcessor,
    RequestHandler, RequestPostProcessor, DEFAULT_PRIORITY,
};
pub use logging::init_structured_logging;
pub use mediator::{Mediator, MediatorBuilder, MediatorStats, StatsSnapshot};
pub use messages::{FireAndForget, Message, MessageKind, Notification, Request};
pub use pipeline::{compose, Next, TracingBehavior};
pub use registry::{
    HandlerKey, HandlerRegistry, NotificationSubscription, Provider, RegistryStats, Resolver,
    StageRole, TypeKey,
};

pub use async_trait::async_trait;
pub use tokio_util::sync::CancellationToken;
