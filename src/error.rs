//! # Mediator Errors
//!
//! Every dispatch call surfaces failures through [`MediatorError`]. The engine
//! never recovers locally: stage errors travel back to the caller untouched,
//! either as the `MediatorError` they already were or wrapped in
//! [`MediatorError::HandlerFailure`] with the original error kept as `source`.

use crate::messages::MessageKind;
use crate::registry::StageRole;

/// Error type returned by handlers, behaviors and processors.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type returned by every pipeline stage.
pub type HandlerResult<T> = std::result::Result<T, HandlerError>;

/// Result type returned by the dispatch engine.
pub type MediatorResult<T> = std::result::Result<T, MediatorError>;

/// Dispatch engine errors
#[derive(Debug, thiserror::Error)]
pub enum MediatorError {
    #[error("No handler found for {kind} '{message_type}'")]
    HandlerNotFound {
        kind: MessageKind,
        message_type: &'static str,
    },

    #[error("{count} handlers resolved for {kind} '{message_type}', expected exactly one")]
    AmbiguousHandler {
        kind: MessageKind,
        message_type: &'static str,
        count: usize,
    },

    #[error("Malformed {role} stage for '{message_type}': {reason}")]
    MalformedStage {
        role: StageRole,
        message_type: &'static str,
        reason: String,
    },

    #[error("Handler failure while dispatching '{message_type}': {source}")]
    HandlerFailure {
        message_type: &'static str,
        #[source]
        source: HandlerError,
    },

    #[error("Invalid argument for '{message_type}': {reason}")]
    ArgumentInvalid {
        message_type: &'static str,
        reason: String,
    },

    #[error("Dispatch of '{message_type}' was cancelled")]
    Cancelled { message_type: &'static str },

    #[error("{} notification handler(s) failed for '{message_type}'", failures.len())]
    NotificationFailures {
        message_type: &'static str,
        failures: Vec<SubscriberFailure>,
    },

    #[error("Handler registration failed: {reason}")]
    RegistrationFailed { reason: String },

    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// One failed subscriber collected under the collect-all notification policy.
#[derive(Debug)]
pub struct SubscriberFailure {
    pub handler_name: String,
    pub priority: i32,
    pub error: MediatorError,
}

impl MediatorError {
    /// Convert an error raised inside the pipeline into an engine error.
    ///
    /// Errors that already are `MediatorError`s (a nested dispatch failing
    /// inside a handler, for instance) come back out unchanged.
    pub fn from_stage_error(message_type: &'static str, error: HandlerError) -> Self {
        match error.downcast::<MediatorError>() {
            Ok(inner) => *inner,
            Err(source) => MediatorError::HandlerFailure {
                message_type,
                source,
            },
        }
    }

    pub fn registration(reason: impl Into<String>) -> Self {
        MediatorError::RegistrationFailed {
            reason: reason.into(),
        }
    }

    pub fn is_handler_not_found(&self) -> bool {
        matches!(self, MediatorError::HandlerNotFound { .. })
    }

    /// The engine performs no retries, and nothing it reports is safe to
    /// replay blindly: handlers may already have produced side effects.
    pub fn is_retryable(&self) -> bool {
        false
    }

    /// Short machine-friendly label used in structured logs.
    pub fn error_kind(&self) -> &'static str {
        match self {
            MediatorError::HandlerNotFound { .. } => "handler_not_found",
            MediatorError::AmbiguousHandler { .. } => "ambiguous_handler",
            MediatorError::MalformedStage { .. } => "malformed_stage",
            MediatorError::HandlerFailure { .. } => "handler_failure",
            MediatorError::ArgumentInvalid { .. } => "argument_invalid",
            MediatorError::Cancelled { .. } => "cancelled",
            MediatorError::NotificationFailures { .. } => "notification_failures",
            MediatorError::RegistrationFailed { .. } => "registration_failed",
            MediatorError::Configuration(_) => "configuration",
        }
    }
}

impl From<config::ConfigError> for MediatorError {
    fn from(error: config::ConfigError) -> Self {
        MediatorError::Configuration(error.to_string())
    }
}
