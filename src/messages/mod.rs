//! # Message Taxonomy
//!
//! Three disjoint message kinds flow through the mediator:
//!
//! | Kind | Trait | Handlers | Result |
//! |------|-------|----------|--------|
//! | Request | [`Request`] | exactly one | `Request::Response` |
//! | Fire-and-forget | [`FireAndForget`] | exactly one | `()` |
//! | Notification | [`Notification`] | zero or more | `()` |
//!
//! Every message implements [`Message`] exactly once, and its associated
//! `Kind` marker is drawn from the sealed [`kind`] module. A type therefore
//! cannot be both a request and a notification: the compiler rejects the
//! second `Message` impl.
//!
//! ## Usage
//!
//! ```rust
//! use vali_mediator::{impl_notification, impl_request, MessageKind, Message};
//!
//! struct GetPrice { sku: String }
//! impl_request!(GetPrice => u64);
//!
//! struct PriceChanged { sku: String, cents: u64 }
//! impl_notification!(PriceChanged);
//!
//! let query = GetPrice { sku: "A-1".into() };
//! assert_eq!(query.kind(), MessageKind::Request);
//! ```

mod macros;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed set of message kinds understood by the dispatch engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    Request,
    FireAndForget,
    Notification,
}

impl MessageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageKind::Request => "request",
            MessageKind::FireAndForget => "fire-and-forget",
            MessageKind::Notification => "notification",
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind markers used as `Message::Kind`.
pub mod kind {
    use super::MessageKind;

    mod sealed {
        pub trait Sealed {}
    }

    /// Implemented only by the three markers in this module.
    pub trait KindMarker: sealed::Sealed + Send + Sync + 'static {
        const KIND: MessageKind;
    }

    #[derive(Debug)]
    pub struct Request;

    #[derive(Debug)]
    pub struct FireAndForget;

    #[derive(Debug)]
    pub struct Notification;

    impl sealed::Sealed for Request {}
    impl sealed::Sealed for FireAndForget {}
    impl sealed::Sealed for Notification {}

    impl KindMarker for Request {
        const KIND: MessageKind = MessageKind::Request;
    }

    impl KindMarker for FireAndForget {
        const KIND: MessageKind = MessageKind::FireAndForget;
    }

    impl KindMarker for Notification {
        const KIND: MessageKind = MessageKind::Notification;
    }
}

use kind::KindMarker;

/// Base trait for everything the mediator can dispatch
pub trait Message: Send + Sync + 'static {
    /// One of the markers in [`kind`]
    type Kind: KindMarker;

    /// Type name used in logs and errors
    fn message_name() -> &'static str
    where
        Self: Sized,
    {
        std::any::type_name::<Self>()
    }

    fn kind(&self) -> MessageKind {
        <Self::Kind as KindMarker>::KIND
    }

    /// Reject a message before any handler is resolved.
    ///
    /// Failures surface as `MediatorError::ArgumentInvalid`.
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }
}

/// A message answered by exactly one handler with a typed response
pub trait Request: Message<Kind = kind::Request> {
    type Response: Send + Sync + 'static;
}

/// A command handled by exactly one handler, with no response
pub trait FireAndForget: Message<Kind = kind::FireAndForget> {}

/// A broadcast delivered to every subscriber in priority order
pub trait Notification: Message<Kind = kind::Notification> {}

/// Static kind of a message type, without needing an instance
pub fn kind_of<M: Message>() -> MessageKind {
    <M::Kind as KindMarker>::KIND
}
