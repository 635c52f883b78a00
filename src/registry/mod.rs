//! # Registry Infrastructure
//!
//! Type-keyed lookup of handlers, behaviors and processors.
//!
//! ## Overview
//!
//! The dispatch engine never knows how stages were registered. It asks a
//! [`Resolver`] for the providers stored under a [`HandlerKey`] and receives
//! them as type-erased [`Provider`]s, in registration order. Each provider
//! holds the concrete trait object for its role (for example
//! `Arc<dyn RequestHandler<R>>`); the engine recovers it with a single
//! downcast and reports `MalformedStage` when the shape is wrong.
//!
//! ## Available Resolvers
//!
//! - **HandlerRegistry**: concurrent in-memory registry with typed
//!   registration methods
//!
//! ## Architecture
//!
//! ```text
//! HandlerKey { role, message, response }
//!        │
//!        ▼
//! Resolver::resolve ──► Vec<Provider> ──► downcast ──► Arc<dyn Stage<M>>
//! ```

mod handler_registry;
mod subscription;

pub use handler_registry::{HandlerRegistry, RegistryStats};
pub use subscription::{order_by_priority, NotificationSubscription};

use serde::{Deserialize, Serialize};
use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Type-erased stage entry returned by a [`Resolver`]
pub type Provider = Arc<dyn Any + Send + Sync>;

/// Stable identifier of a Rust type, used as registry key
#[derive(Clone, Copy)]
pub struct TypeKey {
    id: TypeId,
    name: &'static str,
}

impl TypeKey {
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for TypeKey {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeKey {}

impl Hash for TypeKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Role a provider plays in a dispatch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageRole {
    Handler,
    NotificationHandler,
    Behavior,
    PreProcessor,
    PostProcessor,
}

impl fmt::Display for StageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            StageRole::Handler => "handler",
            StageRole::NotificationHandler => "notification handler",
            StageRole::Behavior => "behavior",
            StageRole::PreProcessor => "pre-processor",
            StageRole::PostProcessor => "post-processor",
        };
        f.write_str(label)
    }
}

/// Lookup key: role, message type and, for requests, the response type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerKey {
    pub role: StageRole,
    pub message: TypeKey,
    pub response: Option<TypeKey>,
}

impl HandlerKey {
    pub fn new(role: StageRole, message: TypeKey) -> Self {
        Self {
            role,
            message,
            response: None,
        }
    }

    #[must_use]
    pub fn with_response(mut self, response: TypeKey) -> Self {
        self.response = Some(response);
        self
    }

    /// Key for a stage bound to a request and its response type
    pub fn for_request<R: crate::messages::Request>(role: StageRole) -> Self {
        Self::new(role, TypeKey::of::<R>()).with_response(TypeKey::of::<R::Response>())
    }

    /// Key for a stage bound to a fire-and-forget command or a notification
    pub fn for_message<M: crate::messages::Message>(role: StageRole) -> Self {
        Self::new(role, TypeKey::of::<M>())
    }
}

impl fmt::Display for HandlerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.response {
            Some(response) => write!(f, "{}<{}, {}>", self.role, self.message, response),
            None => write!(f, "{}<{}>", self.role, self.message),
        }
    }
}

/// Type-keyed stage lookup consumed by the dispatch engine
///
/// Implementations must be pure lookups: no side effects, providers returned
/// in a stable order (registration order for the built-in registry). The
/// engine resolves every stage afresh on each dispatch; caching, if any, is
/// the resolver's business.
pub trait Resolver: Send + Sync {
    /// All providers registered under `key`, in order
    fn resolve(&self, key: &HandlerKey) -> Vec<Provider>;

    fn resolver_name(&self) -> &str {
        "resolver"
    }

    /// Candidates for the single handler of a request or command.
    ///
    /// Returns every match so the caller can reject ambiguity instead of
    /// silently picking one.
    fn resolve_handler(&self, message: TypeKey, response: Option<TypeKey>) -> Vec<Provider> {
        self.resolve(&keyed(StageRole::Handler, message, response))
    }

    fn resolve_handlers(&self, message: TypeKey) -> Vec<Provider> {
        self.resolve(&HandlerKey::new(StageRole::NotificationHandler, message))
    }

    fn resolve_behaviors(&self, message: TypeKey, response: Option<TypeKey>) -> Vec<Provider> {
        self.resolve(&keyed(StageRole::Behavior, message, response))
    }

    fn resolve_pre_processors(&self, message: TypeKey, response: Option<TypeKey>) -> Vec<Provider> {
        self.resolve(&keyed(StageRole::PreProcessor, message, response))
    }

    fn resolve_post_processors(
        &self,
        message: TypeKey,
        response: Option<TypeKey>,
    ) -> Vec<Provider> {
        self.resolve(&keyed(StageRole::PostProcessor, message, response))
    }
}

fn keyed(role: StageRole, message: TypeKey, response: Option<TypeKey>) -> HandlerKey {
    HandlerKey {
        role,
        message,
        response,
    }
}
