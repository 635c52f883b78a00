use crate::handlers::NotificationHandler;
use crate::messages::Notification;
use std::sync::Arc;

/// A notification handler together with the priority it runs at
pub struct NotificationSubscription<N: Notification> {
    pub handler: Arc<dyn NotificationHandler<N>>,
    pub priority: i32,
}

impl<N: Notification> NotificationSubscription<N> {
    /// Subscribe using the priority the handler declares
    pub fn new(handler: Arc<dyn NotificationHandler<N>>) -> Self {
        let priority = handler.priority();
        Self { handler, priority }
    }

    pub fn with_priority(handler: Arc<dyn NotificationHandler<N>>, priority: i32) -> Self {
        Self { handler, priority }
    }

    pub fn handler_name(&self) -> &str {
        self.handler.handler_name()
    }
}

impl<N: Notification> Clone for NotificationSubscription<N> {
    fn clone(&self) -> Self {
        Self {
            handler: Arc::clone(&self.handler),
            priority: self.priority,
        }
    }
}

impl<N: Notification> std::fmt::Debug for NotificationSubscription<N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationSubscription")
            .field("handler", &self.handler.handler_name())
            .field("priority", &self.priority)
            .finish()
    }
}

/// Sort subscriptions highest priority first.
///
/// The sort is stable: subscriptions sharing a priority keep the order they
/// were resolved in.
pub fn order_by_priority<N: Notification>(
    mut subscriptions: Vec<NotificationSubscription<N>>,
) -> Vec<NotificationSubscription<N>> {
    subscriptions.sort_by(|a, b| b.priority.cmp(&a.priority));
    subscriptions
}
