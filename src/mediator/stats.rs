use crate::error::MediatorError;
use crate::messages::MessageKind;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Dispatch counters shared by every clone of a mediator
#[derive(Debug, Default)]
pub struct MediatorStats {
    requests: AtomicU64,
    commands: AtomicU64,
    notifications: AtomicU64,
    /// Notification subscribers that completed successfully
    deliveries: AtomicU64,
    failures: AtomicU64,
    handlers_not_found: AtomicU64,
    last_dispatch_at: Mutex<Option<DateTime<Utc>>>,
}

/// Point-in-time copy of [`MediatorStats`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub requests: u64,
    pub commands: u64,
    pub notifications: u64,
    pub deliveries: u64,
    pub failures: u64,
    pub handlers_not_found: u64,
    pub last_dispatch_at: Option<DateTime<Utc>>,
}

impl StatsSnapshot {
    pub fn total_dispatches(&self) -> u64 {
        self.requests + self.commands + self.notifications
    }
}

impl MediatorStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_dispatch(&self, kind: MessageKind, error: Option<&MediatorError>) {
        let counter = match kind {
            MessageKind::Request => &self.requests,
            MessageKind::FireAndForget => &self.commands,
            MessageKind::Notification => &self.notifications,
        };
        counter.fetch_add(1, Ordering::Relaxed);

        if let Some(error) = error {
            self.failures.fetch_add(1, Ordering::Relaxed);
            if error.is_handler_not_found() {
                self.handlers_not_found.fetch_add(1, Ordering::Relaxed);
            }
        }

        *self.last_dispatch_at.lock() = Some(Utc::now());
    }

    pub fn record_delivery(&self) {
        self.deliveries.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            requests: self.requests.load(Ordering::Relaxed),
            commands: self.commands.load(Ordering::Relaxed),
            notifications: self.notifications.load(Ordering::Relaxed),
            deliveries: self.deliveries.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
            handlers_not_found: self.handlers_not_found.load(Ordering::Relaxed),
            last_dispatch_at: *self.last_dispatch_at.lock(),
        }
    }

    pub fn reset(&self) {
        for counter in [
            &self.requests,
            &self.commands,
            &self.notifications,
            &self.deliveries,
            &self.failures,
            &self.handlers_not_found,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
        *self.last_dispatch_at.lock() = None;
    }
}
