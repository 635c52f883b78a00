#![allow(dead_code)]

pub mod fixtures;
pub mod strategies;

pub use fixtures::*;

use parking_lot::Mutex;
use std::sync::Arc;

/// Shared, ordered record of what ran during a dispatch
#[derive(Debug, Clone, Default)]
pub struct Journal(Arc<Mutex<Vec<String>>>);

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, entry: impl Into<String>) {
        self.0.lock().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().clone()
    }

    pub fn count(&self, entry: &str) -> usize {
        self.0.lock().iter().filter(|e| e.as_str() == entry).count()
    }
}

/// Install the test subscriber once; `RUST_LOG` controls verbosity
pub fn setup_test_logging() {
    std::env::set_var("MEDIATOR_ENV", "test");
    vali_mediator::init_structured_logging();
}
