//! Shared fixtures for integration tests: a scripted driver and DB seeding.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use vpost_core::driver::{DriverError, UploadDriver, UploadOutcome, UploadRequest};

/// Replays a fixed list of outcomes, then keeps posting. Counts calls.
pub struct SequenceDriver {
    script: Mutex<VecDeque<UploadOutcome>>,
    calls: AtomicU32,
}

impl SequenceDriver {
    pub fn new(script: Vec<UploadOutcome>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            calls: AtomicU32::new(0),
        })
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

impl UploadDriver for SequenceDriver {
    fn attempt(&self, _request: &UploadRequest) -> Result<UploadOutcome, DriverError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(UploadOutcome::Posted))
    }
}
