//! Upload driver: the narrow contract with the browser-automation layer.
//!
//! One call posts one video through the platform's web upload flow. The
//! call is blocking, takes seconds to minutes, may hang, and reports
//! failure as free-form diagnostic text (see `retry::classify` for why
//! that text cannot be trusted as a real failure signal).

mod process;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

pub use process::ProcessDriver;

/// Wait tuning for the automation session, passed into the driver when it
/// is built. `with_slow_floors` only ever raises waits, so user overrides
/// above the floor are respected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriverConfig {
    /// Automation helper executable.
    pub command: String,
    /// Run the automation browser without a visible window.
    pub headless: bool,
    pub implicit_wait_secs: u64,
    pub explicit_wait_secs: u64,
    /// Upper bound on waiting for the platform to finish processing the file.
    pub uploading_wait_secs: u64,
    pub hashtag_wait_secs: u64,
}

/// Minimum waits the platform UI needs to settle.
const IMPLICIT_WAIT_FLOOR: u64 = 10;
const EXPLICIT_WAIT_FLOOR: u64 = 90;
const UPLOADING_WAIT_FLOOR: u64 = 300;
const HASHTAG_WAIT_FLOOR: u64 = 7;

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            command: "upload-helper".to_string(),
            headless: false,
            implicit_wait_secs: IMPLICIT_WAIT_FLOOR,
            explicit_wait_secs: EXPLICIT_WAIT_FLOOR,
            uploading_wait_secs: UPLOADING_WAIT_FLOOR,
            hashtag_wait_secs: HASHTAG_WAIT_FLOOR,
        }
    }
}

impl DriverConfig {
    /// Raise every wait to at least its floor. The platform UI needs time
    /// to breathe; configured waits above the floor are kept.
    pub fn with_slow_floors(mut self) -> Self {
        self.implicit_wait_secs = self.implicit_wait_secs.max(IMPLICIT_WAIT_FLOOR);
        self.explicit_wait_secs = self.explicit_wait_secs.max(EXPLICIT_WAIT_FLOOR);
        self.uploading_wait_secs = self.uploading_wait_secs.max(UPLOADING_WAIT_FLOOR);
        self.hashtag_wait_secs = self.hashtag_wait_secs.max(HASHTAG_WAIT_FLOOR);
        self
    }
}

/// Everything one attempt needs. Owned so the request can cross into the
/// blocking pool.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub video_path: PathBuf,
    pub description: String,
    pub cookies_file: PathBuf,
    pub proxy: Option<String>,
}

/// Result of one driver attempt. The platform contract is "empty means
/// posted": anything else is a diagnostic string to be classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    Posted,
    Rejected(String),
}

/// The driver could not run at all (as opposed to running and reporting a
/// failure). Treated as a retryable attempt failure by the worker.
#[derive(Debug, Error)]
pub enum DriverError {
    #[error("failed to launch upload helper {command:?}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
}

/// One blocking upload attempt. Implementations must be callable from
/// multiple schedules over the process lifetime; per-attempt state lives
/// in the request.
pub trait UploadDriver: Send + Sync {
    fn attempt(&self, request: &UploadRequest) -> Result<UploadOutcome, DriverError>;
}
