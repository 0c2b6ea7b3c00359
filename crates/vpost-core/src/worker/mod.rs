//! Upload worker: runs one schedule's attempt sequence with retries.
//!
//! Both the poller and the immediate-trigger path funnel into
//! `UploadWorker::process_schedule`; the claim on the schedule row decides
//! which caller actually drives the upload when they race.

mod run;


pub use run::{RunOutcome, SkipReason, UploadWorker};
