use anyhow::Result;
use std::path::PathBuf;
use std::sync::Arc;

use crate::driver::{DriverError, UploadDriver, UploadOutcome, UploadRequest};
use crate::retry::{Classification, OutcomeClassifier, RetryDecision, RetryPolicy};
use crate::schedule_db::{ScheduleDb, ScheduleId, ScheduleStatus};

/// Why a run didn't touch the schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// No schedule row with that id.
    NotFound,
    /// Already completed or cancelled.
    AlreadyFinished(ScheduleStatus),
    /// Another invocation claimed the row first (or it is failed/terminal).
    LostClaim,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::NotFound => write!(f, "schedule not found"),
            SkipReason::AlreadyFinished(status) => write!(f, "already {}", status),
            SkipReason::LostClaim => write!(f, "not pending (claimed elsewhere or terminal)"),
        }
    }
}

/// Outcome of one `process_schedule` run. A skip is not a failure: the
/// schedule was simply not ours to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Uploaded,
    Failed,
    Skipped(SkipReason),
}

impl std::fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunOutcome::Uploaded => write!(f, "uploaded"),
            RunOutcome::Failed => write!(f, "failed"),
            RunOutcome::Skipped(reason) => write!(f, "skipped ({})", reason),
        }
    }
}

/// Drives one schedule through claim, attempts, and terminal status.
///
/// Every status or error-message change is persisted before the next step,
/// so a crash mid-sequence leaves an inspectable row rather than silently
/// lost work.
pub struct UploadWorker {
    db: ScheduleDb,
    driver: Arc<dyn UploadDriver>,
    classifier: OutcomeClassifier,
    policy: RetryPolicy,
    cookies_dir: PathBuf,
}

impl UploadWorker {
    pub fn new(
        db: ScheduleDb,
        driver: Arc<dyn UploadDriver>,
        classifier: OutcomeClassifier,
        policy: RetryPolicy,
        cookies_dir: PathBuf,
    ) -> Self {
        Self {
            db,
            driver,
            classifier,
            policy,
            cookies_dir,
        }
    }

    pub fn db(&self) -> &ScheduleDb {
        &self.db
    }

    /// Run the full attempt sequence for one schedule id.
    ///
    /// Returns `Skipped` when the schedule is absent, already finished, or
    /// claimed by a concurrent invocation; `Failed`/`Uploaded` otherwise.
    /// `Err` is reserved for infrastructure trouble (the database).
    pub async fn process_schedule(&self, id: ScheduleId) -> Result<RunOutcome> {
        let Some(detail) = self.db.get_schedule(id).await? else {
            tracing::warn!(schedule = id, "schedule not found");
            return Ok(RunOutcome::Skipped(SkipReason::NotFound));
        };

        let status = detail.schedule.status;
        if matches!(status, ScheduleStatus::Completed | ScheduleStatus::Cancelled) {
            tracing::info!(schedule = id, %status, "already finished, skipping");
            return Ok(RunOutcome::Skipped(SkipReason::AlreadyFinished(status)));
        }

        // The claim is the concurrency gate: whoever flips pending ->
        // uploading owns the attempt sequence. Losing it means another
        // invocation got here first, or the row is failed (terminal).
        if !self.db.claim_pending(id).await? {
            tracing::info!(schedule = id, "lost claim, skipping");
            return Ok(RunOutcome::Skipped(SkipReason::LostClaim));
        }

        let Some(video) = detail.video else {
            self.db.mark_failed(id, "video record missing").await?;
            return Ok(RunOutcome::Failed);
        };
        let Some(profile) = detail.profile else {
            self.db.mark_failed(id, "credential profile missing").await?;
            return Ok(RunOutcome::Failed);
        };

        let cookies_file = self.cookies_dir.join(&profile.cookies_filename);
        if !cookies_file.exists() {
            let message = format!("cookies file not found: {}", profile.cookies_filename);
            self.db.mark_failed(id, &message).await?;
            return Ok(RunOutcome::Failed);
        }

        let request = UploadRequest {
            video_path: PathBuf::from(&video.file_path),
            description: detail.schedule.description.clone(),
            cookies_file,
            proxy: profile.proxy.clone(),
        };

        // Give the automation environment a moment before the first attempt.
        if !self.policy.initial_delay.is_zero() {
            tokio::time::sleep(self.policy.initial_delay).await;
        }

        let mut attempt = 1u32;
        loop {
            tracing::info!(
                schedule = id,
                attempt,
                max_attempts = self.policy.max_attempts,
                video = %video.original_filename,
                "upload attempt"
            );

            let diagnostic = match self.run_attempt(&request).await {
                Ok(Ok(UploadOutcome::Posted)) => {
                    self.db.mark_completed(id, None).await?;
                    tracing::info!(schedule = id, "upload succeeded");
                    return Ok(RunOutcome::Uploaded);
                }
                Ok(Ok(UploadOutcome::Rejected(text))) => {
                    match self.classifier.classify(&text, attempt) {
                        Classification::InferredSuccess { advisory } => {
                            tracing::info!(
                                schedule = id,
                                diagnostic = %text,
                                "driver reported failure but marker indicates the post landed"
                            );
                            self.db.mark_completed(id, advisory.as_deref()).await?;
                            return Ok(RunOutcome::Uploaded);
                        }
                        Classification::Retryable => format!("attempt {} failed: {}", attempt, text),
                    }
                }
                Ok(Err(e)) => format!("attempt {} raised error: {}", attempt, e),
                // The driver panicked on the blocking pool; contain it like
                // any other attempt failure.
                Err(join_err) => format!("attempt {} raised error: {}", attempt, join_err),
            };

            tracing::warn!(schedule = id, "{}", diagnostic);
            self.db.set_error_message(id, &diagnostic).await?;

            match self.policy.decide(attempt) {
                RetryDecision::RetryAfter(delay) => {
                    tracing::info!(schedule = id, "retrying in {:?}", delay);
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                RetryDecision::NoRetry => {
                    self.db.mark_failed(id, &diagnostic).await?;
                    tracing::warn!(schedule = id, "all attempts failed");
                    return Ok(RunOutcome::Failed);
                }
            }
        }
    }

    /// One driver call on the blocking pool. The outer error is a panic in
    /// the driver; the inner one a launch failure.
    async fn run_attempt(
        &self,
        request: &UploadRequest,
    ) -> Result<Result<UploadOutcome, DriverError>, tokio::task::JoinError> {
        let driver = Arc::clone(&self.driver);
        let request = request.clone();
        tokio::task::spawn_blocking(move || driver.attempt(&request)).await
    }
}
