//! Classify upload-driver failure text into retryable vs. inferred success.
//!
//! The driver's failure signal is a free-text diagnostic from a browser
//! automation layer, and some of its "failures" are known false negatives:
//! the post went through but the confirmation element was never seen. The
//! rules below reclassify those as success. They are ordered, first match
//! wins, and they are data rather than code so a deployment can swap them
//! when the platform changes its UI copy.

/// One marker-matching rule applied to a driver diagnostic.
#[derive(Debug, Clone)]
pub struct InferenceRule {
    /// Substring looked for in the diagnostic text.
    pub needle: String,
    /// Match against the lowercased diagnostic.
    pub case_insensitive: bool,
    /// Rule only applies to the first attempt of a sequence.
    pub first_attempt_only: bool,
    /// Note to keep in the schedule's error field on match (None clears it).
    pub advisory: Option<String>,
}

impl InferenceRule {
    fn matches(&self, diagnostic: &str, attempt: u32) -> bool {
        if self.first_attempt_only && attempt != 1 {
            return false;
        }
        if self.case_insensitive {
            diagnostic.to_lowercase().contains(&self.needle.to_lowercase())
        } else {
            diagnostic.contains(&self.needle)
        }
    }
}

/// What a driver-reported failure turned out to be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// The failure text matches a known false-negative marker: treat the
    /// upload as posted, optionally keeping an advisory note.
    InferredSuccess { advisory: Option<String> },
    /// A real (or at least unrecognized) failure; retry if budget remains.
    Retryable,
}

/// Ordered success-inference rules for driver diagnostics.
#[derive(Debug, Clone)]
pub struct OutcomeClassifier {
    rules: Vec<InferenceRule>,
}

impl OutcomeClassifier {
    pub fn new(rules: Vec<InferenceRule>) -> Self {
        Self { rules }
    }

    /// Rules matching the platform's current automation layer:
    ///
    /// 1. The "Post now" confirmation button was never found. The upload
    ///    flow redirects to the platform's post-management UI on success,
    ///    which removes that button, so this marker means the post landed.
    /// 2. Same signal via the automation layer's internal element id.
    /// 3. A timeout on the *first* attempt: the upload almost always went
    ///    through and the automation gave up waiting on the redirect.
    ///    Retrying would double-post, so stop with an advisory instead.
    pub fn platform_defaults() -> Self {
        Self::new(vec![
            InferenceRule {
                needle: "No 'Post now' button found".to_string(),
                case_insensitive: false,
                first_attempt_only: false,
                advisory: None,
            },
            InferenceRule {
                needle: "post_now".to_string(),
                case_insensitive: true,
                first_attempt_only: false,
                advisory: None,
            },
            InferenceRule {
                needle: "timeout".to_string(),
                case_insensitive: true,
                first_attempt_only: true,
                advisory: Some("Completed (timeout - verify manually)".to_string()),
            },
        ])
    }

    /// Classify a driver failure diagnostic for the given 1-based attempt.
    pub fn classify(&self, diagnostic: &str, attempt: u32) -> Classification {
        for rule in &self.rules {
            if rule.matches(diagnostic, attempt) {
                return Classification::InferredSuccess {
                    advisory: rule.advisory.clone(),
                };
            }
        }
        Classification::Retryable
    }
}
