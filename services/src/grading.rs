//! Review transitions and the request rules checked before any read.

use serde::Deserialize;

use crate::error::{GradebookError, GradebookResult};
use crate::submission::{CanonicalSubmission, SourceKind, SubmissionRef, SubmissionStatus};

/// An instructor's decision on one submission.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GradeRequest {
    #[serde(deserialize_with = "deserialize_ref")]
    pub submission: SubmissionRef,
    pub status: SubmissionStatus,
    pub score: Option<f64>,
    pub feedback: Option<String>,
}

fn deserialize_ref<'de, D>(deserializer: D) -> Result<SubmissionRef, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    raw.parse().map_err(serde::de::Error::custom)
}

impl GradeRequest {
    pub fn graded(submission: SubmissionRef, score: f64) -> Self {
        Self {
            submission,
            status: SubmissionStatus::Graded,
            score: Some(score),
            feedback: None,
        }
    }

    pub fn with_status(submission: SubmissionRef, status: SubmissionStatus) -> Self {
        Self {
            submission,
            status,
            score: None,
            feedback: None,
        }
    }

    pub fn with_feedback(mut self, feedback: impl Into<String>) -> Self {
        self.feedback = Some(feedback.into());
        self
    }

    /// Checks that need nothing from storage.
    pub fn validate(&self) -> GradebookResult<()> {
        match (self.status, self.score) {
            (SubmissionStatus::Pending, _) => {
                return Err(GradebookError::validation(
                    "a submission cannot be moved back to pending",
                ));
            }
            (SubmissionStatus::Graded, None) => {
                return Err(GradebookError::validation("grading requires a score"));
            }
            (SubmissionStatus::Graded, Some(score)) if !(0.0..=100.0).contains(&score) => {
                return Err(GradebookError::validation(format!(
                    "score must be between 0 and 100, got {score}"
                )));
            }
            (SubmissionStatus::Graded, Some(_)) => {}
            (status, Some(_)) => {
                return Err(GradebookError::validation(format!(
                    "a score can only be given with status graded, not {status}"
                )));
            }
            (_, None) => {}
        }

        if self.submission.kind == SourceKind::QuizAttempt
            && self.status != SubmissionStatus::Graded
        {
            return Err(GradebookError::validation(format!(
                "quiz attempts cannot be marked {}",
                self.status
            )));
        }
        Ok(())
    }
}

/// Whether a review may move a submission from `from` to `to`.
///
/// Pending work may take any decision; decided work may only be (re)graded.
pub fn validate_transition(from: SubmissionStatus, to: SubmissionStatus) -> GradebookResult<()> {
    use SubmissionStatus::*;

    match (from, to) {
        (_, Pending) => Err(GradebookError::InvalidTransition { from, to }),
        (Pending, _) | (_, Graded) => Ok(()),
        _ => Err(GradebookError::InvalidTransition { from, to }),
    }
}

/// Per-item result of a bulk grading call.
#[derive(Debug)]
pub struct GradeOutcome {
    pub submission: SubmissionRef,
    pub result: GradebookResult<CanonicalSubmission>,
}

impl GradeOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}
