use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};
use strum::{Display, EnumString};

use crate::error::GradebookError;

/// Which backing table a submission came from.
///
/// The declaration order is the merge tie-break order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumString, Serialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SourceKind {
    QuizAttempt,
    AssignmentSubmission,
}

/// Canonical review status shared by both sources.
///
/// Ordering follows the review lifecycle and is what a `status` sort uses.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumString,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum SubmissionStatus {
    Pending,
    Graded,
    Rejected,
    RevisionRequested,
}

impl SubmissionStatus {
    /// Statuses a source of the given kind can ever report.
    pub fn reachable_by(self, kind: SourceKind) -> bool {
        match kind {
            SourceKind::QuizAttempt => {
                matches!(self, SubmissionStatus::Pending | SubmissionStatus::Graded)
            }
            SourceKind::AssignmentSubmission => true,
        }
    }
}

/// Globally unique handle of a submission: primitive ids are only unique
/// within one source, so the source kind is part of the identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubmissionRef {
    pub kind: SourceKind,
    pub record_id: i64,
}

impl SubmissionRef {
    pub fn quiz_attempt(record_id: i64) -> Self {
        Self {
            kind: SourceKind::QuizAttempt,
            record_id,
        }
    }

    pub fn assignment_submission(record_id: i64) -> Self {
        Self {
            kind: SourceKind::AssignmentSubmission,
            record_id,
        }
    }
}

impl fmt::Display for SubmissionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.record_id)
    }
}

impl FromStr for SubmissionRef {
    type Err = GradebookError;

    /// Parses the `kind:id` form produced by `Display`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || GradebookError::validation(format!("invalid submission id '{s}'"));

        let (kind, id) = s.split_once(':').ok_or_else(invalid)?;
        let kind = SourceKind::from_str(kind).map_err(|_| invalid())?;
        let record_id = id.parse::<i64>().map_err(|_| invalid())?;
        Ok(Self { kind, record_id })
    }
}

impl Serialize for SubmissionRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// The normalized, source-agnostic view of a quiz attempt or an upload.
///
/// Built fresh on every read and never persisted. Adapters guarantee
/// `status == Graded` exactly when `grade` is `Some`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CanonicalSubmission {
    pub id: SubmissionRef,
    #[serde(skip)]
    pub source_kind: SourceKind,
    pub student_id: i64,
    pub student_name: String,
    pub student_email: String,
    pub course_id: i64,
    pub course_title: String,
    pub assignment_id: i64,
    pub assignment_title: String,
    pub submitted_at: DateTime<Utc>,
    pub status: SubmissionStatus,
    pub grade: Option<f64>,
    pub feedback: Option<String>,
    pub attachment_ref: Option<String>,
    pub text_answer: Option<String>,
}

impl CanonicalSubmission {
    /// Case-insensitive substring match over the searchable text fields.
    ///
    /// `needle` must already be lowercase.
    pub fn matches_search(&self, needle: &str) -> bool {
        [
            &self.student_name,
            &self.student_email,
            &self.assignment_title,
        ]
        .iter()
        .any(|field| field.to_lowercase().contains(needle))
    }
}
