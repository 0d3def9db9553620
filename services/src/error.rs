use sea_orm::DbErr;

use crate::submission::{SourceKind, SubmissionStatus};

pub type GradebookResult<T> = Result<T, GradebookError>;

/// Everything that can go wrong in the gradebook services.
///
/// `NotFound` and `Forbidden` stay distinct so callers never have to guess
/// whether a record is missing or merely not theirs.
#[derive(Debug, thiserror::Error)]
pub enum GradebookError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },

    #[error("instructor {instructor_id} does not own course {course_id}")]
    Forbidden { instructor_id: i64, course_id: i64 },

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("cannot move a submission from {from} to {to}")]
    InvalidTransition {
        from: SubmissionStatus,
        to: SubmissionStatus,
    },

    /// A read or write against one of the two submission sources failed.
    #[error("{kind} source unavailable: {error}")]
    SourceUnavailable {
        kind: SourceKind,
        #[source]
        error: DbErr,
    },

    #[error("database error: {0}")]
    Database(#[from] DbErr),
}

impl GradebookError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn source(kind: SourceKind, error: DbErr) -> Self {
        Self::SourceUnavailable { kind, error }
    }

    /// Stable machine-readable code for presentation layers.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "not_found",
            Self::Forbidden { .. } => "forbidden",
            Self::Validation(_) => "validation_failed",
            Self::InvalidTransition { .. } => "invalid_transition",
            Self::SourceUnavailable { .. } => "source_unavailable",
            Self::Database(_) => "database_error",
        }
    }

    /// Only storage failures may succeed on a later attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::SourceUnavailable { .. } | Self::Database(_))
    }

    /// Which submission source failed, when the failure is source-specific.
    pub fn failed_source(&self) -> Option<SourceKind> {
        match self {
            Self::SourceUnavailable { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forbidden_and_not_found_are_terminal_and_distinct() {
        let nf = GradebookError::not_found("course", 7);
        let fb = GradebookError::Forbidden {
            instructor_id: 1,
            course_id: 7,
        };
        assert_ne!(nf.code(), fb.code());
        assert!(!nf.is_retryable());
        assert!(!fb.is_retryable());
        assert_eq!(nf.to_string(), "course 7 not found");
    }

    #[test]
    fn source_failures_name_the_source() {
        let err = GradebookError::source(
            SourceKind::AssignmentSubmission,
            DbErr::Custom("connection reset".into()),
        );
        assert!(err.is_retryable());
        assert_eq!(err.failed_source(), Some(SourceKind::AssignmentSubmission));
        assert!(
            err.to_string()
                .starts_with("assignment_submission source unavailable")
        );
    }
}
