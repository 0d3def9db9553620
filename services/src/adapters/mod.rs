//! One adapter per submission source, each normalizing its native rows into
//! [`CanonicalSubmission`]s.
//!
//! Callers pick the adapter by matching on [`SourceKind`]; there is no
//! dynamic dispatch over sources.

pub mod assignment_submission;
pub mod quiz_attempt;

pub use assignment_submission::AssignmentSubmissionAdapter;
pub use quiz_attempt::QuizAttemptAdapter;

use async_trait::async_trait;

use crate::error::{GradebookError, GradebookResult};
use crate::filters::{SortSpec, SubmissionFilter};
use crate::store::SourceQuery;
use crate::submission::{CanonicalSubmission, SourceKind, SubmissionRef, SubmissionStatus};

/// The courses a caller may see.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstructorScope {
    pub instructor_id: i64,
    pub course_ids: Vec<i64>,
}

impl InstructorScope {
    pub fn new(instructor_id: i64, course_ids: Vec<i64>) -> Self {
        Self {
            instructor_id,
            course_ids,
        }
    }

    /// Owned courses, optionally narrowed to one. A course outside the scope
    /// narrows to nothing.
    pub fn narrowed_to(&self, course_id: Option<i64>) -> Vec<i64> {
        match course_id {
            Some(id) if self.course_ids.contains(&id) => vec![id],
            Some(_) => Vec::new(),
            None => self.course_ids.clone(),
        }
    }
}

/// A submission looked up by id, with what the grading path needs to know
/// about it beyond the canonical view.
#[derive(Debug, Clone, PartialEq)]
pub struct LocatedSubmission {
    pub submission: CanonicalSubmission,
    pub instructor_id: i64,
    /// Whether the student has handed the work in. Always true for uploads.
    pub finished: bool,
}

#[async_trait]
pub trait SourceAdapter: Send + Sync {
    const KIND: SourceKind;

    /// Rows matching `filter` inside `scope`, plus their exact count.
    ///
    /// `filter.search` is not applied here.
    async fn fetch(
        &self,
        filter: &SubmissionFilter,
        sort_hint: Option<SortSpec>,
        scope: &InstructorScope,
    ) -> GradebookResult<(Vec<CanonicalSubmission>, u64)>;

    async fn find(&self, record_id: i64) -> GradebookResult<Option<LocatedSubmission>>;

    /// Writes a review back to the originating record and returns its
    /// post-write canonical form.
    ///
    /// The write only lands while the record still has status `expected`;
    /// otherwise it fails with `InvalidTransition` from the current status.
    async fn write_grade(
        &self,
        record_id: i64,
        expected: SubmissionStatus,
        status: SubmissionStatus,
        score: Option<f64>,
        feedback: Option<String>,
    ) -> GradebookResult<CanonicalSubmission>;
}

/// The error for a guarded write that found the record changed: a transition
/// from whatever status it holds now.
pub(crate) async fn superseded<A: SourceAdapter>(
    adapter: &A,
    record_id: i64,
    to: SubmissionStatus,
) -> GradebookError {
    match adapter.find(record_id).await {
        Ok(Some(located)) => GradebookError::InvalidTransition {
            from: located.submission.status,
            to,
        },
        Ok(None) => GradebookError::not_found(
            "submission",
            SubmissionRef {
                kind: A::KIND,
                record_id,
            },
        ),
        Err(e) => e,
    }
}

/// Builds the store query for one source, or `None` when the source cannot
/// produce any matching row.
pub(crate) fn source_query(
    kind: SourceKind,
    filter: &SubmissionFilter,
    sort_hint: Option<SortSpec>,
    scope: &InstructorScope,
) -> Option<SourceQuery> {
    if filter.status.is_some_and(|s| !s.reachable_by(kind)) {
        return None;
    }
    let course_ids = scope.narrowed_to(filter.course_id);
    if course_ids.is_empty() {
        return None;
    }
    Some(SourceQuery {
        course_ids,
        status: filter.status,
        date_range: filter.date_range(),
        sort: sort_hint,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scope_narrowing_never_widens() {
        let scope = InstructorScope::new(1, vec![10, 11]);
        assert_eq!(scope.narrowed_to(None), vec![10, 11]);
        assert_eq!(scope.narrowed_to(Some(11)), vec![11]);
        assert!(scope.narrowed_to(Some(99)).is_empty());
    }

    #[test]
    fn unreachable_status_skips_the_source() {
        let scope = InstructorScope::new(1, vec![10]);
        let filter = SubmissionFilter::new().with_status(SubmissionStatus::Rejected);
        assert!(source_query(SourceKind::QuizAttempt, &filter, None, &scope).is_none());
        let q = source_query(SourceKind::AssignmentSubmission, &filter, None, &scope).unwrap();
        assert_eq!(q.course_ids, vec![10]);
        assert_eq!(q.status, Some(SubmissionStatus::Rejected));
    }

    #[test]
    fn empty_scope_skips_the_source() {
        let scope = InstructorScope::new(1, Vec::new());
        assert!(
            source_query(SourceKind::AssignmentSubmission, &SubmissionFilter::new(), None, &scope)
                .is_none()
        );
    }
}
