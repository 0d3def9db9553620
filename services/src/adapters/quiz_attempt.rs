use async_trait::async_trait;

use super::{InstructorScope, LocatedSubmission, SourceAdapter, source_query, superseded};
use crate::error::{GradebookError, GradebookResult};
use crate::filters::{SortSpec, SubmissionFilter};
use crate::store::{GradebookStore, QuizAttemptRecord};
use crate::submission::{CanonicalSubmission, SourceKind, SubmissionRef, SubmissionStatus};

/// Autograded quiz and exam attempts.
pub struct QuizAttemptAdapter<'a, S: ?Sized> {
    store: &'a S,
}

impl<'a, S: GradebookStore + ?Sized> QuizAttemptAdapter<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }
}

/// An attempt is graded once it is finished and carries a score.
pub fn status_of(record: &QuizAttemptRecord) -> SubmissionStatus {
    if record.score.is_some() && record.completed_at.is_some() {
        SubmissionStatus::Graded
    } else {
        SubmissionStatus::Pending
    }
}

pub fn normalize(record: QuizAttemptRecord) -> CanonicalSubmission {
    let status = status_of(&record);
    let grade = match status {
        SubmissionStatus::Graded => record.score,
        _ => None,
    };

    CanonicalSubmission {
        id: SubmissionRef::quiz_attempt(record.id),
        source_kind: SourceKind::QuizAttempt,
        student_id: record.student_id,
        student_name: record.student_name,
        student_email: record.student_email,
        course_id: record.course_id,
        course_title: record.course_title,
        assignment_id: record.assessment_id,
        assignment_title: record.assessment_title,
        submitted_at: record.completed_at.unwrap_or(record.started_at),
        status,
        grade,
        feedback: None,
        attachment_ref: None,
        text_answer: None,
    }
}

#[async_trait]
impl<S: GradebookStore + ?Sized> SourceAdapter for QuizAttemptAdapter<'_, S> {
    const KIND: SourceKind = SourceKind::QuizAttempt;

    async fn fetch(
        &self,
        filter: &SubmissionFilter,
        sort_hint: Option<SortSpec>,
        scope: &InstructorScope,
    ) -> GradebookResult<(Vec<CanonicalSubmission>, u64)> {
        let Some(query) = source_query(Self::KIND, filter, sort_hint, scope) else {
            return Ok((Vec::new(), 0));
        };

        let listing = self
            .store
            .list_quiz_attempts(&query)
            .await
            .map_err(|e| GradebookError::source(Self::KIND, e))?;

        let rows = listing.rows.into_iter().map(normalize).collect();
        Ok((rows, listing.total))
    }

    async fn find(&self, record_id: i64) -> GradebookResult<Option<LocatedSubmission>> {
        let record = self
            .store
            .find_quiz_attempt(record_id)
            .await
            .map_err(|e| GradebookError::source(Self::KIND, e))?;

        Ok(record.map(|r| LocatedSubmission {
            instructor_id: r.instructor_id,
            finished: r.completed_at.is_some(),
            submission: normalize(r),
        }))
    }

    /// Only a score can be written; feedback has nowhere to go.
    async fn write_grade(
        &self,
        record_id: i64,
        expected: SubmissionStatus,
        status: SubmissionStatus,
        score: Option<f64>,
        _feedback: Option<String>,
    ) -> GradebookResult<CanonicalSubmission> {
        let (SubmissionStatus::Graded, Some(score)) = (status, score) else {
            return Err(GradebookError::validation(
                "quiz attempts can only be graded with a score",
            ));
        };

        let written = self
            .store
            .write_quiz_score(record_id, expected, score)
            .await
            .map_err(|e| GradebookError::source(Self::KIND, e))?;
        match written {
            Some(record) => Ok(normalize(record)),
            None => Err(superseded(self, record_id, status).await),
        }
    }
}
