use async_trait::async_trait;
use db::models::assignment_submission::UploadStatus;
use log::warn;

use super::{InstructorScope, LocatedSubmission, SourceAdapter, source_query, superseded};
use crate::error::{GradebookError, GradebookResult};
use crate::filters::{SortSpec, SubmissionFilter};
use crate::store::{AssignmentSubmissionRecord, GradebookStore};
use crate::submission::{CanonicalSubmission, SourceKind, SubmissionRef, SubmissionStatus};

/// Manually graded assignment uploads.
pub struct AssignmentSubmissionAdapter<'a, S: ?Sized> {
    store: &'a S,
}

impl<'a, S: GradebookStore + ?Sized> AssignmentSubmissionAdapter<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }
}

/// Native status mapped 1:1, except that a `graded` row missing its grade
/// is still waiting for review.
pub fn status_of(record: &AssignmentSubmissionRecord) -> SubmissionStatus {
    match record.status {
        UploadStatus::Submitted => SubmissionStatus::Pending,
        UploadStatus::Graded if record.grade.is_none() => SubmissionStatus::Pending,
        UploadStatus::Graded => SubmissionStatus::Graded,
        UploadStatus::Returned => SubmissionStatus::Rejected,
        UploadStatus::RevisionRequested => SubmissionStatus::RevisionRequested,
    }
}

/// Native status a canonical review target is stored as.
pub fn upload_status_for(status: SubmissionStatus) -> UploadStatus {
    match status {
        SubmissionStatus::Pending => UploadStatus::Submitted,
        SubmissionStatus::Graded => UploadStatus::Graded,
        SubmissionStatus::Rejected => UploadStatus::Returned,
        SubmissionStatus::RevisionRequested => UploadStatus::RevisionRequested,
    }
}

pub fn normalize(record: AssignmentSubmissionRecord) -> CanonicalSubmission {
    let status = status_of(&record);
    if record.status == UploadStatus::Graded && status == SubmissionStatus::Pending {
        warn!(
            "Assignment submission {} is marked graded but has no grade; treating it as pending",
            record.id
        );
    }
    let grade = match status {
        SubmissionStatus::Graded => record.grade,
        _ => None,
    };

    CanonicalSubmission {
        id: SubmissionRef::assignment_submission(record.id),
        source_kind: SourceKind::AssignmentSubmission,
        student_id: record.student_id,
        student_name: record.student_name,
        student_email: record.student_email,
        course_id: record.course_id,
        course_title: record.course_title,
        assignment_id: record.assessment_id,
        assignment_title: record.assessment_title,
        submitted_at: record.submitted_at,
        status,
        grade,
        feedback: record.feedback,
        attachment_ref: record.file_url,
        text_answer: record.text_answer,
    }
}

#[async_trait]
impl<S: GradebookStore + ?Sized> SourceAdapter for AssignmentSubmissionAdapter<'_, S> {
    const KIND: SourceKind = SourceKind::AssignmentSubmission;

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
            .list_assignment_submissions(&query)
            .await
            .map_err(|e| GradebookError::source(Self::KIND, e))?;

        let rows = listing.rows.into_iter().map(normalize).collect();
        Ok((rows, listing.total))
    }

    async fn find(&self, record_id: i64) -> GradebookResult<Option<LocatedSubmission>> {
        let record = self
            .store
            .find_assignment_submission(record_id)
            .await
            .map_err(|e| GradebookError::source(Self::KIND, e))?;

        Ok(record.map(|r| LocatedSubmission {
            instructor_id: r.instructor_id,
            finished: true,
            submission: normalize(r),
        }))
    }

    async fn write_grade(
        &self,
        record_id: i64,
        expected: SubmissionStatus,
        status: SubmissionStatus,
        score: Option<f64>,
        feedback: Option<String>,
    ) -> GradebookResult<CanonicalSubmission> {
        let grade = match status {
            SubmissionStatus::Graded => score,
            _ => None,
        };

        let written = self
            .store
            .write_assignment_review(
                record_id,
                expected,
                upload_status_for(status),
                grade,
                feedback,
            )
            .await
            .map_err(|e| GradebookError::source(Self::KIND, e))?;
        match written {
            Some(record) => Ok(normalize(record)),
            None => Err(superseded(self, record_id, status).await),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn record(status: UploadStatus, grade: Option<f64>) -> AssignmentSubmissionRecord {
        AssignmentSubmissionRecord {
            id: 8,
            assessment_id: 4,
            assessment_title: "Essay".into(),
            course_id: 1,
            course_title: "Writing".into(),
            instructor_id: 9,
            student_id: 3,
            student_name: "Ada".into(),
            student_email: "ada@example.com".into(),
            status,
            grade,
            feedback: Some("see notes".into()),
            file_url: Some("uploads/8/essay.pdf".into()),
            text_answer: None,
            submitted_at: Utc.with_ymd_and_hms(2025, 3, 2, 10, 0, 0).unwrap(),
        }
    }

    #[test]
    fn native_statuses_map_onto_canonical_ones() {
        use SubmissionStatus::*;
        let cases = [
            (UploadStatus::Submitted, None, Pending),
            (UploadStatus::Graded, Some(88.0), Graded),
            (UploadStatus::Returned, None, Rejected),
            (UploadStatus::RevisionRequested, None, RevisionRequested),
        ];
        for (native, grade, expected) in cases {
            assert_eq!(normalize(record(native, grade)).status, expected, "{native}");
        }
    }

    #[test]
    fn grade_is_kept_only_when_graded() {
        let graded = normalize(record(UploadStatus::Graded, Some(88.0)));
        assert_eq!(graded.grade, Some(88.0));

        let returned = normalize(record(UploadStatus::Returned, Some(30.0)));
        assert_eq!(returned.grade, None);

        let missing = normalize(record(UploadStatus::Graded, None));
        assert_eq!(missing.status, SubmissionStatus::Pending);
        assert_eq!(missing.grade, None);
    }

    #[test]
    fn upload_fields_carry_through() {
        let s = normalize(record(UploadStatus::Submitted, None));
        assert_eq!(s.id, SubmissionRef::assignment_submission(8));
        assert_eq!(s.attachment_ref.as_deref(), Some("uploads/8/essay.pdf"));
        assert_eq!(s.feedback.as_deref(), Some("see notes"));
        assert_eq!(s.submitted_at, Utc.with_ymd_and_hms(2025, 3, 2, 10, 0, 0).unwrap());
    }
}
