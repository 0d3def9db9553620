//! Persistence seam of the gradebook services.
//!
//! Everything above this module talks to a [`GradebookStore`]; the
//! SQLite-backed [`SeaOrmStore`] is the production implementation and tests
//! may swap in their own.

mod sea_orm_store;

pub use sea_orm_store::SeaOrmStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use db::models::assignment_submission::UploadStatus;
use db::models::{assessment, course, user};
use sea_orm::{DbErr, FromQueryResult};

use crate::filters::{DateRange, SortSpec};
use crate::submission::SubmissionStatus;

/// Source-level predicates. `course_ids` is already narrowed to what the
/// caller may see; an empty list means "nothing", never "everything".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceQuery {
    pub course_ids: Vec<i64>,
    pub status: Option<SubmissionStatus>,
    pub date_range: DateRange,
    /// Ordering the store should return rows in when it can. Callers must
    /// not rely on it; the merge re-sorts.
    pub sort: Option<SortSpec>,
}

/// Rows matching a [`SourceQuery`] plus their count.
#[derive(Debug, Clone, PartialEq)]
pub struct Listing<R> {
    pub rows: Vec<R>,
    pub total: u64,
}

impl<R> Listing<R> {
    pub fn empty() -> Self {
        Self {
            rows: Vec::new(),
            total: 0,
        }
    }
}

/// A quiz attempt joined with its assessment, course and student.
#[derive(Debug, Clone, PartialEq, FromQueryResult)]
pub struct QuizAttemptRecord {
    pub id: i64,
    pub assessment_id: i64,
    pub assessment_title: String,
    pub course_id: i64,
    pub course_title: String,
    pub instructor_id: i64,
    pub student_id: i64,
    pub student_name: String,
    pub student_email: String,
    pub score: Option<f64>,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// An assignment upload joined with its assessment, course and student.
#[derive(Debug, Clone, PartialEq, FromQueryResult)]
pub struct AssignmentSubmissionRecord {
    pub id: i64,
    pub assessment_id: i64,
    pub assessment_title: String,
    pub course_id: i64,
    pub course_title: String,
    pub instructor_id: i64,
    pub student_id: i64,
    pub student_name: String,
    pub student_email: String,
    pub status: UploadStatus,
    pub grade: Option<f64>,
    pub feedback: Option<String>,
    pub file_url: Option<String>,
    pub text_answer: Option<String>,
    pub submitted_at: DateTime<Utc>,
}

#[async_trait]
pub trait GradebookStore: Send + Sync {
    async fn find_course(&self, course_id: i64) -> Result<Option<course::Model>, DbErr>;

    async fn list_owned_course_ids(&self, instructor_id: i64) -> Result<Vec<i64>, DbErr>;

    /// Enrolled students of a course.
    async fn list_roster(&self, course_id: i64) -> Result<Vec<user::Model>, DbErr>;

    /// Assessments of a course in creation order.
    async fn list_assessments(&self, course_id: i64) -> Result<Vec<assessment::Model>, DbErr>;

    async fn count_assessments(&self, course_ids: &[i64]) -> Result<u64, DbErr>;

    /// Distinct students enrolled in any of `course_ids`.
    async fn list_student_ids(&self, course_ids: &[i64]) -> Result<Vec<i64>, DbErr>;

    async fn list_quiz_attempts(
        &self,
        query: &SourceQuery,
    ) -> Result<Listing<QuizAttemptRecord>, DbErr>;

    async fn list_assignment_submissions(
        &self,
        query: &SourceQuery,
    ) -> Result<Listing<AssignmentSubmissionRecord>, DbErr>;

    async fn find_quiz_attempt(&self, id: i64) -> Result<Option<QuizAttemptRecord>, DbErr>;

    async fn find_assignment_submission(
        &self,
        id: i64,
    ) -> Result<Option<AssignmentSubmissionRecord>, DbErr>;

    /// Stores an instructor score on a quiz attempt whose status is still
    /// `expected` and returns the reloaded row. `None` means the attempt has
    /// moved on since it was read.
    async fn write_quiz_score(
        &self,
        id: i64,
        expected: SubmissionStatus,
        score: f64,
    ) -> Result<Option<QuizAttemptRecord>, DbErr>;

    /// Stores a review on an upload whose status is still `expected`; same
    /// contract as [`GradebookStore::write_quiz_score`].
    async fn write_assignment_review(
        &self,
        id: i64,
        expected: SubmissionStatus,
        status: UploadStatus,
        grade: Option<f64>,
        feedback: Option<String>,
    ) -> Result<Option<AssignmentSubmissionRecord>, DbErr>;
}
