#![allow(dead_code)]

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use db::models::assessment::AssessmentKind;
use db::models::assignment_submission::UploadStatus;
use db::models::{
    assessment, assignment_submission, course, enrollment, quiz_attempt, user,
};
use db::test_utils::setup_test_db;
use sea_orm::{DatabaseConnection, DbErr};
use services::GradebookService;
use services::submission::SubmissionStatus;
use services::store::{
    AssignmentSubmissionRecord, GradebookStore, Listing, QuizAttemptRecord, SeaOrmStore,
    SourceQuery,
};

pub fn at(day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, day, hour, 0, 0).unwrap()
}

pub async fn user(db: &DatabaseConnection, name: &str) -> user::Model {
    let username = name.to_lowercase().replace(' ', ".");
    let email = format!("{username}@example.com");
    user::Model::create(db, &username, name, &email).await.unwrap()
}

pub async fn course(db: &DatabaseConnection, code: &str, instructor: &user::Model) -> course::Model {
    course::Model::create(db, code, &format!("{code} course"), 2025, instructor.id)
        .await
        .unwrap()
}

pub async fn enroll(db: &DatabaseConnection, course: &course::Model, students: &[&user::Model]) {
    for s in students {
        enrollment::Model::enroll(db, s.id, course.id).await.unwrap();
    }
}

pub async fn quiz(db: &DatabaseConnection, course: &course::Model, title: &str) -> assessment::Model {
    assessment::Model::create(db, course.id, title, AssessmentKind::Quiz, 50.0)
        .await
        .unwrap()
}

pub async fn assignment(
    db: &DatabaseConnection,
    course: &course::Model,
    title: &str,
) -> assessment::Model {
    assessment::Model::create(db, course.id, title, AssessmentKind::Assignment, 50.0)
        .await
        .unwrap()
}

/// A finished attempt, scored when `score` is given.
pub async fn finished_attempt(
    db: &DatabaseConnection,
    quiz: &assessment::Model,
    student: &user::Model,
    finished_at: DateTime<Utc>,
    score: Option<f64>,
) -> quiz_attempt::Model {
    let attempt = quiz_attempt::Model::start(
        db,
        quiz.id,
        student.id,
        finished_at - chrono::Duration::minutes(30),
    )
    .await
    .unwrap();
    quiz_attempt::Model::complete(db, attempt.id, finished_at, score)
        .await
        .unwrap()
}

pub async fn open_attempt(
    db: &DatabaseConnection,
    quiz: &assessment::Model,
    student: &user::Model,
    started_at: DateTime<Utc>,
) -> quiz_attempt::Model {
    quiz_attempt::Model::start(db, quiz.id, student.id, started_at)
        .await
        .unwrap()
}

pub async fn upload(
    db: &DatabaseConnection,
    assignment: &assessment::Model,
    student: &user::Model,
    submitted_at: DateTime<Utc>,
) -> assignment_submission::Model {
    let file_url = format!("uploads/{}/{}.zip", assignment.id, student.id);
    assignment_submission::Model::create(
        db,
        assignment.id,
        student.id,
        Some(file_url.as_str()),
        None,
        submitted_at,
    )
    .await
    .unwrap()
}

pub async fn review(
    db: &DatabaseConnection,
    submission: &assignment_submission::Model,
    status: UploadStatus,
    grade: Option<f64>,
) -> assignment_submission::Model {
    assignment_submission::Model::record_review(db, submission.id, status, grade, None)
        .await
        .unwrap()
}

pub async fn sqlite_service() -> (DatabaseConnection, GradebookService<SeaOrmStore>) {
    let db = setup_test_db().await;
    let service = GradebookService::new(SeaOrmStore::new(db.clone()));
    (db, service)
}

/// Wraps the SQLite store, counting submission reads and writes and
/// failing either source on demand. It can also let another reviewer get
/// in between a grading read and its write.
pub struct ProbeStore {
    inner: SeaOrmStore,
    db: DatabaseConnection,
    competing_review: Mutex<Option<UploadStatus>>,
    fail_quiz_attempts: AtomicBool,
    fail_assignment_submissions: AtomicBool,
    pub submission_reads: AtomicUsize,
    pub writes: AtomicUsize,
}

impl ProbeStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            inner: SeaOrmStore::new(db.clone()),
            db,
            competing_review: Mutex::new(None),
            fail_quiz_attempts: AtomicBool::new(false),
            fail_assignment_submissions: AtomicBool::new(false),
            submission_reads: AtomicUsize::new(0),
            writes: AtomicUsize::new(0),
        }
    }

    pub fn fail_quiz_attempts(&self) {
        self.fail_quiz_attempts.store(true, Ordering::SeqCst);
    }

    pub fn fail_assignment_submissions(&self) {
        self.fail_assignment_submissions.store(true, Ordering::SeqCst);
    }

    /// The next upload review is preceded by another reviewer storing
    /// `status` on the same row.
    pub fn review_concurrently(&self, status: UploadStatus) {
        *self.competing_review.lock().unwrap() = Some(status);
    }

    pub fn reads(&self) -> usize {
        self.submission_reads.load(Ordering::SeqCst)
    }

    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn check(&self, flag: &AtomicBool, what: &str) -> Result<(), DbErr> {
        self.submission_reads.fetch_add(1, Ordering::SeqCst);
        if flag.load(Ordering::SeqCst) {
            return Err(DbErr::Custom(format!("{what} table is unreachable")));
        }
        Ok(())
    }
}

pub async fn probe_service() -> (DatabaseConnection, GradebookService<ProbeStore>) {
    let db = setup_test_db().await;
    let service = GradebookService::new(ProbeStore::new(db.clone()));
    (db, service)
}

#[async_trait]
impl GradebookStore for ProbeStore {
    async fn find_course(&self, course_id: i64) -> Result<Option<course::Model>, DbErr> {
        self.inner.find_course(course_id).await
    }

    async fn list_owned_course_ids(&self, instructor_id: i64) -> Result<Vec<i64>, DbErr> {
        self.inner.list_owned_course_ids(instructor_id).await
    }

    async fn list_roster(&self, course_id: i64) -> Result<Vec<user::Model>, DbErr> {
        self.inner.list_roster(course_id).await
    }

    async fn list_assessments(&self, course_id: i64) -> Result<Vec<assessment::Model>, DbErr> {
        self.inner.list_assessments(course_id).await
    }

    async fn count_assessments(&self, course_ids: &[i64]) -> Result<u64, DbErr> {
        self.inner.count_assessments(course_ids).await
    }

    async fn list_student_ids(&self, course_ids: &[i64]) -> Result<Vec<i64>, DbErr> {
        self.inner.list_student_ids(course_ids).await
    }

    async fn list_quiz_attempts(
        &self,
        query: &SourceQuery,
    ) -> Result<Listing<QuizAttemptRecord>, DbErr> {
        self.check(&self.fail_quiz_attempts, "quiz_attempts")?;
        self.inner.list_quiz_attempts(query).await
    }

    async fn list_assignment_submissions(
        &self,
        query: &SourceQuery,
    ) -> Result<Listing<AssignmentSubmissionRecord>, DbErr> {
        self.check(&self.fail_assignment_submissions, "assignment_submissions")?;
        self.inner.list_assignment_submissions(query).await
    }

    async fn find_quiz_attempt(&self, id: i64) -> Result<Option<QuizAttemptRecord>, DbErr> {
        self.check(&self.fail_quiz_attempts, "quiz_attempts")?;
        self.inner.find_quiz_attempt(id).await
    }

    async fn find_assignment_submission(
        &self,
        id: i64,
    ) -> Result<Option<AssignmentSubmissionRecord>, DbErr> {
        self.check(&self.fail_assignment_submissions, "assignment_submissions")?;
        self.inner.find_assignment_submission(id).await
    }

    async fn write_quiz_score(
        &self,
        id: i64,
        expected: SubmissionStatus,
        score: f64,
    ) -> Result<Option<QuizAttemptRecord>, DbErr> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.write_quiz_score(id, expected, score).await
    }

    async fn write_assignment_review(
        &self,
        id: i64,
        expected: SubmissionStatus,
        status: UploadStatus,
        grade: Option<f64>,
        feedback: Option<String>,
    ) -> Result<Option<AssignmentSubmissionRecord>, DbErr> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        let competing = self.competing_review.lock().unwrap().take();
        if let Some(other) = competing {
            assignment_submission::Model::record_review(&self.db, id, other, None, None).await?;
        }
        self.inner
            .write_assignment_review(id, expected, status, grade, feedback)
            .await
    }
}
