use async_trait::async_trait;
use db::models::assignment_submission::{self, UploadStatus};
use db::models::{assessment, course, enrollment, quiz_attempt, user};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait, JoinType, Order,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Select,
};

use super::{
    AssignmentSubmissionRecord, GradebookStore, Listing, QuizAttemptRecord, SourceQuery,
};
use crate::filters::{DateRange, SortDirection, SortKey};
use crate::submission::SubmissionStatus;

const QUIZ_SUBMITTED_AT: &str = "COALESCE(quiz_attempts.completed_at, quiz_attempts.started_at)";

/// [`GradebookStore`] over the SQLite schema in the `db` crate.
#[derive(Clone)]
pub struct SeaOrmStore {
    db: DatabaseConnection,
}

impl SeaOrmStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn order(direction: SortDirection) -> Order {
    match direction {
        SortDirection::Asc => Order::Asc,
        SortDirection::Desc => Order::Desc,
    }
}

fn quiz_attempts_joined() -> Select<quiz_attempt::Entity> {
    quiz_attempt::Entity::find()
        .join(JoinType::InnerJoin, quiz_attempt::Relation::Assessment.def())
        .join(JoinType::InnerJoin, assessment::Relation::Course.def())
        .join(JoinType::InnerJoin, quiz_attempt::Relation::Student.def())
}

fn quiz_attempt_columns(select: Select<quiz_attempt::Entity>) -> Select<quiz_attempt::Entity> {
    select
        .select_only()
        .column_as(quiz_attempt::Column::Id, "id")
        .column_as(quiz_attempt::Column::AssessmentId, "assessment_id")
        .column_as(assessment::Column::Title, "assessment_title")
        .column_as(course::Column::Id, "course_id")
        .column_as(course::Column::Title, "course_title")
        .column_as(course::Column::InstructorId, "instructor_id")
        .column_as(quiz_attempt::Column::StudentId, "student_id")
        .column_as(user::Column::FullName, "student_name")
        .column_as(user::Column::Email, "student_email")
        .column_as(quiz_attempt::Column::Score, "score")
        .column_as(quiz_attempt::Column::StartedAt, "started_at")
        .column_as(quiz_attempt::Column::CompletedAt, "completed_at")
}

/// A finished attempt is dated by completion, an open one by its start.
fn quiz_time_within(range: &DateRange) -> Condition {
    let mut finished = Condition::all().add(quiz_attempt::Column::CompletedAt.is_not_null());
    let mut open = Condition::all().add(quiz_attempt::Column::CompletedAt.is_null());
    if let Some(from) = range.from {
        finished = finished.add(quiz_attempt::Column::CompletedAt.gte(from));
        open = open.add(quiz_attempt::Column::StartedAt.gte(from));
    }
    if let Some(to) = range.to {
        finished = finished.add(quiz_attempt::Column::CompletedAt.lte(to));
        open = open.add(quiz_attempt::Column::StartedAt.lte(to));
    }
    Condition::any().add(finished).add(open)
}

fn quiz_status(status: SubmissionStatus) -> Option<Condition> {
    match status {
        SubmissionStatus::Graded => Some(
            Condition::all()
                .add(quiz_attempt::Column::Score.is_not_null())
                .add(quiz_attempt::Column::CompletedAt.is_not_null()),
        ),
        SubmissionStatus::Pending => Some(
            Condition::any()
                .add(quiz_attempt::Column::Score.is_null())
                .add(quiz_attempt::Column::CompletedAt.is_null()),
        ),
        SubmissionStatus::Rejected | SubmissionStatus::RevisionRequested => None,
    }
}

fn assignment_submissions_joined() -> Select<assignment_submission::Entity> {
    assignment_submission::Entity::find()
        .join(
            JoinType::InnerJoin,
            assignment_submission::Relation::Assessment.def(),
        )
        .join(JoinType::InnerJoin, assessment::Relation::Course.def())
        .join(
            JoinType::InnerJoin,
            assignment_submission::Relation::Student.def(),
        )
}

fn assignment_submission_columns(
    select: Select<assignment_submission::Entity>,
) -> Select<assignment_submission::Entity> {
    use assignment_submission::Column as Col;

    select
        .select_only()
        .column_as(Col::Id, "id")
        .column_as(Col::AssessmentId, "assessment_id")
        .column_as(assessment::Column::Title, "assessment_title")
        .column_as(course::Column::Id, "course_id")
        .column_as(course::Column::Title, "course_title")
        .column_as(course::Column::InstructorId, "instructor_id")
        .column_as(Col::StudentId, "student_id")
        .column_as(user::Column::FullName, "student_name")
        .column_as(user::Column::Email, "student_email")
        .column_as(Col::Status, "status")
        .column_as(Col::Grade, "grade")
        .column_as(Col::Feedback, "feedback")
        .column_as(Col::FileUrl, "file_url")
        .column_as(Col::TextAnswer, "text_answer")
        .column_as(Col::SubmittedAt, "submitted_at")
}

/// Native predicates that normalize to `status`. A `graded` row without a
/// grade surfaces as pending.
fn assignment_status(status: SubmissionStatus) -> Condition {
    use assignment_submission::Column as Col;

    match status {
        SubmissionStatus::Graded => Condition::all()
            .add(Col::Status.eq(UploadStatus::Graded))
            .add(Col::Grade.is_not_null()),
        SubmissionStatus::Pending => Condition::any()
            .add(Col::Status.eq(UploadStatus::Submitted))
            .add(
                Condition::all()
                    .add(Col::Status.eq(UploadStatus::Graded))
                    .add(Col::Grade.is_null()),
            ),
        SubmissionStatus::Rejected => Condition::all().add(Col::Status.eq(UploadStatus::Returned)),
        SubmissionStatus::RevisionRequested => {
            Condition::all().add(Col::Status.eq(UploadStatus::RevisionRequested))
        }
    }
}

#[async_trait]
impl GradebookStore for SeaOrmStore {
    async fn find_course(&self, course_id: i64) -> Result<Option<course::Model>, DbErr> {
        course::Model::get_by_id(&self.db, course_id).await
    }

    async fn list_owned_course_ids(&self, instructor_id: i64) -> Result<Vec<i64>, DbErr> {
        course::Model::ids_owned_by(&self.db, instructor_id).await
    }

    async fn list_roster(&self, course_id: i64) -> Result<Vec<user::Model>, DbErr> {
        enrollment::Model::roster(&self.db, course_id).await
    }

    async fn list_assessments(&self, course_id: i64) -> Result<Vec<assessment::Model>, DbErr> {
        assessment::Model::for_course(&self.db, course_id).await
    }

    async fn count_assessments(&self, course_ids: &[i64]) -> Result<u64, DbErr> {
        if course_ids.is_empty() {
            return Ok(0);
        }
        assessment::Entity::find()
            .filter(assessment::Column::CourseId.is_in(course_ids.iter().copied()))
            .count(&self.db)
            .await
    }

    async fn list_student_ids(&self, course_ids: &[i64]) -> Result<Vec<i64>, DbErr> {
        enrollment::Model::distinct_student_ids(&self.db, course_ids).await
    }

    async fn list_quiz_attempts(
        &self,
        query: &SourceQuery,
    ) -> Result<Listing<QuizAttemptRecord>, DbErr> {
        if query.course_ids.is_empty() {
            return Ok(Listing::empty());
        }

        let mut condition =
            Condition::all().add(course::Column::Id.is_in(query.course_ids.iter().copied()));
        if let Some(status) = query.status {
            match quiz_status(status) {
                Some(c) => condition = condition.add(c),
                None => return Ok(Listing::empty()),
            }
        }
        if query.date_range != DateRange::default() {
            condition = condition.add(quiz_time_within(&query.date_range));
        }

        let mut select = quiz_attempts_joined().filter(condition);
        let total = select.clone().count(&self.db).await?;

        select = match query.sort {
            Some(sort) => match sort.key {
                SortKey::StudentName => select.order_by(user::Column::FullName, order(sort.direction)),
                SortKey::Grade => select.order_by(quiz_attempt::Column::Score, order(sort.direction)),
                SortKey::SubmittedAt => {
                    select.order_by(Expr::cust(QUIZ_SUBMITTED_AT), order(sort.direction))
                }
                SortKey::Status => select,
            },
            None => select,
        };
        let rows = quiz_attempt_columns(select)
            .order_by(Expr::cust(QUIZ_SUBMITTED_AT), Order::Desc)
            .order_by_asc(quiz_attempt::Column::Id)
            .into_model::<QuizAttemptRecord>()
            .all(&self.db)
            .await?;

        Ok(Listing { rows, total })
    }

    async fn list_assignment_submissions(
        &self,
        query: &SourceQuery,
    ) -> Result<Listing<AssignmentSubmissionRecord>, DbErr> {
        use assignment_submission::Column as Col;

        if query.course_ids.is_empty() {
            return Ok(Listing::empty());
        }

        let mut condition =
            Condition::all().add(course::Column::Id.is_in(query.course_ids.iter().copied()));
        if let Some(status) = query.status {
            condition = condition.add(assignment_status(status));
        }
        if let Some(from) = query.date_range.from {
            condition = condition.add(Col::SubmittedAt.gte(from));
        }
        if let Some(to) = query.date_range.to {
            condition = condition.add(Col::SubmittedAt.lte(to));
        }

        let mut select = assignment_submissions_joined().filter(condition);
        let total = select.clone().count(&self.db).await?;

        select = match query.sort {
            Some(sort) => match sort.key {
                SortKey::StudentName => select.order_by(user::Column::FullName, order(sort.direction)),
                SortKey::Grade => select.order_by(Col::Grade, order(sort.direction)),
                SortKey::SubmittedAt => select.order_by(Col::SubmittedAt, order(sort.direction)),
                SortKey::Status => select,
            },
            None => select,
        };
        let rows = assignment_submission_columns(select)
            .order_by_desc(Col::SubmittedAt)
            .order_by_asc(Col::Id)
            .into_model::<AssignmentSubmissionRecord>()
            .all(&self.db)
            .await?;

        Ok(Listing { rows, total })
    }

    async fn find_quiz_attempt(&self, id: i64) -> Result<Option<QuizAttemptRecord>, DbErr> {
        quiz_attempt_columns(quiz_attempts_joined().filter(quiz_attempt::Column::Id.eq(id)))
            .into_model::<QuizAttemptRecord>()
            .one(&self.db)
            .await
    }

    async fn find_assignment_submission(
        &self,
        id: i64,
    ) -> Result<Option<AssignmentSubmissionRecord>, DbErr> {
        assignment_submission_columns(
            assignment_submissions_joined().filter(assignment_submission::Column::Id.eq(id)),
        )
        .into_model::<AssignmentSubmissionRecord>()
        .one(&self.db)
        .await
    }

    async fn write_quiz_score(
        &self,
        id: i64,
        expected: SubmissionStatus,
        score: f64,
    ) -> Result<Option<QuizAttemptRecord>, DbErr> {
        let Some(guard) = quiz_status(expected) else {
            return Ok(None);
        };
        if quiz_attempt::Model::set_score(&self.db, id, score, guard)
            .await?
            .is_none()
        {
            return Ok(None);
        }
        self.find_quiz_attempt(id).await
    }

    async fn write_assignment_review(
        &self,
        id: i64,
        expected: SubmissionStatus,
        status: UploadStatus,
        grade: Option<f64>,
        feedback: Option<String>,
    ) -> Result<Option<AssignmentSubmissionRecord>, DbErr> {
        let written = assignment_submission::Model::record_review_if(
            &self.db,
            id,
            assignment_status(expected),
            status,
            grade,
            feedback,
        )
        .await?;
        if written.is_none() {
            return Ok(None);
        }
        self.find_assignment_submission(id).await
    }
}
