use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{
    ActiveModelTrait, Condition, DatabaseConnection, DbErr, EntityTrait, IntoActiveModel,
    QueryFilter, Set,
};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Review state of an uploaded assignment, as stored.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    EnumIter,
    DeriveActiveEnum,
    Display,
    EnumString,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "upload_status_enum")]
pub enum UploadStatus {
    /// Uploaded, waiting for an instructor.
    #[sea_orm(string_value = "submitted")]
    Submitted,
    #[sea_orm(string_value = "graded")]
    Graded,
    /// Sent back to the student as unacceptable.
    #[sea_orm(string_value = "returned")]
    Returned,
    #[sea_orm(string_value = "revision_requested")]
    RevisionRequested,
}

impl Default for UploadStatus {
    fn default() -> Self {
        Self::Submitted
    }
}

/// A manually graded assignment upload.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "assignment_submissions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub assessment_id: i64,
    pub student_id: i64,
    pub status: UploadStatus,
    /// Score on the 0-100 scale once graded.
    pub grade: Option<f64>,
    pub feedback: Option<String>,
    /// Reference to the uploaded file in external storage.
    pub file_url: Option<String>,
    pub text_answer: Option<String>,
    pub submitted_at: DateTime<Utc>,
    pub graded_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::assessment::Entity",
        from = "Column::AssessmentId",
        to = "super::assessment::Column::Id"
    )]
    Assessment,

    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::StudentId",
        to = "super::user::Column::Id"
    )]
    Student,
}

impl Related<super::assessment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Assessment.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Student.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub async fn create(
        db: &DatabaseConnection,
        assessment_id: i64,
        student_id: i64,
        file_url: Option<&str>,
        text_answer: Option<&str>,
        submitted_at: DateTime<Utc>,
    ) -> Result<Self, DbErr> {
        let active = ActiveModel {
            assessment_id: Set(assessment_id),
            student_id: Set(student_id),
            status: Set(UploadStatus::Submitted),
            grade: Set(None),
            feedback: Set(None),
            file_url: Set(file_url.map(str::to_owned)),
            text_answer: Set(text_answer.map(str::to_owned)),
            submitted_at: Set(submitted_at),
            graded_at: Set(None),
            updated_at: Set(Utc::now()),
            ..Default::default()
        };
        active.insert(db).await
    }

    /// Records an instructor's review.
    ///
    /// `grade` is stored only for `Graded`; any other status clears it.
    /// `graded_at` tracks the last time a grade was written.
    pub async fn record_review(
        db: &DatabaseConnection,
        id: i64,
        status: UploadStatus,
        grade: Option<f64>,
        feedback: Option<String>,
    ) -> Result<Self, DbErr> {
        Self::record_review_if(db, id, Condition::all(), status, grade, feedback)
            .await?
            .ok_or(DbErr::RecordNotUpdated)
    }

    /// [`Model::record_review`], applied only while the row still matches
    /// `guard`. Returns `Ok(None)` when the upload exists but no longer does.
    pub async fn record_review_if(
        db: &DatabaseConnection,
        id: i64,
        guard: Condition,
        status: UploadStatus,
        grade: Option<f64>,
        feedback: Option<String>,
    ) -> Result<Option<Self>, DbErr> {
        let Some(submission) = Self::get_by_id(db, id).await? else {
            return Err(DbErr::RecordNotFound(format!(
                "Assignment submission {id} not found"
            )));
        };

        let now = Utc::now();
        let mut active = submission.into_active_model();
        active.status = Set(status);
        if status == UploadStatus::Graded {
            active.grade = Set(grade);
            active.graded_at = Set(Some(now));
        } else {
            active.grade = Set(None);
        }
        active.feedback = Set(feedback);
        active.updated_at = Set(now);
        match Entity::update(active).filter(guard).exec(db).await {
            Ok(updated) => Ok(Some(updated)),
            Err(DbErr::RecordNotUpdated) => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub async fn get_by_id(db: &DatabaseConnection, id: i64) -> Result<Option<Self>, DbErr> {
        Entity::find_by_id(id).one(db).await
    }
}
