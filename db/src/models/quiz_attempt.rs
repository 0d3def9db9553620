use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{
    ActiveModelTrait, Condition, DatabaseConnection, DbErr, EntityTrait, IntoActiveModel,
    QueryFilter, Set,
};

/// One student's attempt at an autograded quiz or exam.
///
/// `score` is written by the autograder (or an instructor override) on the
/// 0-100 scale; an attempt without `completed_at` is still in progress.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "quiz_attempts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub assessment_id: i64,
    pub student_id: i64,
    pub score: Option<f64>,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
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
    pub async fn start(
        db: &DatabaseConnection,
        assessment_id: i64,
        student_id: i64,
        started_at: DateTime<Utc>,
    ) -> Result<Self, DbErr> {
        let active = ActiveModel {
            assessment_id: Set(assessment_id),
            student_id: Set(student_id),
            score: Set(None),
            started_at: Set(started_at),
            completed_at: Set(None),
            updated_at: Set(Utc::now()),
            ..Default::default()
        };
        active.insert(db).await
    }

    /// Marks the attempt finished, optionally with the autograder's score.
    pub async fn complete(
        db: &DatabaseConnection,
        id: i64,
        completed_at: DateTime<Utc>,
        score: Option<f64>,
    ) -> Result<Self, DbErr> {
        let Some(attempt) = Self::get_by_id(db, id).await? else {
            return Err(DbErr::RecordNotFound(format!("Quiz attempt {id} not found")));
        };

        let mut active = attempt.into_active_model();
        active.completed_at = Set(Some(completed_at));
        active.score = Set(score);
        active.updated_at = Set(Utc::now());
        active.update(db).await
    }

    /// Overwrites the recorded score if the row still matches `guard`.
    ///
    /// Returns `Ok(None)` when the attempt exists but no longer matches.
    pub async fn set_score(
        db: &DatabaseConnection,
        id: i64,
        score: f64,
        guard: Condition,
    ) -> Result<Option<Self>, DbErr> {
        let Some(attempt) = Self::get_by_id(db, id).await? else {
            return Err(DbErr::RecordNotFound(format!("Quiz attempt {id} not found")));
        };

        let mut active = attempt.into_active_model();
        active.score = Set(Some(score));
        active.updated_at = Set(Utc::now());
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
