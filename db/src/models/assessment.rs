use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// What kind of work an assessment collects.
///
/// Quizzes and exams are autograded and produce quiz attempts; assignments
/// collect uploads that an instructor grades by hand.
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
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "assessment_kind_enum")]
pub enum AssessmentKind {
    #[sea_orm(string_value = "quiz")]
    Quiz,
    #[sea_orm(string_value = "exam")]
    Exam,
    #[sea_orm(string_value = "assignment")]
    Assignment,
}

impl AssessmentKind {
    /// Whether submissions for this kind are stored as quiz attempts.
    pub fn is_autograded(self) -> bool {
        matches!(self, AssessmentKind::Quiz | AssessmentKind::Exam)
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "assessments")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub course_id: i64,
    pub title: String,
    pub kind: AssessmentKind,
    /// Minimum score (0-100) counted as a pass.
    pub passing_score: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::course::Entity",
        from = "Column::CourseId",
        to = "super::course::Column::Id"
    )]
    Course,
}

impl Related<super::course::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Course.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub async fn create(
        db: &DatabaseConnection,
        course_id: i64,
        title: &str,
        kind: AssessmentKind,
        passing_score: f64,
    ) -> Result<Self, DbErr> {
        let now = Utc::now();
        let active = ActiveModel {
            course_id: Set(course_id),
            title: Set(title.to_owned()),
            kind: Set(kind),
            passing_score: Set(passing_score),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        active.insert(db).await
    }

    pub async fn get_by_id(db: &DatabaseConnection, id: i64) -> Result<Option<Self>, DbErr> {
        Entity::find_by_id(id).one(db).await
    }

    /// Assessments of a course in creation order.
    pub async fn for_course(
        db: &DatabaseConnection,
        course_id: i64,
    ) -> Result<Vec<Self>, DbErr> {
        Entity::find()
            .filter(Column::CourseId.eq(course_id))
            .order_by_asc(Column::CreatedAt)
            .order_by_asc(Column::Id)
            .all(db)
            .await
    }
}
