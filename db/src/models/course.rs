use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use serde::Serialize;

/// A course owned by exactly one instructor.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "courses")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Short course code, e.g. "COS301".
    pub code: String,
    pub title: String,
    pub year: i32,
    /// The owning instructor (`users.id`).
    pub instructor_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::InstructorId",
        to = "super::user::Column::Id"
    )]
    Instructor,

    #[sea_orm(has_many = "super::assessment::Entity")]
    Assessment,

    #[sea_orm(has_many = "super::enrollment::Entity")]
    Enrollment,
}

impl Related<super::assessment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Assessment.def()
    }
}

impl Related<super::enrollment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Enrollment.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub async fn create(
        db: &DatabaseConnection,
        code: &str,
        title: &str,
        year: i32,
        instructor_id: i64,
    ) -> Result<Self, DbErr> {
        let now = Utc::now();
        let active = ActiveModel {
            code: Set(code.to_owned()),
            title: Set(title.to_owned()),
            year: Set(year),
            instructor_id: Set(instructor_id),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        active.insert(db).await
    }

    pub async fn get_by_id(db: &DatabaseConnection, id: i64) -> Result<Option<Self>, DbErr> {
        Entity::find_by_id(id).one(db).await
    }

    /// IDs of every course the given instructor owns, ascending.
    pub async fn ids_owned_by(
        db: &DatabaseConnection,
        instructor_id: i64,
    ) -> Result<Vec<i64>, DbErr> {
        Entity::find()
            .select_only()
            .column(Column::Id)
            .filter(Column::InstructorId.eq(instructor_id))
            .order_by_asc(Column::Id)
            .into_tuple::<i64>()
            .all(db)
            .await
    }

    pub fn is_owned_by(&self, instructor_id: i64) -> bool {
        self.instructor_id == instructor_id
    }
}
