use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, DbErr, EntityTrait, JoinType, QueryFilter, QueryOrder,
    QuerySelect, Set,
};

use super::user;

/// Student membership of a course.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "enrollments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: i64,
    #[sea_orm(primary_key, auto_increment = false)]
    pub course_id: i64,
    pub enrolled_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,

    #[sea_orm(
        belongs_to = "super::course::Entity",
        from = "Column::CourseId",
        to = "super::course::Column::Id"
    )]
    Course,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::course::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Course.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub async fn enroll(
        db: &DatabaseConnection,
        user_id: i64,
        course_id: i64,
    ) -> Result<Self, DbErr> {
        let active = ActiveModel {
            user_id: Set(user_id),
            course_id: Set(course_id),
            enrolled_at: Set(Utc::now()),
        };
        active.insert(db).await
    }

    /// Enrolled students of a course, ordered by name then id.
    pub async fn roster(
        db: &DatabaseConnection,
        course_id: i64,
    ) -> Result<Vec<user::Model>, DbErr> {
        user::Entity::find()
            .join(JoinType::InnerJoin, user::Relation::Enrollment.def())
            .filter(Column::CourseId.eq(course_id))
            .order_by_asc(user::Column::FullName)
            .order_by_asc(user::Column::Id)
            .all(db)
            .await
    }

    /// Distinct students enrolled in any of `course_ids`.
    pub async fn distinct_student_ids(
        db: &DatabaseConnection,
        course_ids: &[i64],
    ) -> Result<Vec<i64>, DbErr> {
        if course_ids.is_empty() {
            return Ok(Vec::new());
        }
        Entity::find()
            .select_only()
            .column(Column::UserId)
            .distinct()
            .filter(Column::CourseId.is_in(course_ids.iter().copied()))
            .order_by_asc(Column::UserId)
            .into_tuple::<i64>()
            .all(db)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::course;
    use crate::test_utils::setup_test_db;

    #[tokio::test]
    async fn roster_is_sorted_by_name_and_scoped_to_course() {
        let db = setup_test_db().await;
        let teacher = user::Model::create(&db, "t", "Teacher", "t@example.com").await.unwrap();
        let zed = user::Model::create(&db, "s1", "Zed", "zed@example.com").await.unwrap();
        let amy = user::Model::create(&db, "s2", "Amy", "amy@example.com").await.unwrap();
        let other = user::Model::create(&db, "s3", "Other", "o@example.com").await.unwrap();

        let c1 = course::Model::create(&db, "C1", "One", 2025, teacher.id).await.unwrap();
        let c2 = course::Model::create(&db, "C2", "Two", 2025, teacher.id).await.unwrap();

        Model::enroll(&db, zed.id, c1.id).await.unwrap();
        Model::enroll(&db, amy.id, c1.id).await.unwrap();
        Model::enroll(&db, other.id, c2.id).await.unwrap();
        Model::enroll(&db, amy.id, c2.id).await.unwrap();

        let roster = Model::roster(&db, c1.id).await.unwrap();
        let names: Vec<_> = roster.iter().map(|u| u.full_name.as_str()).collect();
        assert_eq!(names, vec!["Amy", "Zed"]);

        let distinct = Model::distinct_student_ids(&db, &[c1.id, c2.id]).await.unwrap();
        assert_eq!(distinct.len(), 3);
        assert!(Model::distinct_student_ids(&db, &[]).await.unwrap().is_empty());
    }
}
