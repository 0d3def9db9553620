use crate::seed::Seeder;
use crate::seeds::INSTRUCTOR_PREFIX;
use db::models::{course, enrollment, user};
use sea_orm::{ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter};

pub struct EnrollmentSeeder;

#[async_trait::async_trait]
impl Seeder for EnrollmentSeeder {
    async fn seed(&self, db: &DatabaseConnection) -> Result<(), DbErr> {
        let courses = course::Entity::find().all(db).await?;
        let students = user::Entity::find()
            .filter(user::Column::Username.not_like(format!("{INSTRUCTOR_PREFIX}%")))
            .all(db)
            .await?;

        for course in &courses {
            for student in &students {
                // Roughly half of the students take each course
                if fastrand::bool() {
                    enrollment::Model::enroll(db, student.id, course.id).await?;
                }
            }
        }
        Ok(())
    }
}
