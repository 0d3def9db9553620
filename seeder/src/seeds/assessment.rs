use crate::seed::Seeder;
use db::models::assessment::{self, AssessmentKind};
use db::models::course;
use sea_orm::{DatabaseConnection, DbErr, EntityTrait};

pub struct AssessmentSeeder;

#[async_trait::async_trait]
impl Seeder for AssessmentSeeder {
    async fn seed(&self, db: &DatabaseConnection) -> Result<(), DbErr> {
        let courses = course::Entity::find().all(db).await?;

        for course in &courses {
            for n in 1..=fastrand::u32(2..=4) {
                assessment::Model::create(
                    db,
                    course.id,
                    &format!("Quiz {n}"),
                    AssessmentKind::Quiz,
                    50.0,
                )
                .await?;
            }
            assessment::Model::create(db, course.id, "Semester Test", AssessmentKind::Exam, 50.0)
                .await?;
            for n in 1..=fastrand::u32(1..=3) {
                assessment::Model::create(
                    db,
                    course.id,
                    &format!("Practical {n}"),
                    AssessmentKind::Assignment,
                    fastrand::choice([40.0, 50.0, 60.0]).unwrap_or(50.0),
                )
                .await?;
            }
        }
        Ok(())
    }
}
