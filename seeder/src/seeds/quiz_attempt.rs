use crate::seed::Seeder;
use chrono::{Duration, Utc};
use db::models::{assessment, enrollment, quiz_attempt};
use sea_orm::{DatabaseConnection, DbErr, EntityTrait};

pub struct QuizAttemptSeeder;

#[async_trait::async_trait]
impl Seeder for QuizAttemptSeeder {
    async fn seed(&self, db: &DatabaseConnection) -> Result<(), DbErr> {
        let assessments = assessment::Entity::find().all(db).await?;

        for assessment in assessments.iter().filter(|a| a.kind.is_autograded()) {
            let roster = enrollment::Model::roster(db, assessment.course_id).await?;
            for student in &roster {
                // Some students never open the quiz
                if fastrand::u8(..10) < 2 {
                    continue;
                }

                let started = Utc::now() - Duration::minutes(fastrand::i64(60..60 * 24 * 30));
                let attempt = quiz_attempt::Model::start(db, assessment.id, student.id, started).await?;

                match fastrand::u8(..10) {
                    // Still in progress
                    0 => {}
                    // Finished, waiting on manual marking
                    1 => {
                        quiz_attempt::Model::complete(
                            db,
                            attempt.id,
                            started + Duration::minutes(45),
                            None,
                        )
                        .await?;
                    }
                    _ => {
                        let score = (fastrand::f64() * 1000.0).round() / 10.0;
                        quiz_attempt::Model::complete(
                            db,
                            attempt.id,
                            started + Duration::minutes(fastrand::i64(10..60)),
                            Some(score),
                        )
                        .await?;
                    }
                }
            }
        }
        Ok(())
    }
}
