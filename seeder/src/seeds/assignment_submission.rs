use crate::seed::Seeder;
use chrono::{Duration, Utc};
use db::models::assessment::{self, AssessmentKind};
use db::models::assignment_submission::{Model, UploadStatus};
use db::models::enrollment;
use fake::{Fake, faker::lorem::en::Sentence};
use sea_orm::{ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter};

pub struct AssignmentSubmissionSeeder;

#[async_trait::async_trait]
impl Seeder for AssignmentSubmissionSeeder {
    async fn seed(&self, db: &DatabaseConnection) -> Result<(), DbErr> {
        let assignments = assessment::Entity::find()
            .filter(assessment::Column::Kind.eq(AssessmentKind::Assignment))
            .all(db)
            .await?;

        for assignment in &assignments {
            let roster = enrollment::Model::roster(db, assignment.course_id).await?;
            for student in &roster {
                if fastrand::u8(..10) < 3 {
                    continue;
                }

                let submitted_at = Utc::now() - Duration::hours(fastrand::i64(1..24 * 30));
                let (file_url, text_answer) = if fastrand::bool() {
                    (Some(format!("uploads/{}/{}/submission.zip", assignment.id, student.id)), None)
                } else {
                    (None, Some(Sentence(5..15).fake::<String>()))
                };
                let submission = Model::create(
                    db,
                    assignment.id,
                    student.id,
                    file_url.as_deref(),
                    text_answer.as_deref(),
                    submitted_at,
                )
                .await?;

                let (status, grade) = match fastrand::u8(..10) {
                    0..=3 => continue,
                    4..=7 => (UploadStatus::Graded, Some(f64::from(fastrand::u8(30..=100)))),
                    8 => (UploadStatus::Returned, None),
                    _ => (UploadStatus::RevisionRequested, None),
                };
                let feedback = Some(Sentence(3..8).fake::<String>());
                Model::record_review(db, submission.id, status, grade, feedback).await?;
            }
        }
        Ok(())
    }
}
