use crate::seed::Seeder;
use crate::seeds::INSTRUCTOR_PREFIX;
use db::models::{course, user};
use sea_orm::{ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter};

pub struct CourseSeeder;

const TITLES: [&str; 8] = [
    "Advanced Algorithms",
    "Distributed Systems",
    "Computer Graphics",
    "Operating Systems",
    "AI Fundamentals",
    "Software Engineering",
    "Functional Programming",
    "Compiler Construction",
];

#[async_trait::async_trait]
impl Seeder for CourseSeeder {
    async fn seed(&self, db: &DatabaseConnection) -> Result<(), DbErr> {
        let instructors = user::Entity::find()
            .filter(user::Column::Username.starts_with(INSTRUCTOR_PREFIX))
            .all(db)
            .await?;
        if instructors.is_empty() {
            return Err(DbErr::Custom("no instructors to own courses".into()));
        }

        for (i, title) in TITLES.iter().enumerate() {
            let owner = &instructors[i % instructors.len()];
            let code = format!("COS{}", 100 * (i % 3 + 1) + i);
            course::Model::create(db, &code, title, fastrand::i32(2023..=2025), owner.id).await?;
        }
        Ok(())
    }
}
