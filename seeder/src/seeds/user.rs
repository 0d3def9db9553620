use crate::seed::Seeder;
use db::models::user::Model;
use fake::{Fake, faker::internet::en::SafeEmail, faker::name::en::Name};
use sea_orm::{DatabaseConnection, DbErr};

pub struct UserSeeder;

#[async_trait::async_trait]
impl Seeder for UserSeeder {
    async fn seed(&self, db: &DatabaseConnection) -> Result<(), DbErr> {
        // Fixed accounts
        Model::create(db, "i0000001", "Default Instructor", "instructor@example.com").await?;
        Model::create(db, "u00000001", "Default Student", "student@example.com").await?;

        for n in 2..=3 {
            let name: String = Name().fake();
            let email = format!("i{n}.{}", SafeEmail().fake::<String>());
            Model::create(db, &format!("i{n:07}"), &name, &email).await?;
        }

        for n in 2..=40 {
            let name: String = Name().fake();
            let email = format!("u{n}.{}", SafeEmail().fake::<String>());
            Model::create(db, &format!("u{n:08}"), &name, &email).await?;
        }
        Ok(())
    }
}
