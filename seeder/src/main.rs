use common::config::AppConfig;
use common::logger::init_logger;

use crate::seed::{Seeder, run_seeder};
use crate::seeds::{
    assessment::AssessmentSeeder, assignment_submission::AssignmentSubmissionSeeder,
    course::CourseSeeder, enrollment::EnrollmentSeeder, quiz_attempt::QuizAttemptSeeder,
    user::UserSeeder,
};

mod seed;
mod seeds;

#[tokio::main]
async fn main() {
    let config = AppConfig::global().clone();
    if let Err(e) = init_logger(&config.log_level, &config.log_file, config.log_to_stdout) {
        eprintln!("Failed to initialise logger: {e}");
    }
    log::info!(
        "Seeding {} ({}) at {}",
        config.project_name,
        config.env,
        config.database_path
    );

    let db = match db::connect().await {
        Ok(db) => db,
        Err(e) => {
            eprintln!("Failed to connect to {}: {e}", config.database_path);
            std::process::exit(1);
        }
    };

    for (seeder, name) in [
        (Box::new(UserSeeder) as Box<dyn Seeder + Send + Sync>, "User"),
        (Box::new(CourseSeeder), "Course"),
        (Box::new(EnrollmentSeeder), "Enrollment"),
        (Box::new(AssessmentSeeder), "Assessment"),
        (Box::new(QuizAttemptSeeder), "QuizAttempt"),
        (Box::new(AssignmentSubmissionSeeder), "AssignmentSubmission"),
    ] {
        run_seeder(&*seeder, name, &db).await;
    }
}
