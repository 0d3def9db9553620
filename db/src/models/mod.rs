pub mod assessment;
pub mod assignment_submission;
pub mod course;
pub mod enrollment;
pub mod quiz_attempt;
pub mod user;

pub use assessment::Entity as Assessment;
pub use assignment_submission::Entity as AssignmentSubmission;
pub use course::Entity as Course;
pub use enrollment::Entity as Enrollment;
pub use quiz_attempt::Entity as QuizAttempt;
pub use user::Entity as User;
