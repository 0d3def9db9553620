pub mod assessment;
pub mod assignment_submission;
pub mod course;
pub mod enrollment;
pub mod quiz_attempt;
pub mod user;

/// Usernames of seeded instructors start with this prefix; students use `u`.
pub const INSTRUCTOR_PREFIX: &str = "i";
