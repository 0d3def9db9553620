pub mod m202510010001_create_users;
pub mod m202510010002_create_courses;
pub mod m202510010003_create_enrollments;
pub mod m202510010004_create_assessments;
pub mod m202510010005_create_quiz_attempts;
pub mod m202510010006_create_assignment_submissions;
