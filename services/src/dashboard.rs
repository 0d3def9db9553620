use serde::Serialize;

use crate::grade_book::round1;
use crate::submission::{CanonicalSubmission, SubmissionStatus};

/// Headline numbers across every course an instructor owns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct DashboardStatistics {
    pub course_count: u64,
    pub assessment_count: u64,
    pub student_count: u64,
    pub total_submissions: u64,
    pub pending_count: u64,
    pub graded_count: u64,
    /// Rejected plus revision-requested submissions.
    pub needs_attention_count: u64,
    /// Mean over graded submissions, one decimal; 0 when nothing is graded.
    pub average_grade: f64,
}

pub fn summarize(
    course_count: u64,
    assessment_count: u64,
    student_count: u64,
    submissions: &[CanonicalSubmission],
) -> DashboardStatistics {
    let mut stats = DashboardStatistics {
        course_count,
        assessment_count,
        student_count,
        total_submissions: submissions.len() as u64,
        ..Default::default()
    };

    let mut grade_sum = 0.0;
    for s in submissions {
        match s.status {
            SubmissionStatus::Pending => stats.pending_count += 1,
            SubmissionStatus::Graded => {
                stats.graded_count += 1;
                grade_sum += s.grade.unwrap_or_default();
            }
            SubmissionStatus::Rejected | SubmissionStatus::RevisionRequested => {
                stats.needs_attention_count += 1
            }
        }
    }
    if stats.graded_count > 0 {
        stats.average_grade = round1(grade_sum / stats.graded_count as f64);
    }
    stats
}
