//! Student × assessment grade matrix for one course.

use std::collections::HashMap;

use db::models::assessment::AssessmentKind;
use db::models::{assessment, course, user};
use serde::Serialize;

use crate::submission::{CanonicalSubmission, SubmissionRef, SubmissionStatus};

/// Display state of one grade-book cell.
///
/// Rejected and revision-requested work counts as submitted but shows as
/// pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CellStatus {
    NotSubmitted,
    Pending,
    Graded,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GradeCell {
    pub assessment_id: i64,
    pub status: CellStatus,
    /// Present only for graded cells.
    pub score: Option<f64>,
    pub submission: Option<SubmissionRef>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GradeBookEntry {
    pub student_id: i64,
    pub student_name: String,
    pub student_email: String,
    /// One cell per assessment, in assessment order.
    pub cells: Vec<GradeCell>,
    pub avg_score: f64,
    pub total_submitted: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GradeBookSummary {
    pub avg_class_score: f64,
    pub completion_rate: f64,
    pub student_count: u64,
    pub assessment_count: u64,
    pub total_submissions: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssessmentColumn {
    pub id: i64,
    pub title: String,
    pub kind: AssessmentKind,
    pub passing_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GradeBook {
    pub course_id: i64,
    pub course_title: String,
    pub assessments: Vec<AssessmentColumn>,
    pub entries: Vec<GradeBookEntry>,
    pub summary: GradeBookSummary,
}

/// Rounds half away from zero to one decimal place.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

fn cell_for(assessment_id: i64, submission: Option<&CanonicalSubmission>) -> GradeCell {
    let Some(s) = submission else {
        return GradeCell {
            assessment_id,
            status: CellStatus::NotSubmitted,
            score: None,
            submission: None,
        };
    };

    let (status, score) = match (s.status, s.grade) {
        (SubmissionStatus::Graded, Some(grade)) => (CellStatus::Graded, Some(grade)),
        _ => (CellStatus::Pending, None),
    };
    GradeCell {
        assessment_id,
        status,
        score,
        submission: Some(s.id),
    }
}

/// Folds a course's submissions into its grade book.
///
/// `assessments` and `roster` are taken in the order given. A student with
/// several submissions for one assessment is represented by the newest.
/// Submissions by students off the roster or for other assessments are
/// ignored.
pub fn build(
    course: &course::Model,
    assessments: &[assessment::Model],
    roster: &[user::Model],
    submissions: &[CanonicalSubmission],
) -> GradeBook {
    let mut latest: HashMap<(i64, i64), &CanonicalSubmission> = HashMap::new();
    for s in submissions {
        latest
            .entry((s.student_id, s.assignment_id))
            .and_modify(|current| {
                if (s.submitted_at, s.id) > (current.submitted_at, current.id) {
                    *current = s;
                }
            })
            .or_insert(s);
    }

    let entries: Vec<GradeBookEntry> = roster
        .iter()
        .map(|student| {
            let cells: Vec<GradeCell> = assessments
                .iter()
                .map(|a| cell_for(a.id, latest.get(&(student.id, a.id)).copied()))
                .collect();
            let graded: Vec<f64> = cells.iter().filter_map(|c| c.score).collect();
            let total_submitted = cells
                .iter()
                .filter(|c| c.status != CellStatus::NotSubmitted)
                .count() as u64;

            GradeBookEntry {
                student_id: student.id,
                student_name: student.full_name.clone(),
                student_email: student.email.clone(),
                cells,
                avg_score: round1(mean(&graded)),
                total_submitted,
            }
        })
        .collect();

    let student_count = entries.len() as u64;
    let assessment_count = assessments.len() as u64;
    let total_submissions: u64 = entries.iter().map(|e| e.total_submitted).sum();
    let averages: Vec<f64> = entries.iter().map(|e| e.avg_score).collect();
    let slots = student_count * assessment_count;
    let completion_rate = if slots == 0 {
        0.0
    } else {
        round1(total_submissions as f64 / slots as f64 * 100.0)
    };

    GradeBook {
        course_id: course.id,
        course_title: course.title.clone(),
        assessments: assessments
            .iter()
            .map(|a| AssessmentColumn {
                id: a.id,
                title: a.title.clone(),
                kind: a.kind,
                passing_score: a.passing_score,
            })
            .collect(),
        entries,
        summary: GradeBookSummary {
            avg_class_score: round1(mean(&averages)),
            completion_rate,
            student_count,
            assessment_count,
            total_submissions,
        },
    }
}
