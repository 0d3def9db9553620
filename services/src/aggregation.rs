//! Merge, sort and slice of the rows both source adapters return.
//!
//! Pure functions over already-fetched data; the fetches live in
//! [`crate::gradebook_service`].

use std::cmp::Ordering;

use serde::Serialize;

use crate::error::{GradebookError, GradebookResult};
use crate::filters::{PageSize, SortDirection, SortKey, SortSpec};
use crate::submission::CanonicalSubmission;

/// One page of the unified submission list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubmissionPage {
    pub items: Vec<CanonicalSubmission>,
    /// Matching submissions across both sources, before slicing.
    pub total: u64,
    pub total_pages: u64,
    pub page: u64,
    /// `None` when everything was requested on one page.
    pub page_size: Option<u64>,
}

/// Concatenates per-source results.
///
/// Without a search needle the total is the sum of the per-source counts.
/// With one, rows are filtered here and the survivors are the total.
pub fn merge(
    sources: impl IntoIterator<Item = (Vec<CanonicalSubmission>, u64)>,
    search_needle: Option<&str>,
) -> (Vec<CanonicalSubmission>, u64) {
    let mut rows = Vec::new();
    let mut total = 0u64;
    for (source_rows, count) in sources {
        rows.extend(source_rows);
        total += count;
    }

    match search_needle {
        Some(needle) => {
            rows.retain(|s| s.matches_search(needle));
            let total = rows.len() as u64;
            (rows, total)
        }
        None => (rows, total),
    }
}

fn cmp_names(a: &str, b: &str) -> Ordering {
    a.chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase))
}

fn directed(ord: Ordering, direction: SortDirection) -> Ordering {
    match direction {
        SortDirection::Asc => ord,
        SortDirection::Desc => ord.reverse(),
    }
}

/// Total order used by every listing: the requested key, then newest
/// first, then submission id.
///
/// Ungraded rows sort after graded ones under a grade sort in both
/// directions.
pub fn compare(a: &CanonicalSubmission, b: &CanonicalSubmission, sort: SortSpec) -> Ordering {
    let primary = match sort.key {
        SortKey::StudentName => directed(cmp_names(&a.student_name, &b.student_name), sort.direction),
        SortKey::SubmittedAt => directed(a.submitted_at.cmp(&b.submitted_at), sort.direction),
        SortKey::Status => directed(a.status.cmp(&b.status), sort.direction),
        SortKey::Grade => match (a.grade, b.grade) {
            (Some(x), Some(y)) => directed(x.total_cmp(&y), sort.direction),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        },
    };

    primary
        .then_with(|| b.submitted_at.cmp(&a.submitted_at))
        .then_with(|| a.id.cmp(&b.id))
}

pub fn sort_submissions(rows: &mut [CanonicalSubmission], sort: SortSpec) {
    rows.sort_by(|a, b| compare(a, b, sort));
}

/// Cuts page `page` (1-based) out of the sorted rows.
pub fn paginate(
    rows: Vec<CanonicalSubmission>,
    total: u64,
    page: u64,
    page_size: PageSize,
) -> GradebookResult<SubmissionPage> {
    if page == 0 {
        return Err(GradebookError::validation("page must be at least 1"));
    }
    let size = page_size.checked()?;

    let (items, total_pages) = match size {
        None => {
            let items = if page == 1 { rows } else { Vec::new() };
            (items, u64::from(total > 0))
        }
        Some(size) => {
            let start = (page - 1).saturating_mul(size);
            let items = rows
                .into_iter()
                .skip(usize::try_from(start).unwrap_or(usize::MAX))
                .take(usize::try_from(size).unwrap_or(usize::MAX))
                .collect();
            (items, total.div_ceil(size))
        }
    };

    Ok(SubmissionPage {
        items,
        total,
        total_pages,
        page,
        page_size: size,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::submission::{SourceKind, SubmissionRef, SubmissionStatus};
    use chrono::{DateTime, TimeZone, Utc};

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, hour, 0, 0).unwrap()
    }

    fn row(id: SubmissionRef, name: &str, hour: u32, grade: Option<f64>) -> CanonicalSubmission {
        CanonicalSubmission {
            id,
            source_kind: id.kind,
            student_id: 1,
            student_name: name.into(),
            student_email: format!("{}@example.com", name.to_lowercase()),
            course_id: 1,
            course_title: "Course".into(),
            assignment_id: 1,
            assignment_title: "Task".into(),
            submitted_at: at(hour),
            status: if grade.is_some() {
                SubmissionStatus::Graded
            } else {
                SubmissionStatus::Pending
            },
            grade,
            feedback: None,
            attachment_ref: None,
            text_answer: None,
        }
    }

    fn ids(rows: &[CanonicalSubmission]) -> Vec<String> {
        rows.iter().map(|r| r.id.to_string()).collect()
    }

    #[test]
    fn grade_sort_keeps_nulls_last_both_ways() {
        let mut rows = vec![
            row(SubmissionRef::quiz_attempt(1), "A", 9, None),
            row(SubmissionRef::quiz_attempt(2), "B", 9, Some(50.0)),
            row(SubmissionRef::quiz_attempt(3), "C", 9, Some(90.0)),
        ];

        sort_submissions(&mut rows, SortSpec::new(SortKey::Grade, SortDirection::Asc));
        assert_eq!(ids(&rows), ["quiz_attempt:2", "quiz_attempt:3", "quiz_attempt:1"]);

        sort_submissions(&mut rows, SortSpec::new(SortKey::Grade, SortDirection::Desc));
        assert_eq!(ids(&rows), ["quiz_attempt:3", "quiz_attempt:2", "quiz_attempt:1"]);
    }

    #[test]
    fn ties_break_on_newest_then_id() {
        let mut rows = vec![
            row(SubmissionRef::assignment_submission(1), "Sam", 9, Some(70.0)),
            row(SubmissionRef::quiz_attempt(1), "Sam", 9, Some(70.0)),
            row(SubmissionRef::quiz_attempt(2), "Sam", 11, Some(70.0)),
        ];
        sort_submissions(&mut rows, SortSpec::new(SortKey::Grade, SortDirection::Desc));
        assert_eq!(
            ids(&rows),
            ["quiz_attempt:2", "quiz_attempt:1", "assignment_submission:1"]
        );
    }

    #[test]
    fn name_sort_ignores_case() {
        let mut rows = vec![
            row(SubmissionRef::quiz_attempt(1), "bob", 9, None),
            row(SubmissionRef::quiz_attempt(2), "Alice", 9, None),
            row(SubmissionRef::quiz_attempt(3), "Carol", 9, None),
        ];
        sort_submissions(&mut rows, SortSpec::new(SortKey::StudentName, SortDirection::Asc));
        let names: Vec<_> = rows.iter().map(|r| r.student_name.as_str()).collect();
        assert_eq!(names, ["Alice", "bob", "Carol"]);
    }

    #[test]
    fn merge_sums_counts_and_search_recounts() {
        let quiz = vec![row(SubmissionRef::quiz_attempt(1), "Alice", 9, None)];
        let uploads = vec![
            row(SubmissionRef::assignment_submission(1), "Bob", 9, None),
            row(SubmissionRef::assignment_submission(2), "Alicia", 9, None),
        ];

        let (rows, total) = merge([(quiz.clone(), 1), (uploads.clone(), 2)], None);
        assert_eq!((rows.len(), total), (3, 3));

        let (rows, total) = merge([(quiz, 1), (uploads, 2)], Some("ali"));
        assert_eq!(total, 2);
        assert!(rows.iter().all(|r| r.student_name.starts_with("Ali")));
    }

    #[test]
    fn pages_cover_every_row_once() {
        let rows: Vec<_> = (1..=7)
            .map(|i| row(SubmissionRef::quiz_attempt(i), "S", i as u32, None))
            .collect();

        let mut seen = Vec::new();
        for page in 1..=3 {
            let p = paginate(rows.clone(), 7, page, PageSize::Limit(3)).unwrap();
            assert_eq!(p.total_pages, 3);
            seen.extend(ids(&p.items));
        }
        assert_eq!(seen, ids(&rows));

        let past_end = paginate(rows, 7, 4, PageSize::Limit(3)).unwrap();
        assert!(past_end.items.is_empty());
        assert_eq!(past_end.total, 7);
    }

    #[test]
    fn page_all_and_invalid_pages() {
        let rows = vec![row(SubmissionRef::quiz_attempt(1), "S", 9, None)];
        let all = paginate(rows.clone(), 1, 1, PageSize::All).unwrap();
        assert_eq!((all.items.len(), all.total_pages, all.page_size), (1, 1, None));

        let empty = paginate(Vec::new(), 0, 1, PageSize::All).unwrap();
        assert_eq!(empty.total_pages, 0);

        assert!(paginate(rows.clone(), 1, 0, PageSize::Limit(10)).is_err());
        assert!(paginate(rows, 1, 1, PageSize::Limit(0)).is_err());
    }
}
