use std::str::FromStr;

use chrono::{DateTime, Utc};
use common::config::AppConfig;
use common::format_validation_errors;
use serde::Deserialize;
use strum::{Display, EnumString};
use validator::Validate;

use crate::error::{GradebookError, GradebookResult};
use crate::submission::SubmissionStatus;

/// Predicates a caller can put on a submission listing.
///
/// Everything except `search` is pushed down into both sources; `search`
/// spans fields that live in different tables per source and is applied
/// after merging.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubmissionFilter {
    pub course_id: Option<i64>,
    pub status: Option<SubmissionStatus>,
    pub date_from: Option<DateTime<Utc>>,
    pub date_to: Option<DateTime<Utc>>,
    pub search: Option<String>,
}

impl SubmissionFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_course(mut self, course_id: i64) -> Self {
        self.course_id = Some(course_id);
        self
    }

    pub fn with_status(mut self, status: SubmissionStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_date_from(mut self, from: DateTime<Utc>) -> Self {
        self.date_from = Some(from);
        self
    }

    pub fn with_date_to(mut self, to: DateTime<Utc>) -> Self {
        self.date_to = Some(to);
        self
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn date_range(&self) -> DateRange {
        DateRange {
            from: self.date_from,
            to: self.date_to,
        }
    }

    /// Lowercased, trimmed search needle; `None` when blank.
    pub fn search_needle(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase)
    }

    pub fn validate(&self) -> GradebookResult<()> {
        if let (Some(from), Some(to)) = (self.date_from, self.date_to) {
            if from > to {
                return Err(GradebookError::validation(
                    "date_from must not be after date_to",
                ));
            }
        }
        Ok(())
    }
}

/// Inclusive submission-time window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum SortKey {
    StudentName,
    SubmittedAt,
    Status,
    Grade,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum SortDirection {
    Asc,
    Desc,
}

/// Primary ordering of a listing. Ties always fall back to `submitted_at`
/// descending and then the submission id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec {
    pub key: SortKey,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn new(key: SortKey, direction: SortDirection) -> Self {
        Self { key, direction }
    }
}

impl Default for SortSpec {
    fn default() -> Self {
        Self::new(SortKey::SubmittedAt, SortDirection::Desc)
    }
}

impl FromStr for SortSpec {
    type Err = GradebookError;

    /// Parses `field` (ascending) or `-field` (descending).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (field, direction) = match s.strip_prefix('-') {
            Some(rest) => (rest, SortDirection::Desc),
            None => (s, SortDirection::Asc),
        };
        let key = SortKey::from_str(field)
            .map_err(|_| GradebookError::validation(format!("unsupported sort key '{field}'")))?;
        Ok(Self { key, direction })
    }
}

/// How many rows one page holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageSize {
    Limit(i64),
    /// Everything on a single page; used by exports.
    All,
}

impl PageSize {
    /// The positive page length, or `None` for `All`.
    pub fn checked(self) -> GradebookResult<Option<u64>> {
        match self {
            PageSize::All => Ok(None),
            PageSize::Limit(n) if n > 0 => Ok(Some(n as u64)),
            PageSize::Limit(n) => Err(GradebookError::validation(format!(
                "page_size must be positive, got {n}"
            ))),
        }
    }
}

/// Caller-facing listing request, shaped like a query string.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct SubmissionQuery {
    #[validate(range(min = 1, message = "page must be at least 1"))]
    pub page: Option<u64>,
    #[validate(range(min = 1, message = "page_size must be positive"))]
    pub page_size: Option<i64>,
    pub course_id: Option<i64>,
    pub status: Option<String>,
    pub date_from: Option<DateTime<Utc>>,
    pub date_to: Option<DateTime<Utc>>,
    #[validate(length(max = 200, message = "query is too long"))]
    pub query: Option<String>,
    /// Single sort field, `-` prefix for descending. Defaults to `-submitted_at`.
    pub sort: Option<String>,
}

/// A fully parsed and validated listing request.
#[derive(Debug, Clone, PartialEq)]
pub struct ListRequest {
    pub filter: SubmissionFilter,
    pub sort: SortSpec,
    pub page: u64,
    pub page_size: PageSize,
}

impl SubmissionQuery {
    /// Validates the raw query and resolves defaults from `config`.
    pub fn into_request(self, config: &AppConfig) -> GradebookResult<ListRequest> {
        self.validate()
            .map_err(|e| GradebookError::validation(format_validation_errors(&e)))?;

        let page_size = self.page_size.unwrap_or(config.default_page_size as i64);
        if page_size as u64 > config.max_page_size {
            return Err(GradebookError::validation(format!(
                "page_size must not exceed {}",
                config.max_page_size
            )));
        }

        let status = self
            .status
            .as_deref()
            .map(|raw| {
                SubmissionStatus::from_str(raw.trim())
                    .map_err(|_| GradebookError::validation(format!("unknown status '{raw}'")))
            })
            .transpose()?;

        let sort = match self.sort.as_deref() {
            Some(raw) => raw.parse()?,
            None => SortSpec::default(),
        };

        let filter = SubmissionFilter {
            course_id: self.course_id,
            status,
            date_from: self.date_from,
            date_to: self.date_to,
            search: self.query,
        };
        filter.validate()?;

        Ok(ListRequest {
            filter,
            sort,
            page: self.page.unwrap_or(1),
            page_size: PageSize::Limit(page_size),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn config() -> AppConfig {
        AppConfig {
            env: "test".into(),
            project_name: "gradebook".into(),
            log_level: "info".into(),
            log_file: "test.log".into(),
            log_to_stdout: false,
            database_path: ":memory:".into(),
            default_page_size: 20,
            max_page_size: 100,
        }
    }

    #[test]
    fn sort_spec_parses_direction_prefix() {
        assert_eq!(
            "-grade".parse::<SortSpec>().unwrap(),
            SortSpec::new(SortKey::Grade, SortDirection::Desc)
        );
        assert_eq!(
            "student_name".parse::<SortSpec>().unwrap(),
            SortSpec::new(SortKey::StudentName, SortDirection::Asc)
        );
        let err = "score".parse::<SortSpec>().unwrap_err();
        assert_eq!(err.code(), "validation_failed");
    }

    #[test]
    fn non_positive_page_size_is_rejected() {
        assert!(PageSize::Limit(0).checked().is_err());
        assert!(PageSize::Limit(-3).checked().is_err());
        assert_eq!(PageSize::Limit(5).checked().unwrap(), Some(5));
        assert_eq!(PageSize::All.checked().unwrap(), None);
    }

    #[test]
    fn query_defaults_come_from_config() {
        let req = SubmissionQuery::default().into_request(&config()).unwrap();
        assert_eq!(req.page, 1);
        assert_eq!(req.page_size, PageSize::Limit(20));
        assert_eq!(req.sort, SortSpec::default());
        assert_eq!(req.filter, SubmissionFilter::default());
    }

    #[test]
    fn query_rejects_bad_input_before_any_read() {
        let cfg = config();
        let cases = [
            SubmissionQuery { page: Some(0), ..Default::default() },
            SubmissionQuery { page_size: Some(0), ..Default::default() },
            SubmissionQuery { page_size: Some(500), ..Default::default() },
            SubmissionQuery { status: Some("approved".into()), ..Default::default() },
            SubmissionQuery { sort: Some("-score".into()), ..Default::default() },
        ];
        for q in cases {
            let err = q.clone().into_request(&cfg).unwrap_err();
            assert_eq!(err.code(), "validation_failed", "{q:?}");
        }
    }

    #[test]
    fn inverted_date_range_is_rejected() {
        let from = Utc.with_ymd_and_hms(2025, 3, 2, 0, 0, 0).unwrap();
        let to = Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap();
        let filter = SubmissionFilter::new().with_date_from(from).with_date_to(to);
        assert!(filter.validate().is_err());
    }

    #[test]
    fn blank_search_is_ignored() {
        assert_eq!(SubmissionFilter::new().with_search("   ").search_needle(), None);
        assert_eq!(
            SubmissionFilter::new().with_search(" ALICE ").search_needle().as_deref(),
            Some("alice")
        );
    }
}
