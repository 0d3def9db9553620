//! Instructor-facing entry points: listings, exports, grade books,
//! grading and dashboard numbers.

use common::config::AppConfig;
use db::models::course;
use log::{info, warn};

use crate::adapters::{
    AssignmentSubmissionAdapter, InstructorScope, QuizAttemptAdapter, SourceAdapter,
};
use crate::aggregation::{SubmissionPage, merge, paginate, sort_submissions};
use crate::dashboard::{self, DashboardStatistics};
use crate::error::{GradebookError, GradebookResult};
use crate::filters::{
    PageSize, SortDirection, SortKey, SortSpec, SubmissionFilter, SubmissionQuery,
};
use crate::grade_book::{self, GradeBook};
use crate::grading::{GradeOutcome, GradeRequest, validate_transition};
use crate::store::GradebookStore;
use crate::submission::{CanonicalSubmission, SourceKind};

type SourceRows = (Vec<CanonicalSubmission>, u64);

pub struct GradebookService<S> {
    store: S,
}

impl<S: GradebookStore> GradebookService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Courses `instructor_id` owns.
    pub async fn instructor_scope(&self, instructor_id: i64) -> GradebookResult<InstructorScope> {
        let course_ids = self.store.list_owned_course_ids(instructor_id).await?;
        Ok(InstructorScope::new(instructor_id, course_ids))
    }

    async fn owned_course(
        &self,
        instructor_id: i64,
        course_id: i64,
    ) -> GradebookResult<course::Model> {
        let course = self
            .store
            .find_course(course_id)
            .await?
            .ok_or_else(|| GradebookError::not_found("course", course_id))?;

        if !course.is_owned_by(instructor_id) {
            warn!("Instructor {instructor_id} tried to read course {course_id} they do not own");
            return Err(GradebookError::Forbidden {
                instructor_id,
                course_id,
            });
        }
        Ok(course)
    }

    /// Both sources, fetched concurrently. Either failing fails the whole
    /// read.
    async fn fetch_sources(
        &self,
        filter: &SubmissionFilter,
        sort_hint: Option<SortSpec>,
        scope: &InstructorScope,
    ) -> GradebookResult<[SourceRows; 2]> {
        let quizzes = QuizAttemptAdapter::new(&self.store);
        let uploads = AssignmentSubmissionAdapter::new(&self.store);

        let (q, u) = tokio::try_join!(
            quizzes.fetch(filter, sort_hint, scope),
            uploads.fetch(filter, sort_hint, scope),
        )
        .inspect_err(|e| {
            warn!(
                "Submission fetch for instructor {} failed: {e}",
                scope.instructor_id
            )
        })?;

        Ok([q, u])
    }

    /// One page of the unified submission list for `instructor_id`.
    ///
    /// A `course_id` filter outside the caller's courses yields an empty page.
    pub async fn aggregate(
        &self,
        instructor_id: i64,
        filter: &SubmissionFilter,
        sort: SortSpec,
        page: u64,
        page_size: PageSize,
    ) -> GradebookResult<SubmissionPage> {
        if page == 0 {
            return Err(GradebookError::validation("page must be at least 1"));
        }
        page_size.checked()?;
        filter.validate()?;

        let scope = self.instructor_scope(instructor_id).await?;
        let sources = self.fetch_sources(filter, Some(sort), &scope).await?;

        let needle = filter.search_needle();
        let (mut rows, total) = merge(sources, needle.as_deref());
        sort_submissions(&mut rows, sort);
        paginate(rows, total, page, page_size)
    }

    /// [`aggregate`](Self::aggregate) driven by a raw query, with page-size
    /// defaults and limits from [`AppConfig`].
    pub async fn list_submissions(
        &self,
        instructor_id: i64,
        query: SubmissionQuery,
    ) -> GradebookResult<SubmissionPage> {
        let request = {
            let config = AppConfig::global();
            query.into_request(&config)?
        };
        self.aggregate(
            instructor_id,
            &request.filter,
            request.sort,
            request.page,
            request.page_size,
        )
        .await
    }

    /// Every submission of one course, by student name.
    pub async fn export_course(
        &self,
        instructor_id: i64,
        course_id: i64,
    ) -> GradebookResult<Vec<CanonicalSubmission>> {
        self.owned_course(instructor_id, course_id).await?;

        let page = self
            .aggregate(
                instructor_id,
                &SubmissionFilter::new().with_course(course_id),
                SortSpec::new(SortKey::StudentName, SortDirection::Asc),
                1,
                PageSize::All,
            )
            .await?;
        info!(
            "Exported {} submissions of course {course_id} for instructor {instructor_id}",
            page.items.len()
        );
        Ok(page.items)
    }

    pub async fn build_grade_book(
        &self,
        instructor_id: i64,
        course_id: i64,
    ) -> GradebookResult<GradeBook> {
        let course = self.owned_course(instructor_id, course_id).await?;
        let scope = InstructorScope::new(instructor_id, vec![course_id]);
        let filter = SubmissionFilter::new();

        let (assessments, roster, sources) = tokio::try_join!(
            async { Ok::<_, GradebookError>(self.store.list_assessments(course_id).await?) },
            async { Ok::<_, GradebookError>(self.store.list_roster(course_id).await?) },
            self.fetch_sources(&filter, None, &scope),
        )?;

        let (rows, _) = merge(sources, None);
        Ok(grade_book::build(&course, &assessments, &roster, &rows))
    }

    /// Records one review and returns the submission as stored afterwards.
    ///
    /// Request rules are checked before anything is read; ownership and the
    /// transition are checked before anything is written.
    pub async fn apply_grade(
        &self,
        instructor_id: i64,
        request: GradeRequest,
    ) -> GradebookResult<CanonicalSubmission> {
        let submission = request.submission;
        let status = request.status;

        let result = match request.validate() {
            Err(e) => Err(e),
            Ok(()) => match submission.kind {
                SourceKind::QuizAttempt => {
                    self.grade_with(&QuizAttemptAdapter::new(&self.store), instructor_id, request)
                        .await
                }
                SourceKind::AssignmentSubmission => {
                    self.grade_with(
                        &AssignmentSubmissionAdapter::new(&self.store),
                        instructor_id,
                        request,
                    )
                    .await
                }
            },
        };

        match &result {
            Ok(s) => info!(
                "Instructor {instructor_id} marked {submission} {status} (grade {:?})",
                s.grade
            ),
            Err(e) => warn!("Instructor {instructor_id} could not mark {submission} {status}: {e}"),
        }
        result
    }

    async fn grade_with<A: SourceAdapter>(
        &self,
        adapter: &A,
        instructor_id: i64,
        request: GradeRequest,
    ) -> GradebookResult<CanonicalSubmission> {
        let located = adapter
            .find(request.submission.record_id)
            .await?
            .ok_or_else(|| GradebookError::not_found("submission", request.submission))?;

        if located.instructor_id != instructor_id {
            return Err(GradebookError::Forbidden {
                instructor_id,
                course_id: located.submission.course_id,
            });
        }
        if !located.finished {
            return Err(GradebookError::validation(format!(
                "{} is still in progress",
                request.submission
            )));
        }
        validate_transition(located.submission.status, request.status)?;

        adapter
            .write_grade(
                request.submission.record_id,
                located.submission.status,
                request.status,
                request.score,
                request.feedback,
            )
            .await
    }

    /// Applies each request independently, in request order. One failure
    /// does not undo or stop the others.
    ///
    /// Items run one after another, so a later item naming the same
    /// submission sees what the earlier one wrote.
    pub async fn apply_grades(
        &self,
        instructor_id: i64,
        requests: Vec<GradeRequest>,
    ) -> Vec<GradeOutcome> {
        let mut outcomes = Vec::with_capacity(requests.len());
        for request in requests {
            let submission = request.submission;
            let result = self.apply_grade(instructor_id, request).await;
            outcomes.push(GradeOutcome { submission, result });
        }

        let failed = outcomes.iter().filter(|o| !o.is_ok()).count();
        info!(
            "Bulk grading for instructor {instructor_id}: {} applied, {failed} failed",
            outcomes.len() - failed
        );
        outcomes
    }

    pub async fn dashboard_statistics(
        &self,
        instructor_id: i64,
    ) -> GradebookResult<DashboardStatistics> {
        let scope = self.instructor_scope(instructor_id).await?;
        let filter = SubmissionFilter::new();

        let (assessment_count, student_ids, sources) = tokio::try_join!(
            async { Ok::<_, GradebookError>(self.store.count_assessments(&scope.course_ids).await?) },
            async { Ok::<_, GradebookError>(self.store.list_student_ids(&scope.course_ids).await?) },
            self.fetch_sources(&filter, None, &scope),
        )?;

        let (rows, _) = merge(sources, None);
        Ok(dashboard::summarize(
            scope.course_ids.len() as u64,
            assessment_count,
            student_ids.len() as u64,
            &rows,
        ))
    }
}
