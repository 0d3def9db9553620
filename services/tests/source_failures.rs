mod support;

use services::GradebookError;
use services::filters::{PageSize, SortSpec, SubmissionFilter};
use services::grading::GradeRequest;
use services::submission::{SourceKind, SubmissionRef, SubmissionStatus};
use support::*;

#[tokio::test]
async fn one_failing_source_fails_the_whole_listing() {
    let (db, service) = probe_service().await;
    let teacher = user(&db, "Tess Teacher").await;
    let s = user(&db, "Sam").await;
    let c = course(&db, "COS301", &teacher).await;
    let q = quiz(&db, &c, "Quiz").await;
    let a = assignment(&db, &c, "Project").await;
    finished_attempt(&db, &q, &s, at(2, 9), Some(70.0)).await;
    upload(&db, &a, &s, at(2, 10)).await;

    service.store().fail_quiz_attempts();
    let err = service
        .aggregate(teacher.id, &SubmissionFilter::new(), SortSpec::default(), 1, PageSize::All)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        GradebookError::SourceUnavailable {
            kind: SourceKind::QuizAttempt,
            ..
        }
    ));
    assert!(err.is_retryable());
    assert_eq!(err.code(), "source_unavailable");
}

#[tokio::test]
async fn failing_uploads_break_grade_books_and_dashboards() {
    let (db, service) = probe_service().await;
    let teacher = user(&db, "Tess Teacher").await;
    let c = course(&db, "COS301", &teacher).await;
    assignment(&db, &c, "Project").await;

    service.store().fail_assignment_submissions();

    let err = service.build_grade_book(teacher.id, c.id).await.unwrap_err();
    assert_eq!(err.failed_source(), Some(SourceKind::AssignmentSubmission));

    let err = service.dashboard_statistics(teacher.id).await.unwrap_err();
    assert_eq!(err.failed_source(), Some(SourceKind::AssignmentSubmission));
}

#[tokio::test]
async fn unreachable_status_never_queries_the_quiz_source() {
    let (db, service) = probe_service().await;
    let teacher = user(&db, "Tess Teacher").await;
    let s = user(&db, "Sam").await;
    let c = course(&db, "COS301", &teacher).await;
    let a = assignment(&db, &c, "Project").await;
    let sub = upload(&db, &a, &s, at(2, 10)).await;
    review(
        &db,
        &sub,
        db::models::assignment_submission::UploadStatus::Returned,
        None,
    )
    .await;

    service.store().fail_quiz_attempts();
    let page = service
        .aggregate(
            teacher.id,
            &SubmissionFilter::new().with_status(SubmissionStatus::Rejected),
            SortSpec::default(),
            1,
            PageSize::All,
        )
        .await
        .unwrap();

    assert_eq!(page.total, 1);
    assert_eq!(service.store().reads(), 1);
}

#[tokio::test]
async fn empty_scope_reads_nothing() {
    let (db, service) = probe_service().await;
    let loner = user(&db, "No Courses").await;

    let page = service
        .aggregate(loner.id, &SubmissionFilter::new(), SortSpec::default(), 1, PageSize::Limit(20))
        .await
        .unwrap();
    assert_eq!(page.total, 0);
    assert_eq!(service.store().reads(), 0);
}

#[tokio::test]
async fn write_failures_name_the_source() {
    let (db, service) = probe_service().await;
    let teacher = user(&db, "Tess Teacher").await;
    let s = user(&db, "Sam").await;
    let c = course(&db, "COS301", &teacher).await;
    let a = assignment(&db, &c, "Project").await;
    let sub = upload(&db, &a, &s, at(2, 10)).await;

    service.store().fail_assignment_submissions();
    let err = service
        .apply_grade(
            teacher.id,
            GradeRequest::graded(SubmissionRef::assignment_submission(sub.id), 60.0),
        )
        .await
        .unwrap_err();
    assert_eq!(err.failed_source(), Some(SourceKind::AssignmentSubmission));
    assert_eq!(service.store().write_count(), 0);
}
