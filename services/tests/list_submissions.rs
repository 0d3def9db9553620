mod support;

use common::config::AppConfig;
use serial_test::serial;
use services::filters::SubmissionQuery;
use services::submission::SubmissionStatus;
use support::*;

#[tokio::test]
#[serial]
async fn raw_queries_use_configured_page_sizes() {
    AppConfig::set_default_page_size(2);
    AppConfig::set_max_page_size(3);

    let (db, service) = sqlite_service().await;
    let teacher = user(&db, "Tess Teacher").await;
    let s = user(&db, "Sam").await;
    let c = course(&db, "COS301", &teacher).await;
    let q = quiz(&db, &c, "Quiz").await;
    for day in 2..=6 {
        finished_attempt(&db, &q, &s, at(day, 9), Some(f64::from(day) * 10.0)).await;
    }

    let page = service
        .list_submissions(teacher.id, SubmissionQuery::default())
        .await
        .unwrap();
    assert_eq!(page.page_size, Some(2));
    assert_eq!(page.total_pages, 3);
    assert_eq!(page.items[0].submitted_at, at(6, 9));

    let too_big = SubmissionQuery {
        page_size: Some(4),
        ..Default::default()
    };
    let err = service
        .list_submissions(teacher.id, too_big)
        .await
        .unwrap_err();
    assert_eq!(err.code(), "validation_failed");

    let by_grade = SubmissionQuery {
        sort: Some("grade".into()),
        status: Some("GRADED".into()),
        page: Some(2),
        ..Default::default()
    };
    let page = service.list_submissions(teacher.id, by_grade).await.unwrap();
    assert_eq!(page.page, 2);
    assert!(page.items.iter().all(|s| s.status == SubmissionStatus::Graded));
    assert_eq!(page.items[0].grade, Some(40.0));

    AppConfig::reset();
}
