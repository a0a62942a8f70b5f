use std::collections::HashSet;

use course_core::model::{
    ContentNode, Course, CourseId, LessonId, Username, create_chapter, create_lesson,
};
use course_core::time::fixed_now;
use storage::repository::{CompletionRecord, CompletionRepository, CourseRepository, StorageError};
use storage::sqlite::SqliteRepository;

async fn connect(name: &str) -> SqliteRepository {
    let repo = SqliteRepository::connect(&format!("sqlite:file:{name}?mode=memory&cache=shared"))
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");
    repo
}

fn build_course(id: u64, slug: &str) -> Course {
    Course::new(
        CourseId::new(id),
        slug,
        "Rust from scratch",
        Some("Ownership, borrowing, traits".into()),
        None,
        vec![
            create_chapter("A", vec![create_lesson("l1"), create_lesson("l2")], None),
            create_chapter(
                "B",
                vec![create_chapter("B1", vec![create_lesson("l3")], None)],
                Some("nested".into()),
            ),
        ],
    )
    .unwrap()
}

fn record(user: &str, course_id: u64, lesson: &str) -> CompletionRecord {
    CompletionRecord {
        username: Username::new(user),
        course_id: CourseId::new(course_id),
        lesson_id: LessonId::new(lesson),
        completed_at: fixed_now(),
    }
}

#[tokio::test]
async fn sqlite_roundtrip_keeps_numbered_tree() {
    let repo = connect("memdb_course_roundtrip").await;
    let course = build_course(1, "rust");
    repo.upsert_course(&course).await.unwrap();

    let fetched = repo.get_course(course.id()).await.unwrap().expect("course");
    assert_eq!(fetched, course);

    let ContentNode::Chapter(b) = &fetched.content()[1] else {
        panic!("expected chapter");
    };
    let ContentNode::Chapter(b1) = &b.children[0] else {
        panic!("expected nested chapter");
    };
    assert_eq!(b1.chapter_number, "2.1");
    assert_eq!(b1.children[0].as_lesson().unwrap().lesson_number, 3);

    let by_slug = repo.get_course_by_slug("rust").await.unwrap();
    assert_eq!(by_slug.map(|c| c.id()), Some(course.id()));
}

#[tokio::test]
async fn sqlite_upsert_replaces_content_and_guards_slug() {
    let repo = connect("memdb_course_upsert").await;
    let replaced = repo.upsert_course(&build_course(1, "rust")).await.unwrap();
    assert!(!replaced);

    let updated = Course::new(
        CourseId::new(1),
        "rust",
        "Rust, revised",
        None,
        None,
        vec![create_lesson("l9")],
    )
    .unwrap();
    let replaced = repo.upsert_course(&updated).await.unwrap();
    assert!(replaced);
    let fetched = repo.get_course(CourseId::new(1)).await.unwrap().unwrap();
    assert_eq!(fetched.title(), "Rust, revised");
    assert_eq!(fetched.lesson_ids(), vec![LessonId::new("l9")]);

    let err = repo
        .upsert_course(&build_course(2, "rust"))
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::Conflict));

    let listed = repo.list_courses(10).await.unwrap();
    assert_eq!(listed.len(), 1);
}

#[tokio::test]
async fn sqlite_completions_are_idempotent_and_scoped() {
    let repo = connect("memdb_completions").await;
    repo.upsert_course(&build_course(1, "rust")).await.unwrap();
    repo.upsert_course(&build_course(2, "rust-advanced")).await.unwrap();

    assert!(repo.mark_lesson_completed(&record("ada", 1, "l1")).await.unwrap());
    assert!(!repo.mark_lesson_completed(&record("ada", 1, "l1")).await.unwrap());
    assert!(repo.mark_lesson_completed(&record("ada", 1, "l3")).await.unwrap());
    assert!(repo.mark_lesson_completed(&record("ada", 2, "l2")).await.unwrap());
    assert!(repo.mark_lesson_completed(&record("bob", 1, "l2")).await.unwrap());

    let done = repo
        .completed_lessons(&Username::new("ada"), CourseId::new(1))
        .await
        .unwrap();
    assert_eq!(
        done,
        HashSet::from([LessonId::new("l1"), LessonId::new("l3")])
    );
}

#[tokio::test]
async fn sqlite_delete_cascades_to_completions() {
    let repo = connect("memdb_delete_course").await;
    repo.upsert_course(&build_course(1, "rust")).await.unwrap();
    repo.mark_lesson_completed(&record("ada", 1, "l1")).await.unwrap();

    assert!(repo.delete_course(CourseId::new(1)).await.unwrap());
    assert!(!repo.delete_course(CourseId::new(1)).await.unwrap());
    assert!(repo.get_course(CourseId::new(1)).await.unwrap().is_none());

    let done = repo
        .completed_lessons(&Username::new("ada"), CourseId::new(1))
        .await
        .unwrap();
    assert!(done.is_empty());
}

#[tokio::test]
async fn sqlite_migrations_are_recorded_once() {
    let repo = connect("memdb_migrations_once").await;
    repo.migrate().await.expect("second migrate");

    let applied: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM schema_migrations")
        .fetch_one(repo.pool())
        .await
        .expect("count migrations");
    assert_eq!(applied, 1);
}

#[tokio::test]
async fn sqlite_update_to_taken_slug_is_a_conflict() {
    let repo = connect("memdb_course_slug_update").await;
    repo.upsert_course(&build_course(1, "rust")).await.unwrap();
    repo.upsert_course(&build_course(2, "go")).await.unwrap();

    let err = repo
        .upsert_course(&build_course(2, "rust"))
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::Conflict));

    let kept = repo.get_course(CourseId::new(2)).await.unwrap().unwrap();
    assert_eq!(kept.slug(), "go");
}
