use chrono::NaiveDate;
use storage::repository::{StorageError, TaskRepository};
use storage::sqlite::SqliteRepository;
use study_core::model::{
    Difficulty, PersistedTask, PracticeResult, Subject, Syllabus, Task, TaskDraft, TaskId,
    TaskStatus, TaskType,
};

fn date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
}

fn build_task(id: u64, task_type: TaskType, day: u32) -> Task {
    TaskDraft {
        subject: Subject::Botany,
        chapter: "Cell Cycle and Cell Division".into(),
        microtopic: "Meiosis".into(),
        task_type,
        date: date(day),
    }
    .validate(&Syllabus::builtin())
    .unwrap()
    .assign_id(TaskId::new(id))
}

async fn connect(name: &str) -> SqliteRepository {
    let repo = SqliteRepository::connect(&format!("sqlite:file:{name}?mode=memory&cache=shared"))
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");
    repo
}

#[tokio::test]
async fn sqlite_roundtrip_preserves_order_and_feedback() {
    let repo = connect("memdb_roundtrip").await;
    assert!(repo.load_tasks().await.unwrap().is_empty());

    let mut studied = build_task(7, TaskType::Study, 3);
    studied
        .complete_with_difficulty(Difficulty::new(5).unwrap())
        .unwrap();
    let mut practiced = build_task(2, TaskType::Practice, 1);
    practiced
        .complete_with_practice(PracticeResult::new(20, 17).unwrap())
        .unwrap();
    let pending = build_task(4, TaskType::Revision, 2);

    let list = vec![practiced.clone(), pending.clone(), studied.clone()];
    repo.replace_tasks(&list).await.unwrap();

    let loaded = repo.load_tasks().await.unwrap();
    assert_eq!(loaded, list);
    assert_eq!(loaded[0].practice().unwrap().accuracy(), Some(85.0));
    assert_eq!(loaded[1].status(), TaskStatus::Pending);
    assert_eq!(loaded[2].difficulty(), Some(5));
}

#[tokio::test]
async fn sqlite_replace_overwrites_previous_list() {
    let repo = connect("memdb_replace").await;

    repo.replace_tasks(&[
        build_task(1, TaskType::Study, 1),
        build_task(2, TaskType::Study, 2),
    ])
    .await
    .unwrap();
    repo.replace_tasks(&[build_task(3, TaskType::Practice, 5)])
        .await
        .unwrap();

    let loaded = repo.load_tasks().await.unwrap();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].id(), TaskId::new(3));
}

#[tokio::test]
async fn sqlite_rejects_duplicate_ids_without_touching_data() {
    let repo = connect("memdb_duplicates").await;
    repo.replace_tasks(&[build_task(1, TaskType::Study, 1)])
        .await
        .unwrap();

    let err = repo
        .replace_tasks(&[
            build_task(5, TaskType::Study, 1),
            build_task(5, TaskType::Revision, 2),
        ])
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::Conflict));
    assert_eq!(repo.load_tasks().await.unwrap()[0].id(), TaskId::new(1));
}

#[tokio::test]
async fn sqlite_keeps_off_syllabus_and_stray_records_as_stored() {
    let repo = connect("memdb_stray").await;
    let stray = Task::from_persisted(PersistedTask {
        id: TaskId::new(11),
        subject: Subject::Zoology,
        chapter: "Retired Chapter".into(),
        microtopic: "Old Topic".into(),
        task_type: TaskType::Study,
        date: date(9),
        status: TaskStatus::Pending,
        difficulty: Some(2),
        practice: None,
    });
    repo.replace_tasks(std::slice::from_ref(&stray)).await.unwrap();

    let loaded = repo.load_tasks().await.unwrap();
    assert_eq!(loaded, vec![stray]);
}

#[tokio::test]
async fn sqlite_migrations_are_idempotent() {
    let repo = connect("memdb_migrate_twice").await;
    repo.migrate().await.expect("second migrate");
    repo.replace_tasks(&[build_task(1, TaskType::Study, 1)])
        .await
        .unwrap();
    assert_eq!(repo.load_tasks().await.unwrap().len(), 1);
}
