use chrono::Duration;
use services::{AppServices, PlannerError};
use study_core::model::{Subject, Syllabus, TaskDraft, TaskError, TaskType};
use study_core::time::{fixed_clock, fixed_today};

fn draft(subject: Subject, chapter: &str, microtopic: &str, task_type: TaskType) -> TaskDraft {
    TaskDraft {
        subject,
        chapter: chapter.into(),
        microtopic: microtopic.into(),
        task_type,
        date: fixed_today(),
    }
}

#[tokio::test]
async fn plan_complete_and_report_over_sqlite() {
    let services = AppServices::new_sqlite(
        "sqlite:file:memdb_planner_flow?mode=memory&cache=shared",
        fixed_clock(),
        Syllabus::builtin(),
    )
    .await
    .expect("connect sqlite");
    let planner = services.planner();

    let study = planner
        .add_task(draft(
            Subject::Physics,
            "Kinematics",
            "Projectile Motion",
            TaskType::Study,
        ))
        .await
        .expect("add study");
    let practice = planner
        .add_task(draft(
            Subject::Physics,
            "Kinematics",
            "Relative Velocity",
            TaskType::Practice,
        ))
        .await
        .expect("add practice");
    let mut later = draft(
        Subject::Botany,
        "Cell Cycle and Cell Division",
        "Meiosis",
        TaskType::Revision,
    );
    later.date = fixed_today() + Duration::days(2);
    planner.add_task(later).await.expect("add revision");

    planner
        .complete_study(study.id(), 4)
        .await
        .expect("complete study");
    planner
        .complete_practice(practice.id(), 20, 15)
        .await
        .expect("complete practice");

    let err = planner.complete_study(study.id(), 3).await.unwrap_err();
    assert!(matches!(
        err,
        PlannerError::Task(TaskError::AlreadyCompleted(_))
    ));

    let agenda = planner.agenda().await.expect("agenda");
    assert_eq!(agenda.len(), 2);
    assert_eq!(agenda[0].tasks.len(), 2);
    assert_eq!(agenda[1].date, fixed_today() + Duration::days(2));

    let stats = services.progress().progress().await.expect("progress");
    assert_eq!(stats.total_tasks(), 3);
    assert_eq!(stats.completed_tasks(), 2);
    assert!((stats.completion_rate() - 200.0 / 3.0).abs() < 1e-9);

    let physics = stats.subject(Subject::Physics).expect("physics").stats();
    assert_eq!(physics.total(), 2);
    assert!((physics.avg_difficulty() - 4.0).abs() < 1e-9);
    assert!((physics.avg_accuracy() - 75.0).abs() < 1e-9);

    let kinematics = stats
        .subject(Subject::Physics)
        .and_then(|s| s.chapter("Kinematics"))
        .expect("kinematics");
    let active: Vec<_> = kinematics.active_microtopics().map(|(name, _)| name).collect();
    assert_eq!(active, vec!["Projectile Motion", "Relative Velocity"]);

    let botany = stats.subject(Subject::Botany).expect("botany").stats();
    assert_eq!(botany.pending(), 1);
    assert!(botany.avg_difficulty().abs() < 1e-9);
}

#[tokio::test]
async fn deleting_tasks_updates_progress() {
    let services = AppServices::new_sqlite(
        "sqlite:file:memdb_planner_delete?mode=memory&cache=shared",
        fixed_clock(),
        Syllabus::builtin(),
    )
    .await
    .expect("connect sqlite");
    let planner = services.planner();

    let task = planner
        .add_task(draft(
            Subject::Zoology,
            "Breathing and Exchange of Gases",
            "Transport of Gases",
            TaskType::Study,
        ))
        .await
        .expect("add task");

    planner.delete_task(task.id()).await.expect("delete");
    assert!(planner.list_tasks().await.expect("list").is_empty());

    let stats = services.progress().progress().await.expect("progress");
    assert_eq!(stats.total_tasks(), 0);
    assert_eq!(stats.active_subjects().count(), 0);
}
