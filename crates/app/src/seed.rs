//! Demo plan for trying the dashboard on an empty database.

use chrono::{Days, NaiveDate};
use services::{PlannerError, PlannerService};
use study_core::model::{Subject, Task, TaskDraft, TaskType};

/// First microtopic of every chapter, walked subject by subject.
fn demo_paths(planner: &PlannerService) -> Vec<(Subject, String, String)> {
    let syllabus = planner.syllabus();
    Subject::ALL
        .into_iter()
        .flat_map(|subject| {
            syllabus.chapters(subject).iter().filter_map(move |chapter| {
                chapter
                    .microtopics()
                    .first()
                    .map(|topic| (subject, chapter.name().to_string(), topic.clone()))
            })
        })
        .collect()
}

/// Add `count` tasks starting at `start`, three per day, and complete the
/// first half with varied feedback.
///
/// # Errors
///
/// Returns `PlannerError` if any task cannot be added or completed.
pub async fn seed_demo(
    planner: &PlannerService,
    start: NaiveDate,
    count: u32,
) -> Result<Vec<Task>, PlannerError> {
    let paths = demo_paths(planner);
    if paths.is_empty() {
        return Ok(Vec::new());
    }

    let mut seeded = Vec::with_capacity(count as usize);
    for i in 0..count {
        let (subject, chapter, microtopic) = paths[(i as usize * 7) % paths.len()].clone();
        let task_type = TaskType::ALL[i as usize % TaskType::ALL.len()];
        let date = start
            .checked_add_days(Days::new(u64::from(i / 3)))
            .unwrap_or(NaiveDate::MAX);
        let task = planner
            .add_task(TaskDraft {
                subject,
                chapter,
                microtopic,
                task_type,
                date,
            })
            .await?;

        let task = if i < count / 2 {
            if task_type.takes_difficulty() {
                // Ratings cycle through 1..=5.
                let rating = u8::try_from(i % 5 + 1).unwrap_or(3);
                planner.complete_study(task.id(), rating).await?
            } else {
                planner.complete_practice(task.id(), 20, 10 + i % 11).await?
            }
        } else {
            task
        };
        seeded.push(task);
    }

    tracing::info!(count = seeded.len(), %start, "seeded demo plan");
    Ok(seeded)
}

#[cfg(test)]
mod tests {
    use super::*;

    use services::AppServices;
    use study_core::aggregate;
    use study_core::model::Syllabus;
    use study_core::time::{fixed_clock, fixed_today};

    #[tokio::test]
    async fn seeds_tasks_and_completes_half() {
        let services = AppServices::in_memory(fixed_clock(), Syllabus::builtin());
        let planner = services.planner();

        let seeded = seed_demo(&planner, fixed_today(), 12).await.unwrap();
        assert_eq!(seeded.len(), 12);
        assert_eq!(seeded.iter().filter(|t| t.is_completed()).count(), 6);

        let stored = planner.list_tasks().await.unwrap();
        let stats = aggregate(planner.syllabus(), &stored);
        assert_eq!(stats.total_tasks(), 12);
        assert_eq!(stats.unresolved_tasks(), 0);
        assert!((stats.completion_rate() - 50.0).abs() < 1e-9);
        assert_eq!(stored.last().unwrap().date(), fixed_clock().days_ahead(3));
    }

    #[tokio::test]
    async fn empty_syllabus_seeds_nothing() {
        let services = AppServices::in_memory(fixed_clock(), Syllabus::new());
        let seeded = seed_demo(&services.planner(), fixed_today(), 5)
            .await
            .unwrap();
        assert!(seeded.is_empty());
    }
}
