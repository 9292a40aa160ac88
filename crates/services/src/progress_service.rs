use std::sync::Arc;

use storage::repository::TaskRepository;
use study_core::model::Syllabus;
use study_core::{ProgressStats, aggregate};

use crate::error::ProgressError;

/// Computes dashboard statistics from the current task list.
#[derive(Clone)]
pub struct ProgressService {
    syllabus: Arc<Syllabus>,
    tasks: Arc<dyn TaskRepository>,
}

impl ProgressService {
    #[must_use]
    pub fn new(syllabus: Arc<Syllabus>, tasks: Arc<dyn TaskRepository>) -> Self {
        Self { syllabus, tasks }
    }

    /// Load a snapshot of the task list and aggregate it against the syllabus.
    ///
    /// Tasks whose subject, chapter or microtopic no longer exists in the
    /// syllabus count toward the overall totals only.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::Storage` if the task list cannot be loaded.
    pub async fn progress(&self) -> Result<ProgressStats, ProgressError> {
        let tasks = self.tasks.load_tasks().await?;
        let stats = aggregate(&self.syllabus, &tasks);

        let unresolved = stats.unresolved_tasks();
        if unresolved > 0 {
            tracing::warn!(
                unresolved,
                total = stats.total_tasks(),
                "tasks outside the syllabus are excluded from the breakdown"
            );
        }
        tracing::debug!(
            total = stats.total_tasks(),
            completed = stats.completed_tasks(),
            "progress aggregated"
        );
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use storage::repository::InMemoryRepository;
    use study_core::model::{
        Difficulty, PersistedTask, Subject, Task, TaskDraft, TaskId, TaskStatus, TaskType,
    };
    use study_core::time::fixed_today;

    fn planned(id: u64, chapter: &str, microtopic: &str) -> Task {
        TaskDraft {
            subject: Subject::Botany,
            chapter: chapter.into(),
            microtopic: microtopic.into(),
            task_type: TaskType::Study,
            date: fixed_today(),
        }
        .validate(&Syllabus::builtin())
        .unwrap()
        .assign_id(TaskId::new(id))
    }

    #[tokio::test]
    async fn empty_store_yields_zeroed_tree() {
        let service = ProgressService::new(
            Arc::new(Syllabus::builtin()),
            Arc::new(InMemoryRepository::new()),
        );
        let stats = service.progress().await.unwrap();
        assert_eq!(stats.total_tasks(), 0);
        assert!(stats.completion_rate().abs() < f64::EPSILON);
        assert_eq!(stats.subjects().count(), 4);
    }

    #[tokio::test]
    async fn progress_reflects_stored_tasks() {
        let repo = Arc::new(InMemoryRepository::new());
        let mut done = planned(1, "Cell Cycle and Cell Division", "Mitosis");
        done.complete_with_difficulty(Difficulty::new(2).unwrap())
            .unwrap();
        let stray = Task::from_persisted(PersistedTask {
            id: TaskId::new(2),
            subject: Subject::Botany,
            chapter: "Dropped Chapter".into(),
            microtopic: "Gone".into(),
            task_type: TaskType::Study,
            date: fixed_today(),
            status: TaskStatus::Completed,
            difficulty: Some(5),
            practice: None,
        });
        repo.replace_tasks(&[done, stray]).await.unwrap();

        let service = ProgressService::new(Arc::new(Syllabus::builtin()), repo);
        let stats = service.progress().await.unwrap();

        assert_eq!(stats.total_tasks(), 2);
        assert_eq!(stats.completed_tasks(), 2);
        assert_eq!(stats.resolved_tasks(), 1);
        assert_eq!(stats.unresolved_tasks(), 1);

        let botany = stats.subject(Subject::Botany).unwrap().stats();
        assert_eq!(botany.total(), 1);
        assert!((botany.avg_difficulty() - 2.0).abs() < f64::EPSILON);
        let mitosis = stats
            .microtopic(Subject::Botany, "Cell Cycle and Cell Division", "Mitosis")
            .unwrap();
        assert!((mitosis.completion_rate() - 100.0).abs() < f64::EPSILON);
    }
}
