use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::NaiveDate;
use storage::repository::TaskRepository;
use study_core::model::{Difficulty, PracticeResult, Syllabus, Task, TaskDraft, TaskId};

use crate::Clock;
use crate::error::PlannerError;

/// Tasks scheduled on one calendar date, in list order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AgendaDay {
    pub date: NaiveDate,
    pub tasks: Vec<Task>,
}

/// Creates, completes, and removes planned tasks.
///
/// Every mutation loads the whole list, edits it, and writes it back.
#[derive(Clone)]
pub struct PlannerService {
    clock: Clock,
    syllabus: Arc<Syllabus>,
    tasks: Arc<dyn TaskRepository>,
}

impl PlannerService {
    #[must_use]
    pub fn new(clock: Clock, syllabus: Arc<Syllabus>, tasks: Arc<dyn TaskRepository>) -> Self {
        Self {
            clock,
            syllabus,
            tasks,
        }
    }

    /// Today according to the service clock; the default date for new tasks.
    #[must_use]
    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    #[must_use]
    pub fn syllabus(&self) -> &Syllabus {
        &self.syllabus
    }

    /// Validate a draft against the syllabus and add it as a pending task.
    ///
    /// The new task gets the next free id and is placed after every task on
    /// the same or an earlier date.
    ///
    /// # Errors
    ///
    /// Returns `PlannerError::Task` if the draft names a path outside the syllabus.
    /// Returns `PlannerError::Storage` if the list cannot be loaded or saved.
    pub async fn add_task(&self, draft: TaskDraft) -> Result<Task, PlannerError> {
        let validated = draft.validate(&self.syllabus)?;
        let mut tasks = self.tasks.load_tasks().await?;

        let id = tasks
            .iter()
            .map(Task::id)
            .max()
            .map_or_else(|| TaskId::new(1), TaskId::next);
        let task = validated.assign_id(id);

        let at = tasks.partition_point(|existing| existing.date() <= task.date());
        tasks.insert(at, task.clone());
        self.tasks.replace_tasks(&tasks).await?;

        tracing::info!(
            task_id = %task.id(),
            subject = %task.subject(),
            chapter = task.chapter(),
            microtopic = task.microtopic(),
            task_type = %task.task_type(),
            date = %task.date(),
            "task added"
        );
        Ok(task)
    }

    /// Complete a study or revision task with a 1-5 difficulty rating.
    ///
    /// # Errors
    ///
    /// Returns `PlannerError::Task` for an out-of-range rating, a practice
    /// task, or a task that is already completed.
    /// Returns `PlannerError::NotFound` if no task has `id`.
    /// Returns `PlannerError::Storage` if the list cannot be loaded or saved.
    pub async fn complete_study(&self, id: TaskId, difficulty: u8) -> Result<Task, PlannerError> {
        let difficulty = Difficulty::new(difficulty)?;
        let task = self
            .update(id, |task| task.complete_with_difficulty(difficulty))
            .await?;
        tracing::info!(task_id = %id, difficulty = difficulty.value(), "task completed");
        Ok(task)
    }

    /// Complete a practice task with its quiz result.
    ///
    /// # Errors
    ///
    /// Returns `PlannerError::Task` for an invalid result, a study or revision
    /// task, or a task that is already completed.
    /// Returns `PlannerError::NotFound` if no task has `id`.
    /// Returns `PlannerError::Storage` if the list cannot be loaded or saved.
    pub async fn complete_practice(
        &self,
        id: TaskId,
        total_questions: u32,
        correct_answers: u32,
    ) -> Result<Task, PlannerError> {
        let result = PracticeResult::new(total_questions, correct_answers)?;
        let task = self
            .update(id, |task| task.complete_with_practice(result))
            .await?;
        tracing::info!(
            task_id = %id,
            total_questions,
            correct_answers,
            "practice completed"
        );
        Ok(task)
    }

    /// Remove a task from the plan and return it.
    ///
    /// # Errors
    ///
    /// Returns `PlannerError::NotFound` if no task has `id`.
    /// Returns `PlannerError::Storage` if the list cannot be loaded or saved.
    pub async fn delete_task(&self, id: TaskId) -> Result<Task, PlannerError> {
        let mut tasks = self.tasks.load_tasks().await?;
        let index = position_of(&tasks, id)?;
        let removed = tasks.remove(index);
        self.tasks.replace_tasks(&tasks).await?;
        tracing::info!(task_id = %id, "task deleted");
        Ok(removed)
    }

    /// Every task in stored order.
    ///
    /// # Errors
    ///
    /// Returns `PlannerError::Storage` if the list cannot be loaded.
    pub async fn list_tasks(&self) -> Result<Vec<Task>, PlannerError> {
        Ok(self.tasks.load_tasks().await?)
    }

    /// Tasks grouped by date, earliest date first.
    ///
    /// # Errors
    ///
    /// Returns `PlannerError::Storage` if the list cannot be loaded.
    pub async fn agenda(&self) -> Result<Vec<AgendaDay>, PlannerError> {
        let tasks = self.tasks.load_tasks().await?;
        let mut days: BTreeMap<NaiveDate, Vec<Task>> = BTreeMap::new();
        for task in tasks {
            days.entry(task.date()).or_default().push(task);
        }
        Ok(days
            .into_iter()
            .map(|(date, tasks)| AgendaDay { date, tasks })
            .collect())
    }

    async fn update<F>(&self, id: TaskId, apply: F) -> Result<Task, PlannerError>
    where
        F: FnOnce(&mut Task) -> Result<(), study_core::model::TaskError>,
    {
        let mut tasks = self.tasks.load_tasks().await?;
        let index = position_of(&tasks, id)?;
        apply(&mut tasks[index])?;
        self.tasks.replace_tasks(&tasks).await?;
        Ok(tasks[index].clone())
    }
}

fn position_of(tasks: &[Task], id: TaskId) -> Result<usize, PlannerError> {
    tasks
        .iter()
        .position(|task| task.id() == id)
        .ok_or(PlannerError::NotFound(id))
}
