use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::model::{Subject, Syllabus, TaskId};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum TaskError {
    #[error("chapter {chapter:?} is not part of the {subject} syllabus")]
    UnknownChapter { subject: Subject, chapter: String },

    #[error("microtopic {microtopic:?} is not part of chapter {chapter:?}")]
    UnknownMicrotopic { chapter: String, microtopic: String },

    #[error("difficulty must be between 1 and 5, got {0}")]
    InvalidDifficulty(u8),

    #[error("a practice result needs at least one question")]
    NoQuestions,

    #[error("correct answers ({correct}) exceed total questions ({total})")]
    TooManyCorrect { correct: u32, total: u32 },

    #[error("task {0} is already completed")]
    AlreadyCompleted(TaskId),

    #[error("{task_type} tasks are completed with {expected}")]
    FeedbackMismatch {
        task_type: TaskType,
        expected: &'static str,
    },

    #[error("unknown task type: {0}")]
    UnknownTaskType(String),
}

//
// ─── TASK TYPE / STATUS ────────────────────────────────────────────────────────
//

/// Kind of planned work. Decides which completion feedback a task takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskType {
    Study,
    Revision,
    Practice,
}

impl TaskType {
    pub const ALL: [TaskType; 3] = [TaskType::Study, TaskType::Revision, TaskType::Practice];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            TaskType::Study => "Study",
            TaskType::Revision => "Revision",
            TaskType::Practice => "Practice",
        }
    }

    /// Study and revision tasks are completed with a difficulty rating;
    /// practice tasks with a quiz result.
    #[must_use]
    pub fn takes_difficulty(self) -> bool {
        matches!(self, TaskType::Study | TaskType::Revision)
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskType {
    type Err = TaskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        TaskType::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| TaskError::UnknownTaskType(trimmed.to_string()))
    }
}

/// Pending → Completed, exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskStatus {
    Pending,
    Completed,
}

//
// ─── FEEDBACK ──────────────────────────────────────────────────────────────────
//

/// Self-reported difficulty of a study or revision task, 1 (easy) to 5 (hard).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Difficulty(u8);

impl Difficulty {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    /// # Errors
    ///
    /// Returns `TaskError::InvalidDifficulty` outside 1..=5.
    pub fn new(value: u8) -> Result<Self, TaskError> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(TaskError::InvalidDifficulty(value))
        }
    }

    #[must_use]
    pub fn value(self) -> u8 {
        self.0
    }
}

/// Outcome of a practice quiz.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PracticeResult {
    total_questions: u32,
    correct_answers: u32,
}

impl PracticeResult {
    /// # Errors
    ///
    /// Returns `TaskError::NoQuestions` if `total_questions` is zero and
    /// `TaskError::TooManyCorrect` if `correct_answers > total_questions`.
    pub fn new(total_questions: u32, correct_answers: u32) -> Result<Self, TaskError> {
        if total_questions == 0 {
            return Err(TaskError::NoQuestions);
        }
        if correct_answers > total_questions {
            return Err(TaskError::TooManyCorrect {
                correct: correct_answers,
                total: total_questions,
            });
        }
        Ok(Self {
            total_questions,
            correct_answers,
        })
    }

    /// Rehydrate from storage without re-checking the bounds.
    #[must_use]
    pub fn from_persisted(total_questions: u32, correct_answers: u32) -> Self {
        Self {
            total_questions,
            correct_answers,
        }
    }

    #[must_use]
    pub fn total_questions(self) -> u32 {
        self.total_questions
    }

    #[must_use]
    pub fn correct_answers(self) -> u32 {
        self.correct_answers
    }

    /// Percentage of correct answers, or `None` when no questions were recorded.
    #[must_use]
    pub fn accuracy(self) -> Option<f64> {
        if self.total_questions == 0 {
            return None;
        }
        Some(f64::from(self.correct_answers) / f64::from(self.total_questions) * 100.0)
    }
}

//
// ─── DRAFT ─────────────────────────────────────────────────────────────────────
//

/// A task as entered by the user, before it is placed on the plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDraft {
    pub subject: Subject,
    pub chapter: String,
    pub microtopic: String,
    pub task_type: TaskType,
    pub date: NaiveDate,
}

impl TaskDraft {
    /// Check that the draft points at an existing syllabus entry.
    ///
    /// # Errors
    ///
    /// Returns `TaskError::UnknownChapter` or `TaskError::UnknownMicrotopic`.
    pub fn validate(self, syllabus: &Syllabus) -> Result<ValidatedTask, TaskError> {
        let chapter = syllabus
            .chapter(self.subject, &self.chapter)
            .ok_or_else(|| TaskError::UnknownChapter {
                subject: self.subject,
                chapter: self.chapter.clone(),
            })?;
        if !chapter.contains(&self.microtopic) {
            return Err(TaskError::UnknownMicrotopic {
                chapter: self.chapter,
                microtopic: self.microtopic,
            });
        }
        Ok(ValidatedTask { draft: self })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedTask {
    draft: TaskDraft,
}

impl ValidatedTask {
    /// Place the task on the plan as `Pending`.
    #[must_use]
    pub fn assign_id(self, id: TaskId) -> Task {
        let TaskDraft {
            subject,
            chapter,
            microtopic,
            task_type,
            date,
        } = self.draft;
        Task {
            id,
            subject,
            chapter,
            microtopic,
            task_type,
            date,
            status: TaskStatus::Pending,
            difficulty: None,
            practice: None,
        }
    }
}

//
// ─── TASK ──────────────────────────────────────────────────────────────────────
//

/// Flat persisted shape of a task. Feedback fields are taken as stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTask {
    pub id: TaskId,
    pub subject: Subject,
    pub chapter: String,
    pub microtopic: String,
    pub task_type: TaskType,
    pub date: NaiveDate,
    pub status: TaskStatus,
    pub difficulty: Option<u8>,
    pub practice: Option<PracticeResult>,
}

/// A single planned unit of work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    id: TaskId,
    subject: Subject,
    chapter: String,
    microtopic: String,
    task_type: TaskType,
    date: NaiveDate,
    status: TaskStatus,
    difficulty: Option<u8>,
    practice: Option<PracticeResult>,
}

impl Task {
    /// Rehydrate a task from storage.
    ///
    /// Stored records are not re-validated; consumers such as the progress
    /// aggregator tolerate stray or missing feedback.
    #[must_use]
    pub fn from_persisted(parts: PersistedTask) -> Self {
        Self {
            id: parts.id,
            subject: parts.subject,
            chapter: parts.chapter,
            microtopic: parts.microtopic,
            task_type: parts.task_type,
            date: parts.date,
            status: parts.status,
            difficulty: parts.difficulty,
            practice: parts.practice,
        }
    }

    #[must_use]
    pub fn to_persisted(&self) -> PersistedTask {
        PersistedTask {
            id: self.id,
            subject: self.subject,
            chapter: self.chapter.clone(),
            microtopic: self.microtopic.clone(),
            task_type: self.task_type,
            date: self.date,
            status: self.status,
            difficulty: self.difficulty,
            practice: self.practice,
        }
    }

    /// Complete a study or revision task with a difficulty rating.
    ///
    /// # Errors
    ///
    /// Returns `TaskError::AlreadyCompleted` or `TaskError::FeedbackMismatch`
    /// for practice tasks.
    pub fn complete_with_difficulty(&mut self, difficulty: Difficulty) -> Result<(), TaskError> {
        self.ensure_pending()?;
        if !self.task_type.takes_difficulty() {
            return Err(TaskError::FeedbackMismatch {
                task_type: self.task_type,
                expected: "a practice result",
            });
        }
        self.status = TaskStatus::Completed;
        self.difficulty = Some(difficulty.value());
        self.practice = None;
        Ok(())
    }

    /// Complete a practice task with its quiz result.
    ///
    /// # Errors
    ///
    /// Returns `TaskError::AlreadyCompleted` or `TaskError::FeedbackMismatch`
    /// for study and revision tasks.
    pub fn complete_with_practice(&mut self, result: PracticeResult) -> Result<(), TaskError> {
        self.ensure_pending()?;
        if self.task_type.takes_difficulty() {
            return Err(TaskError::FeedbackMismatch {
                task_type: self.task_type,
                expected: "a difficulty rating",
            });
        }
        self.status = TaskStatus::Completed;
        self.practice = Some(result);
        self.difficulty = None;
        Ok(())
    }

    fn ensure_pending(&self) -> Result<(), TaskError> {
        match self.status {
            TaskStatus::Pending => Ok(()),
            TaskStatus::Completed => Err(TaskError::AlreadyCompleted(self.id)),
        }
    }

    #[must_use]
    pub fn id(&self) -> TaskId {
        self.id
    }

    #[must_use]
    pub fn subject(&self) -> Subject {
        self.subject
    }

    #[must_use]
    pub fn chapter(&self) -> &str {
        &self.chapter
    }

    #[must_use]
    pub fn microtopic(&self) -> &str {
        &self.microtopic
    }

    #[must_use]
    pub fn task_type(&self) -> TaskType {
        self.task_type
    }

    #[must_use]
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    #[must_use]
    pub fn status(&self) -> TaskStatus {
        self.status
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.status == TaskStatus::Completed
    }

    #[must_use]
    pub fn difficulty(&self) -> Option<u8> {
        self.difficulty
    }

    #[must_use]
    pub fn practice(&self) -> Option<PracticeResult> {
        self.practice
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
