mod ids;
mod subject;
mod syllabus;
mod task;

pub use ids::{ParseIdError, TaskId};
pub use subject::{Subject, UnknownSubject};
pub use syllabus::{ChapterOutline, Syllabus, SyllabusError};
pub use task::{
    Difficulty, PersistedTask, PracticeResult, Task, TaskDraft, TaskError, TaskStatus, TaskType,
    ValidatedTask,
};
