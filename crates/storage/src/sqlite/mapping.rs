use study_core::model::{
    PersistedTask, PracticeResult, Subject, Task, TaskId, TaskStatus, TaskType,
};
use sqlx::Row;

use crate::repository::StorageError;

fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

fn i64_to_u64(field: &'static str, v: i64) -> Result<u64, StorageError> {
    u64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} sign overflow")))
}

fn i64_to_u32(field: &'static str, v: i64) -> Result<u32, StorageError> {
    u32::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

pub(crate) fn task_id_from_i64(v: i64) -> Result<TaskId, StorageError> {
    Ok(TaskId::new(i64_to_u64("task_id", v)?))
}

pub(crate) fn task_id_to_i64(id: TaskId) -> Result<i64, StorageError> {
    i64::try_from(id.value()).map_err(|_| StorageError::Serialization("task_id overflow".into()))
}

pub(crate) fn subject_to_str(subject: Subject) -> &'static str {
    match subject {
        Subject::Physics => "physics",
        Subject::Chemistry => "chemistry",
        Subject::Botany => "botany",
        Subject::Zoology => "zoology",
    }
}

pub(crate) fn parse_subject(s: &str) -> Result<Subject, StorageError> {
    match s {
        "physics" => Ok(Subject::Physics),
        "chemistry" => Ok(Subject::Chemistry),
        "botany" => Ok(Subject::Botany),
        "zoology" => Ok(Subject::Zoology),
        _ => Err(StorageError::Serialization(format!("invalid subject: {s}"))),
    }
}

pub(crate) fn task_type_to_str(task_type: TaskType) -> &'static str {
    match task_type {
        TaskType::Study => "study",
        TaskType::Revision => "revision",
        TaskType::Practice => "practice",
    }
}

pub(crate) fn parse_task_type(s: &str) -> Result<TaskType, StorageError> {
    match s {
        "study" => Ok(TaskType::Study),
        "revision" => Ok(TaskType::Revision),
        "practice" => Ok(TaskType::Practice),
        _ => Err(StorageError::Serialization(format!("invalid task type: {s}"))),
    }
}

pub(crate) fn status_to_str(status: TaskStatus) -> &'static str {
    match status {
        TaskStatus::Pending => "pending",
        TaskStatus::Completed => "completed",
    }
}

pub(crate) fn parse_status(s: &str) -> Result<TaskStatus, StorageError> {
    match s {
        "pending" => Ok(TaskStatus::Pending),
        "completed" => Ok(TaskStatus::Completed),
        _ => Err(StorageError::Serialization(format!("invalid status: {s}"))),
    }
}

pub(crate) fn map_task_row(row: &sqlx::sqlite::SqliteRow) -> Result<Task, StorageError> {
    let subject: String = row.try_get("subject").map_err(ser)?;
    let task_type: String = row.try_get("task_type").map_err(ser)?;
    let status: String = row.try_get("status").map_err(ser)?;

    let difficulty = row
        .try_get::<Option<i64>, _>("difficulty")
        .map_err(ser)?
        .map(|v| {
            u8::try_from(v)
                .map_err(|_| StorageError::Serialization(format!("invalid difficulty: {v}")))
        })
        .transpose()?;

    let total_questions: Option<i64> = row.try_get("total_questions").map_err(ser)?;
    let correct_answers: Option<i64> = row.try_get("correct_answers").map_err(ser)?;
    // A practice result needs both columns; a half-written pair is dropped.
    let practice = match (total_questions, correct_answers) {
        (Some(total), Some(correct)) => Some(PracticeResult::from_persisted(
            i64_to_u32("total_questions", total)?,
            i64_to_u32("correct_answers", correct)?,
        )),
        _ => None,
    };

    Ok(Task::from_persisted(PersistedTask {
        id: task_id_from_i64(row.try_get::<i64, _>("id").map_err(ser)?)?,
        subject: parse_subject(&subject)?,
        chapter: row.try_get("chapter").map_err(ser)?,
        microtopic: row.try_get("microtopic").map_err(ser)?,
        task_type: parse_task_type(&task_type)?,
        date: row.try_get("date").map_err(ser)?,
        status: parse_status(&status)?,
        difficulty,
        practice,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enum_columns_round_trip() {
        for subject in Subject::ALL {
            assert_eq!(parse_subject(subject_to_str(subject)).unwrap(), subject);
        }
        for task_type in TaskType::ALL {
            assert_eq!(parse_task_type(task_type_to_str(task_type)).unwrap(), task_type);
        }
        for status in [TaskStatus::Pending, TaskStatus::Completed] {
            assert_eq!(parse_status(status_to_str(status)).unwrap(), status);
        }
    }

    #[test]
    fn unknown_enum_values_are_serialization_errors() {
        assert!(matches!(parse_subject("maths"), Err(StorageError::Serialization(_))));
        assert!(matches!(parse_task_type("Study"), Err(StorageError::Serialization(_))));
        assert!(matches!(parse_status("done"), Err(StorageError::Serialization(_))));
    }

    #[test]
    fn ids_reject_negative_values() {
        assert!(task_id_from_i64(-1).is_err());
        assert_eq!(task_id_to_i64(TaskId::new(12)).unwrap(), 12);
        assert!(task_id_to_i64(TaskId::new(u64::MAX)).is_err());
    }
}
