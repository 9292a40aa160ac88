use study_core::model::Task;

use super::SqliteRepository;
use super::mapping::{
    map_task_row, status_to_str, subject_to_str, task_id_to_i64, task_type_to_str,
};
use crate::repository::{StorageError, TaskRepository, ensure_unique_ids};

fn conn<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

#[async_trait::async_trait]
impl TaskRepository for SqliteRepository {
    async fn load_tasks(&self) -> Result<Vec<Task>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT id, subject, chapter, microtopic, task_type, date, status,
                   difficulty, total_questions, correct_answers
            FROM tasks
            ORDER BY position ASC, id ASC
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        let mut tasks = Vec::with_capacity(rows.len());
        for row in rows {
            tasks.push(map_task_row(&row)?);
        }
        Ok(tasks)
    }

    async fn replace_tasks(&self, tasks: &[Task]) -> Result<(), StorageError> {
        ensure_unique_ids(tasks)?;

        let mut tx = self.pool.begin().await.map_err(conn)?;

        sqlx::query("DELETE FROM tasks")
            .execute(&mut *tx)
            .await
            .map_err(conn)?;

        for (position, task) in tasks.iter().enumerate() {
            let position = i64::try_from(position)
                .map_err(|_| StorageError::Serialization("position overflow".into()))?;
            let practice = task.practice();

            sqlx::query(
                r"
                INSERT INTO tasks (
                    id, position, subject, chapter, microtopic, task_type, date, status,
                    difficulty, total_questions, correct_answers
                )
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
                ",
            )
            .bind(task_id_to_i64(task.id())?)
            .bind(position)
            .bind(subject_to_str(task.subject()))
            .bind(task.chapter())
            .bind(task.microtopic())
            .bind(task_type_to_str(task.task_type()))
            .bind(task.date())
            .bind(status_to_str(task.status()))
            .bind(task.difficulty().map(i64::from))
            .bind(practice.map(|p| i64::from(p.total_questions())))
            .bind(practice.map(|p| i64::from(p.correct_answers())))
            .execute(&mut *tx)
            .await
            .map_err(conn)?;
        }

        tx.commit().await.map_err(conn)?;
        Ok(())
    }
}
