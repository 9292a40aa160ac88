use chrono::Utc;
use sqlx::SqlitePool;

use super::SqliteInitError;

/// One schema version: statements applied together in a single transaction.
struct Migration {
    version: i64,
    statements: &'static [&'static str],
}

const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    statements: &[
        r"
        CREATE TABLE IF NOT EXISTS tasks (
            id INTEGER PRIMARY KEY,
            position INTEGER NOT NULL CHECK (position >= 0),
            subject TEXT NOT NULL,
            chapter TEXT NOT NULL,
            microtopic TEXT NOT NULL,
            task_type TEXT NOT NULL,
            date TEXT NOT NULL,
            status TEXT NOT NULL,
            difficulty INTEGER CHECK (difficulty IS NULL OR difficulty BETWEEN 0 AND 255),
            total_questions INTEGER CHECK (total_questions IS NULL OR total_questions >= 0),
            correct_answers INTEGER CHECK (correct_answers IS NULL OR correct_answers >= 0)
        )
        ",
        "CREATE INDEX IF NOT EXISTS idx_tasks_position ON tasks (position)",
    ],
}];

async fn applied_versions(pool: &SqlitePool) -> Result<Vec<i64>, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT version FROM schema_migrations ORDER BY version")
        .fetch_all(pool)
        .await
}

/// Apply every migration whose version is not in `schema_migrations`, lowest first.
pub(crate) async fn apply_pending(pool: &SqlitePool) -> Result<(), SqliteInitError> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL
        )",
    )
    .execute(pool)
    .await?;

    let applied = applied_versions(pool).await?;
    for migration in MIGRATIONS.iter().filter(|m| !applied.contains(&m.version)) {
        let mut tx = pool.begin().await?;
        for statement in migration.statements {
            sqlx::query(*statement).execute(&mut *tx).await?;
        }
        sqlx::query("INSERT INTO schema_migrations (version, applied_at) VALUES (?1, ?2)")
            .bind(migration.version)
            .bind(Utc::now())
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
    }

    Ok(())
}
