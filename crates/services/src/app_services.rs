use std::path::Path;
use std::sync::Arc;

use storage::repository::Storage;
use study_core::model::Syllabus;

use crate::Clock;
use crate::error::AppServicesError;
use crate::planner_service::PlannerService;
use crate::progress_service::ProgressService;

/// Assembles app-facing services over one storage backend and syllabus.
#[derive(Clone)]
pub struct AppServices {
    syllabus: Arc<Syllabus>,
    planner: Arc<PlannerService>,
    progress: Arc<ProgressService>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn new_sqlite(
        db_url: &str,
        clock: Clock,
        syllabus: Syllabus,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        tracing::debug!(db_url, "sqlite storage ready");
        Ok(Self::from_storage(&storage, clock, syllabus))
    }

    /// Build services over an in-memory task list.
    #[must_use]
    pub fn in_memory(clock: Clock, syllabus: Syllabus) -> Self {
        Self::from_storage(&Storage::in_memory(), clock, syllabus)
    }

    #[must_use]
    pub fn from_storage(storage: &Storage, clock: Clock, syllabus: Syllabus) -> Self {
        let syllabus = Arc::new(syllabus);
        let planner = Arc::new(PlannerService::new(
            clock,
            Arc::clone(&syllabus),
            Arc::clone(&storage.tasks),
        ));
        let progress = Arc::new(ProgressService::new(
            Arc::clone(&syllabus),
            Arc::clone(&storage.tasks),
        ));
        Self {
            syllabus,
            planner,
            progress,
        }
    }

    #[must_use]
    pub fn syllabus(&self) -> Arc<Syllabus> {
        Arc::clone(&self.syllabus)
    }

    #[must_use]
    pub fn planner(&self) -> Arc<PlannerService> {
        Arc::clone(&self.planner)
    }

    #[must_use]
    pub fn progress(&self) -> Arc<ProgressService> {
        Arc::clone(&self.progress)
    }
}

/// Load the syllabus from a JSON file, or the built-in one when `path` is `None`.
///
/// # Errors
///
/// Returns `AppServicesError::SyllabusFile` if the file cannot be read and
/// `AppServicesError::Syllabus` if its contents are invalid.
pub fn load_syllabus(path: Option<&Path>) -> Result<Syllabus, AppServicesError> {
    let Some(path) = path else {
        return Ok(Syllabus::builtin());
    };
    let raw = std::fs::read_to_string(path).map_err(|source| AppServicesError::SyllabusFile {
        path: path.display().to_string(),
        source,
    })?;
    let syllabus = Syllabus::from_json(&raw)?;
    tracing::info!(
        path = %path.display(),
        microtopics = syllabus.microtopic_count(),
        "loaded syllabus"
    );
    Ok(syllabus)
}

#[cfg(test)]
mod tests {
    use super::*;

    use study_core::model::{Subject, SyllabusError, TaskDraft, TaskType};
    use study_core::time::{fixed_clock, fixed_today};

    #[tokio::test]
    async fn services_share_one_task_list() {
        let services = AppServices::in_memory(fixed_clock(), Syllabus::builtin());
        services
            .planner()
            .add_task(TaskDraft {
                subject: Subject::Chemistry,
                chapter: "Atomic Structure".into(),
                microtopic: "Bohr Model".into(),
                task_type: TaskType::Study,
                date: fixed_today(),
            })
            .await
            .unwrap();

        let stats = services.progress().progress().await.unwrap();
        assert_eq!(stats.total_tasks(), 1);
        assert_eq!(stats.resolved_tasks(), 1);
    }

    #[test]
    fn load_syllabus_defaults_to_builtin() {
        assert_eq!(load_syllabus(None).unwrap(), Syllabus::builtin());
    }

    #[test]
    fn load_syllabus_reports_missing_file() {
        let err = load_syllabus(Some(Path::new("/nonexistent/syllabus.json"))).unwrap_err();
        assert!(matches!(err, AppServicesError::SyllabusFile { .. }));
    }

    #[test]
    fn load_syllabus_reads_custom_file() {
        let path = std::env::temp_dir().join(format!("syllabus-{}.json", std::process::id()));
        std::fs::write(
            &path,
            r#"{ "Physics": [ { "name": "Optics", "microtopics": ["Lenses"] } ] }"#,
        )
        .unwrap();
        let syllabus = load_syllabus(Some(&path)).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert!(syllabus.contains(Subject::Physics, "Optics", "Lenses"));
        assert_eq!(syllabus.microtopic_count(), 1);
    }

    #[test]
    fn load_syllabus_rejects_bad_documents() {
        let path = std::env::temp_dir().join(format!("syllabus-bad-{}.json", std::process::id()));
        std::fs::write(&path, r#"{ "Maths": [] }"#).unwrap();
        let err = load_syllabus(Some(&path)).unwrap_err();
        std::fs::remove_file(&path).unwrap();

        assert!(matches!(
            err,
            AppServicesError::Syllabus(SyllabusError::UnknownSubject(_))
        ));
    }
}
