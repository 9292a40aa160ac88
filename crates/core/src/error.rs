use thiserror::Error;

use crate::model::{ParseIdError, SyllabusError, TaskError};

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Task(#[from] TaskError),
    #[error(transparent)]
    Syllabus(#[from] SyllabusError),
    #[error(transparent)]
    Id(#[from] ParseIdError),
}
