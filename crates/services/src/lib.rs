#![forbid(unsafe_code)]

pub mod app_services;
pub mod error;
pub mod planner_service;
pub mod progress_service;

pub use study_core::Clock;

pub use app_services::{AppServices, load_syllabus};
pub use error::{AppServicesError, PlannerError, ProgressError};
pub use planner_service::{AgendaDay, PlannerService};
pub use progress_service::ProgressService;
