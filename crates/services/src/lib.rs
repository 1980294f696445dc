#![forbid(unsafe_code)]

pub mod app_services;
pub mod dashboard;
pub mod error;
pub mod module_service;
pub mod progress_store;
pub mod quiz_service;

pub use prep_core::Clock;

pub use app_services::AppServices;
pub use dashboard::{Category, CategoryScore, DashboardService, ProfileSummary};
pub use error::{AppServicesError, ServiceError};
pub use module_service::{ModuleCard, ModuleService};
pub use progress_store::{ProgressSnapshot, ProgressStore};
pub use quiz_service::{QuizCard, QuizService, QuizStats};
