#![forbid(unsafe_code)]

pub mod app_services;
pub mod attachment_service;
pub mod error;
pub mod goal_service;
pub mod interaction_service;
pub mod progress_service;
pub mod report_service;
pub mod rubric_service;

pub use situm_core::{Clock, CrmConfig};

pub use app_services::AppServices;
pub use attachment_service::{AttachmentService, ContactList};
pub use error::{
    AppServicesError, AttachmentError, GoalServiceError, InteractionServiceError,
    ProgressServiceError, ReportServiceError, RubricServiceError,
};
pub use goal_service::{GoalService, GoalSheet};
pub use interaction_service::InteractionService;
pub use progress_service::{EventPlan, ProgressService, TargetProgress};
pub use report_service::ReportService;
pub use rubric_service::{RubricExport, RubricService};
