use std::path::Path;
use std::sync::Arc;

use storage::repository::Storage;

use crate::attachment_service::AttachmentService;
use crate::error::AppServicesError;
use crate::goal_service::GoalService;
use crate::interaction_service::InteractionService;
use crate::progress_service::ProgressService;
use crate::report_service::ReportService;
use crate::rubric_service::RubricService;
use crate::{Clock, CrmConfig};

/// Assembles the dashboard services over one storage backend.
#[derive(Clone)]
pub struct AppServices {
    config: Arc<CrmConfig>,
    goals: Arc<GoalService>,
    progress: Arc<ProgressService>,
    interactions: Arc<InteractionService>,
    rubric: Arc<RubricService>,
    reports: Arc<ReportService>,
    attachments: Arc<AttachmentService>,
}

impl AppServices {
    /// Build services backed by the CSV stores in `data_dir`.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if the stores cannot be initialized.
    pub async fn new_flat_file(
        data_dir: impl AsRef<Path>,
        clock: Clock,
        config: CrmConfig,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::flat_file(data_dir).await?;
        Ok(Self::from_storage(&storage, clock, config))
    }

    #[must_use]
    pub fn in_memory(clock: Clock) -> Self {
        Self::from_storage(&Storage::in_memory(), clock, CrmConfig::situm())
    }

    #[must_use]
    pub fn from_storage(storage: &Storage, clock: Clock, config: CrmConfig) -> Self {
        let config = Arc::new(config);
        let goals = GoalService::new(clock, Arc::clone(&config), Arc::clone(&storage.goals));
        let progress = ProgressService::new(
            clock,
            Arc::clone(&config),
            Arc::clone(&storage.interactions),
            goals.clone(),
        );
        let interactions = InteractionService::new(
            clock,
            Arc::clone(&config),
            Arc::clone(&storage.interactions),
        );
        let rubric = RubricService::new(Arc::clone(&config), Arc::clone(&storage.interactions));
        let reports = ReportService::new(Arc::clone(&config), Arc::clone(&storage.interactions));

        Self {
            config,
            goals: Arc::new(goals),
            progress: Arc::new(progress),
            interactions: Arc::new(interactions),
            rubric: Arc::new(rubric),
            reports: Arc::new(reports),
            attachments: Arc::new(AttachmentService::new()),
        }
    }

    #[must_use]
    pub fn config(&self) -> Arc<CrmConfig> {
        Arc::clone(&self.config)
    }

    #[must_use]
    pub fn goals(&self) -> Arc<GoalService> {
        Arc::clone(&self.goals)
    }

    #[must_use]
    pub fn progress(&self) -> Arc<ProgressService> {
        Arc::clone(&self.progress)
    }

    #[must_use]
    pub fn interactions(&self) -> Arc<InteractionService> {
        Arc::clone(&self.interactions)
    }

    #[must_use]
    pub fn rubric(&self) -> Arc<RubricService> {
        Arc::clone(&self.rubric)
    }

    #[must_use]
    pub fn reports(&self) -> Arc<ReportService> {
        Arc::clone(&self.reports)
    }

    #[must_use]
    pub fn attachments(&self) -> Arc<AttachmentService> {
        Arc::clone(&self.attachments)
    }
}
