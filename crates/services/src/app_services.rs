use std::sync::Arc;

use tracing::warn;

use prep_core::model::Catalog;
use prep_core::{Clock, ScoringPolicy};

use crate::dashboard::DashboardService;
use crate::error::AppServicesError;
use crate::module_service::ModuleService;
use crate::progress_store::ProgressStore;
use crate::quiz_service::QuizService;

/// Assembles the view-facing services around one shared `ProgressStore`.
///
/// Built once at startup and handed to every consumer; there is no global.
#[derive(Clone)]
pub struct AppServices {
    catalog: Arc<Catalog>,
    store: Arc<ProgressStore>,
    modules: Arc<ModuleService>,
    quizzes: Arc<QuizService>,
    dashboard: Arc<DashboardService>,
}

impl AppServices {
    #[must_use]
    pub fn new(catalog: Catalog, policy: ScoringPolicy, clock: Clock) -> Self {
        let derived = ScoringPolicy::for_catalog(&catalog);
        if policy.total_modules != derived.total_modules
            || policy.total_quizzes != derived.total_quizzes
        {
            warn!(
                total_modules = policy.total_modules,
                catalog_modules = derived.total_modules,
                total_quizzes = policy.total_quizzes,
                catalog_quizzes = derived.total_quizzes,
                "scoring denominators differ from catalog size"
            );
        }

        let catalog = Arc::new(catalog);
        let store = Arc::new(ProgressStore::new(policy));
        let modules = Arc::new(ModuleService::new(Arc::clone(&catalog), Arc::clone(&store)));
        let quizzes = Arc::new(QuizService::new(
            clock,
            Arc::clone(&catalog),
            Arc::clone(&store),
        ));
        let dashboard = Arc::new(DashboardService::new(Arc::clone(&store)));

        Self {
            catalog,
            store,
            modules,
            quizzes,
            dashboard,
        }
    }

    /// Services over the embedded catalog, with catalog-derived denominators.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError::Catalog` if the embedded catalog is invalid.
    pub fn builtin(clock: Clock) -> Result<Self, AppServicesError> {
        let catalog = Catalog::builtin()?;
        let policy = ScoringPolicy::for_catalog(&catalog);
        Ok(Self::new(catalog, policy, clock))
    }

    #[must_use]
    pub fn catalog(&self) -> Arc<Catalog> {
        Arc::clone(&self.catalog)
    }

    #[must_use]
    pub fn progress(&self) -> Arc<ProgressStore> {
        Arc::clone(&self.store)
    }

    #[must_use]
    pub fn modules(&self) -> Arc<ModuleService> {
        Arc::clone(&self.modules)
    }

    #[must_use]
    pub fn quizzes(&self) -> Arc<QuizService> {
        Arc::clone(&self.quizzes)
    }

    #[must_use]
    pub fn dashboard(&self) -> Arc<DashboardService> {
        Arc::clone(&self.dashboard)
    }
}
