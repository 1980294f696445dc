use std::sync::Arc;

use serde::Serialize;

use prep_core::model::{Catalog, ModuleId, ModuleInfo, ModuleState, QuizId};

use crate::error::ServiceError;
use crate::progress_store::ProgressStore;

/// A module as the module grid shows it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleCard {
    pub info: ModuleInfo,
    pub state: ModuleState,
    /// Latest score on the module's quiz, if taken.
    pub quiz_percentage: Option<u32>,
}

/// Module-browsing flow: opening marks a module viewed, finishing marks it completed.
#[derive(Clone)]
pub struct ModuleService {
    catalog: Arc<Catalog>,
    store: Arc<ProgressStore>,
}

impl ModuleService {
    #[must_use]
    pub fn new(catalog: Arc<Catalog>, store: Arc<ProgressStore>) -> Self {
        Self { catalog, store }
    }

    fn card(&self, info: &ModuleInfo) -> ModuleCard {
        ModuleCard {
            info: info.clone(),
            state: self.store.module_state(&info.id),
            quiz_percentage: self
                .store
                .quiz_result(&QuizId::for_module(&info.id))
                .map(|r| r.percentage),
        }
    }

    fn lookup(&self, module_id: &ModuleId) -> Result<&ModuleInfo, ServiceError> {
        self.catalog
            .module(module_id)
            .ok_or_else(|| ServiceError::UnknownModule(module_id.clone()))
    }

    /// Every catalog module with its current progress, in catalog order.
    #[must_use]
    pub fn list(&self) -> Vec<ModuleCard> {
        self.catalog.modules().iter().map(|m| self.card(m)).collect()
    }

    /// Opens a module, marking it viewed.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::UnknownModule` if the catalog has no such module.
    pub fn open(&self, module_id: &ModuleId) -> Result<ModuleCard, ServiceError> {
        let info = self.lookup(module_id)?;
        self.store.mark_module_viewed(info.id.clone());
        Ok(self.card(info))
    }

    /// Marks a module completed (and therefore viewed).
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::UnknownModule` if the catalog has no such module.
    pub fn complete(&self, module_id: &ModuleId) -> Result<ModuleCard, ServiceError> {
        let info = self.lookup(module_id)?;
        self.store.mark_module_completed(info.id.clone());
        Ok(self.card(info))
    }
}
