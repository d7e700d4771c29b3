//! Plan selection and editing panel.
//!
//! Lists the saved plans of a business, loads the chosen one into the
//! [`LayoutStore`], and owns the name/active form plus the save action.

use crate::config::EditorConfig;
use crate::layout::Layout;
use crate::repository::{
    FloorPlan, FloorPlanCreate, FloorPlanId, FloorPlanRepository, FloorPlanUpdate, RepositoryError,
};
use crate::store::LayoutStore;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;

/// Errors surfaced by panel actions.
#[derive(Debug, Error)]
pub enum EditorError {
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Another request is still in progress")]
    Busy,
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Editable plan metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanForm {
    pub name: String,
    pub is_active: bool,
}

impl Default for PlanForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            is_active: true,
        }
    }
}

/// Read-only view of the panel's in-flight flag, shareable with the UI.
#[derive(Debug, Clone)]
pub struct LoadingIndicator(Arc<AtomicBool>);

impl LoadingIndicator {
    pub fn is_loading(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Holds the in-flight flag for one repository call. Dropping it clears the flag,
/// so an abandoned future never leaves the panel stuck.
struct LoadingGuard(Arc<AtomicBool>);

impl LoadingGuard {
    fn acquire(flag: &Arc<AtomicBool>) -> Result<Self, EditorError> {
        if flag.swap(true, Ordering::AcqRel) {
            return Err(EditorError::Busy);
        }
        Ok(Self(Arc::clone(flag)))
    }
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Saved-plan list with selection, form, and save.
pub struct FloorPlanPanel<R: FloorPlanRepository + ?Sized> {
    repository: Arc<R>,
    config: EditorConfig,
    plans: Vec<FloorPlan>,
    /// Plan currently loaded in the store, `None` for an unsaved new plan.
    current: Option<FloorPlanId>,
    pub form: PlanForm,
    loading: Arc<AtomicBool>,
    last_error: Option<String>,
}

impl<R: FloorPlanRepository + ?Sized> FloorPlanPanel<R> {
    pub fn new(repository: Arc<R>, config: EditorConfig) -> Self {
        Self {
            repository,
            config,
            plans: Vec::new(),
            current: None,
            form: PlanForm::default(),
            loading: Arc::new(AtomicBool::new(false)),
            last_error: None,
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Plans from the last successful refresh, plus any saved since.
    pub fn plans(&self) -> &[FloorPlan] {
        &self.plans
    }

    pub fn current_plan(&self) -> Option<&str> {
        self.current.as_deref()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::Acquire)
    }

    pub fn loading_indicator(&self) -> LoadingIndicator {
        LoadingIndicator(Arc::clone(&self.loading))
    }

    /// Reload the plan list for the configured business.
    ///
    /// On failure the list is cleared and the error recorded.
    pub async fn refresh(&mut self) -> Result<(), EditorError> {
        let _guard = LoadingGuard::acquire(&self.loading)?;

        let result = self.repository.list(&self.config.business_id).await;
        match result {
            Ok(plans) => {
                log::debug!("Listed {} floor plans for {}", plans.len(), self.config.business_id);
                self.plans = plans;
                self.last_error = None;
                Ok(())
            }
            Err(e) => {
                self.plans.clear();
                Err(self.record(e.into()))
            }
        }
    }

    /// Fetch a plan and load its layout into `store`.
    ///
    /// The store and form are left untouched if the fetch fails.
    pub async fn select(&mut self, id: &str, store: &mut LayoutStore) -> Result<(), EditorError> {
        let _guard = LoadingGuard::acquire(&self.loading)?;

        let result = self.repository.get(id).await;
        let plan = match result {
            Ok(plan) => plan,
            Err(e) => return Err(self.record(e.into())),
        };

        store.load_value(&plan.layout);
        self.form = PlanForm {
            name: plan.name.clone(),
            is_active: plan.is_active,
        };
        self.current = Some(plan.id.clone());
        self.upsert(plan);
        self.last_error = None;
        Ok(())
    }

    /// Start an unsaved plan: reset the form and load an empty canvas.
    pub fn new_plan(&mut self, store: &mut LayoutStore) {
        self.current = None;
        self.form = PlanForm::default();
        self.last_error = None;
        store.load(Layout::new(self.config.canvas));
    }

    /// Persist the form and the store's layout.
    ///
    /// Creates a plan when none is selected, otherwise updates the selected one.
    /// A failed save leaves the form and store as they were.
    pub async fn save(&mut self, store: &LayoutStore) -> Result<FloorPlan, EditorError> {
        let _guard = LoadingGuard::acquire(&self.loading)?;

        let name = self.form.name.trim().to_string();
        if name.is_empty() {
            return Err(self.record(EditorError::Validation("name must not be empty".to_string())));
        }
        let layout = store.serialize();

        let result = match self.current.clone() {
            None => {
                let request = FloorPlanCreate {
                    name,
                    business_id: self.config.business_id.clone(),
                    layout,
                    is_active: self.form.is_active,
                };
                self.repository.create(request).await
            }
            Some(id) => {
                let changes = FloorPlanUpdate {
                    name: Some(name),
                    layout: Some(layout),
                    is_active: Some(self.form.is_active),
                };
                self.repository.update(&id, changes).await
            }
        };

        let plan = match result {
            Ok(plan) => plan,
            Err(e) => return Err(self.record(e.into())),
        };

        self.current = Some(plan.id.clone());
        self.form.name = plan.name.clone();
        self.upsert(plan.clone());
        self.last_error = None;
        Ok(plan)
    }

    fn record(&mut self, error: EditorError) -> EditorError {
        log::warn!("Floor plan panel: {}", error);
        self.last_error = Some(error.to_string());
        error
    }

    fn upsert(&mut self, plan: FloorPlan) {
        match self.plans.iter_mut().find(|p| p.id == plan.id) {
            Some(existing) => *existing = plan,
            None => self.plans.push(plan),
        }
    }
}
