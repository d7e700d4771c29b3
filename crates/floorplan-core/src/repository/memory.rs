//! In-memory repository implementation.

use super::{
    BoxFuture, FloorPlan, FloorPlanCreate, FloorPlanRepository, FloorPlanUpdate, RepositoryError,
    RepositoryResult, sort_plans,
};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::RwLock;
use uuid::Uuid;

/// In-memory repository for testing and offline use.
#[derive(Default)]
pub struct MemoryRepository {
    plans: RwLock<HashMap<String, FloorPlan>>,
}

impl MemoryRepository {
    /// Create a new empty repository.
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_error(e: impl std::fmt::Display) -> RepositoryError {
    RepositoryError::Other(format!("Lock error: {}", e))
}

impl FloorPlanRepository for MemoryRepository {
    fn create(&self, request: FloorPlanCreate) -> BoxFuture<'_, RepositoryResult<FloorPlan>> {
        Box::pin(async move {
            let plan = FloorPlan::from_create(Uuid::new_v4().to_string(), request, Utc::now())?;
            let mut plans = self.plans.write().map_err(lock_error)?;
            plans.insert(plan.id.clone(), plan.clone());
            log::info!("Created floor plan {} ({})", plan.id, plan.name);
            Ok(plan)
        })
    }

    fn update(&self, id: &str, changes: FloorPlanUpdate) -> BoxFuture<'_, RepositoryResult<FloorPlan>> {
        let id = id.to_string();
        Box::pin(async move {
            let mut plans = self.plans.write().map_err(lock_error)?;
            let plan = plans
                .get_mut(&id)
                .ok_or_else(|| RepositoryError::NotFound(id.clone()))?;
            plan.apply_update(changes, Utc::now())?;
            log::info!("Updated floor plan {}", id);
            Ok(plan.clone())
        })
    }

    fn get(&self, id: &str) -> BoxFuture<'_, RepositoryResult<FloorPlan>> {
        let id = id.to_string();
        Box::pin(async move {
            let plans = self.plans.read().map_err(lock_error)?;
            plans
                .get(&id)
                .cloned()
                .ok_or(RepositoryError::NotFound(id))
        })
    }

    fn list(&self, business_id: &str) -> BoxFuture<'_, RepositoryResult<Vec<FloorPlan>>> {
        let business_id = business_id.to_string();
        Box::pin(async move {
            let plans = self.plans.read().map_err(lock_error)?;
            let mut result: Vec<FloorPlan> = plans
                .values()
                .filter(|plan| plan.business_id == business_id)
                .cloned()
                .collect();
            sort_plans(&mut result);
            Ok(result)
        })
    }
}
