//! Floor plan persistence.
//!
//! The designer talks to a [`FloorPlanRepository`]; the layout always travels as one
//! complete document, there is no per-element update.

mod memory;

#[cfg(not(target_arch = "wasm32"))]
mod file;
#[cfg(not(target_arch = "wasm32"))]
mod http;

pub use memory::MemoryRepository;

#[cfg(not(target_arch = "wasm32"))]
pub use file::FileRepository;
#[cfg(not(target_arch = "wasm32"))]
pub use http::{HttpRepository, HttpRepositoryConfig};

use crate::layout::Layout;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Floor plan identifier, assigned by the repository.
pub type FloorPlanId = String;

/// Repository errors.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Floor plan not found: {0}")]
    NotFound(String),
    #[error("Invalid floor plan: {0}")]
    Invalid(String),
    #[error("Request rejected ({status}): {message}")]
    Rejected { status: u16, message: String },
    #[error("Transport error: {0}")]
    Transport(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Repository error: {0}")]
    Other(String),
}

impl From<serde_json::Error> for RepositoryError {
    fn from(e: serde_json::Error) -> Self {
        RepositoryError::Serialization(e.to_string())
    }
}

/// Result type for repository operations.
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Boxed future for async operations (compatible with WASM).
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// A persisted floor plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FloorPlan {
    pub id: FloorPlanId,
    pub business_id: String,
    pub name: String,
    /// The layout document as stored. Read it through [`FloorPlan::layout`].
    #[serde(default)]
    pub layout: Value,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl FloorPlan {
    /// Build a new plan from a create request.
    pub fn from_create(id: FloorPlanId, request: FloorPlanCreate, now: DateTime<Utc>) -> RepositoryResult<Self> {
        request.validate()?;
        Ok(Self {
            id,
            business_id: request.business_id,
            name: request.name.trim().to_string(),
            layout: normalized(request.layout)?,
            is_active: request.is_active,
            created_at: Some(now),
            updated_at: Some(now),
        })
    }

    /// Apply a partial update. The layout, when present, replaces the stored one.
    pub fn apply_update(&mut self, changes: FloorPlanUpdate, now: DateTime<Utc>) -> RepositoryResult<()> {
        changes.validate()?;
        if let Some(name) = changes.name {
            self.name = name.trim().to_string();
        }
        if let Some(layout) = changes.layout {
            self.layout = normalized(layout)?;
        }
        if let Some(is_active) = changes.is_active {
            self.is_active = is_active;
        }
        self.updated_at = Some(now);
        Ok(())
    }

    /// The stored layout, or an empty default canvas if it is malformed.
    pub fn layout(&self) -> Layout {
        Layout::from_value_or_default(&self.layout)
    }
}

/// Stored form of a layout, with its invariants restored first.
fn normalized(mut layout: Layout) -> RepositoryResult<Value> {
    if layout.normalize() {
        log::warn!("Normalized incoming layout before storing it");
    }
    Ok(layout.to_value()?)
}

/// Request to create a floor plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FloorPlanCreate {
    pub name: String,
    pub business_id: String,
    pub layout: Layout,
    #[serde(default)]
    pub is_active: bool,
}

impl FloorPlanCreate {
    pub fn validate(&self) -> RepositoryResult<()> {
        validate_name(&self.name)?;
        if self.business_id.trim().is_empty() {
            return Err(RepositoryError::Invalid("business id must not be empty".to_string()));
        }
        Ok(())
    }
}

/// Partial update of a floor plan. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FloorPlanUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<Layout>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

impl FloorPlanUpdate {
    pub fn validate(&self) -> RepositoryResult<()> {
        match &self.name {
            Some(name) => validate_name(name),
            None => Ok(()),
        }
    }
}

fn validate_name(name: &str) -> RepositoryResult<()> {
    if name.trim().is_empty() {
        return Err(RepositoryError::Invalid("name must not be empty".to_string()));
    }
    Ok(())
}

/// Trait for floor plan persistence backends.
///
/// Implementations can keep plans in memory, on disk, or behind the floor plan API.
pub trait FloorPlanRepository: Send + Sync {
    /// Create a plan and return it with its assigned id.
    fn create(&self, request: FloorPlanCreate) -> BoxFuture<'_, RepositoryResult<FloorPlan>>;

    /// Update a plan and return the stored result.
    fn update(&self, id: &str, changes: FloorPlanUpdate) -> BoxFuture<'_, RepositoryResult<FloorPlan>>;

    /// Fetch a plan with its full layout.
    fn get(&self, id: &str) -> BoxFuture<'_, RepositoryResult<FloorPlan>>;

    /// List the plans of a business.
    fn list(&self, business_id: &str) -> BoxFuture<'_, RepositoryResult<Vec<FloorPlan>>>;
}

/// Sort order for listings: oldest first, then by name.
pub fn sort_plans(plans: &mut [FloorPlan]) {
    plans.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.name.cmp(&b.name)));
}
