//! File-based repository for native platforms.

use super::{
    BoxFuture, FloorPlan, FloorPlanCreate, FloorPlanRepository, FloorPlanUpdate, RepositoryError,
    RepositoryResult, sort_plans,
};
use chrono::Utc;
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Stores each floor plan as a JSON file in a directory.
pub struct FileRepository {
    /// Base directory for plan files.
    base_path: PathBuf,
}

impl FileRepository {
    /// Create a file repository with the given base directory.
    ///
    /// Creates the directory if it doesn't exist.
    pub fn new(base_path: PathBuf) -> RepositoryResult<Self> {
        if !base_path.exists() {
            fs::create_dir_all(&base_path).map_err(|e| {
                RepositoryError::Io(format!("Failed to create plan directory: {}", e))
            })?;
        }
        Ok(Self { base_path })
    }

    /// Create a file repository in the default location.
    ///
    /// On Unix: `~/.local/share/floorplan/plans/`
    /// On Windows: `%LOCALAPPDATA%\floorplan\plans\`
    pub fn default_location() -> RepositoryResult<Self> {
        let base = dirs::data_local_dir()
            .or_else(dirs::home_dir)
            .ok_or_else(|| RepositoryError::Io("Could not determine home directory".to_string()))?;

        Self::new(plans_dir(&base))
    }

    /// Get the file path for a plan id.
    fn plan_path(&self, id: &str) -> PathBuf {
        let safe_id: String = id
            .chars()
            .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.base_path.join(format!("{}.json", safe_id))
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn read(&self, id: &str) -> RepositoryResult<FloorPlan> {
        let path = self.plan_path(id);
        if !path.exists() {
            return Err(RepositoryError::NotFound(id.to_string()));
        }
        read_plan(&path)
    }

    /// Write through a sibling temp file and rename it into place, so an interrupted
    /// write never leaves a truncated plan behind.
    fn write(&self, plan: &FloorPlan) -> RepositoryResult<()> {
        let path = self.plan_path(&plan.id);
        let tmp_path = path.with_extension("json.tmp");
        let json = serde_json::to_string_pretty(plan)?;
        fs::write(&tmp_path, json).map_err(|e| {
            RepositoryError::Io(format!("Failed to write {}: {}", tmp_path.display(), e))
        })?;
        fs::rename(&tmp_path, &path).map_err(|e| {
            let _ = fs::remove_file(&tmp_path);
            RepositoryError::Io(format!("Failed to replace {}: {}", path.display(), e))
        })
    }
}

/// Plan directory under a data directory.
fn plans_dir(data_dir: &Path) -> PathBuf {
    data_dir.join("floorplan").join("plans")
}

fn read_plan(path: &Path) -> RepositoryResult<FloorPlan> {
    let json = fs::read_to_string(path).map_err(|e| {
        RepositoryError::Io(format!("Failed to read {}: {}", path.display(), e))
    })?;
    serde_json::from_str(&json).map_err(|e| {
        RepositoryError::Serialization(format!("Failed to parse {}: {}", path.display(), e))
    })
}

impl FloorPlanRepository for FileRepository {
    fn create(&self, request: FloorPlanCreate) -> BoxFuture<'_, RepositoryResult<FloorPlan>> {
        Box::pin(async move {
            let plan = FloorPlan::from_create(Uuid::new_v4().to_string(), request, Utc::now())?;
            self.write(&plan)?;
            log::info!("Created floor plan {} in {}", plan.id, self.base_path.display());
            Ok(plan)
        })
    }

    fn update(&self, id: &str, changes: FloorPlanUpdate) -> BoxFuture<'_, RepositoryResult<FloorPlan>> {
        let id = id.to_string();
        Box::pin(async move {
            let mut plan = self.read(&id)?;
            plan.apply_update(changes, Utc::now())?;
            self.write(&plan)?;
            log::info!("Updated floor plan {}", id);
            Ok(plan)
        })
    }

    fn get(&self, id: &str) -> BoxFuture<'_, RepositoryResult<FloorPlan>> {
        let id = id.to_string();
        Box::pin(async move { self.read(&id) })
    }

    fn list(&self, business_id: &str) -> BoxFuture<'_, RepositoryResult<Vec<FloorPlan>>> {
        let business_id = business_id.to_string();
        Box::pin(async move {
            let entries = fs::read_dir(&self.base_path).map_err(|e| {
                RepositoryError::Io(format!("Failed to read directory: {}", e))
            })?;

            let mut plans = Vec::new();
            for entry in entries.flatten() {
                let path = entry.path();
                if path.extension().map(|e| e != "json").unwrap_or(true) {
                    continue;
                }
                match read_plan(&path) {
                    Ok(plan) if plan.business_id == business_id => plans.push(plan),
                    Ok(_) => {}
                    Err(e) => log::warn!("Skipping unreadable plan file: {}", e),
                }
            }
            sort_plans(&mut plans);
            Ok(plans)
        })
    }
}
