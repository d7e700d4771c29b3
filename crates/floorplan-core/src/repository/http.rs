//! Repository backed by the floor plan HTTP API.

use super::{
    BoxFuture, FloorPlan, FloorPlanCreate, FloorPlanRepository, FloorPlanUpdate, RepositoryError,
    RepositoryResult,
};
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use url::Url;

/// Default request timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Connection settings for [`HttpRepository`].
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRepositoryConfig {
    /// API root, e.g. `http://localhost:3030`.
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for HttpRepositoryConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3030".to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl HttpRepositoryConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Read `FLOORPLAN_API_URL` and `FLOORPLAN_API_TIMEOUT_SECS`, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_vars(
            std::env::var("FLOORPLAN_API_URL").ok(),
            std::env::var("FLOORPLAN_API_TIMEOUT_SECS").ok(),
        )
    }

    fn from_vars(base_url: Option<String>, timeout_secs: Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(url) = base_url {
            config.base_url = url;
        }
        if let Some(secs) = timeout_secs {
            match secs.trim().parse() {
                Ok(secs) => config.timeout = Duration::from_secs(secs),
                Err(_) => log::warn!("Ignoring invalid FLOORPLAN_API_TIMEOUT_SECS: {}", secs),
            }
        }
        config
    }
}

/// Error body returned by the API.
#[derive(Deserialize)]
struct ApiErrorBody {
    error: String,
}

impl From<reqwest::Error> for RepositoryError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            RepositoryError::Serialization(e.to_string())
        } else {
            RepositoryError::Transport(e.to_string())
        }
    }
}

/// Floor plan repository speaking JSON over HTTP.
#[derive(Debug, Clone)]
pub struct HttpRepository {
    client: Client,
    base_url: Url,
}

impl HttpRepository {
    pub fn new(config: HttpRepositoryConfig) -> RepositoryResult<Self> {
        let base_url = Url::parse(&config.base_url).map_err(|e| {
            RepositoryError::Other(format!("Invalid API url {}: {}", config.base_url, e))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(RepositoryError::Other(format!(
                "API url cannot be a base: {}",
                config.base_url
            )));
        }
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, base_url })
    }

    /// Build `<base>/floor-plans[/<id>]` with the id percent-encoded.
    fn plans_url(&self, id: Option<&str>) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push("floor-plans");
            if let Some(id) = id {
                segments.push(id);
            }
        }
        url
    }

    async fn handle_response<T: DeserializeOwned>(response: Response, id: Option<&str>) -> RepositoryResult<T> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }

        let text = response.text().await?;
        let message = serde_json::from_str::<ApiErrorBody>(&text)
            .map(|body| body.error)
            .unwrap_or(text);

        Err(match status {
            StatusCode::NOT_FOUND => RepositoryError::NotFound(id.unwrap_or_default().to_string()),
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => RepositoryError::Invalid(message),
            _ => RepositoryError::Rejected {
                status: status.as_u16(),
                message,
            },
        })
    }
}

impl FloorPlanRepository for HttpRepository {
    fn create(&self, request: FloorPlanCreate) -> BoxFuture<'_, RepositoryResult<FloorPlan>> {
        Box::pin(async move {
            let response = self.client.post(self.plans_url(None)).json(&request).send().await?;
            let plan: FloorPlan = Self::handle_response(response, None).await?;
            log::info!("Created floor plan {} ({})", plan.id, plan.name);
            Ok(plan)
        })
    }

    fn update(&self, id: &str, changes: FloorPlanUpdate) -> BoxFuture<'_, RepositoryResult<FloorPlan>> {
        let id = id.to_string();
        Box::pin(async move {
            let response = self
                .client
                .patch(self.plans_url(Some(&id)))
                .json(&changes)
                .send()
                .await?;
            let plan = Self::handle_response(response, Some(&id)).await?;
            log::info!("Updated floor plan {}", id);
            Ok(plan)
        })
    }

    fn get(&self, id: &str) -> BoxFuture<'_, RepositoryResult<FloorPlan>> {
        let id = id.to_string();
        Box::pin(async move {
            let response = self.client.get(self.plans_url(Some(&id))).send().await?;
            Self::handle_response(response, Some(&id)).await
        })
    }

    fn list(&self, business_id: &str) -> BoxFuture<'_, RepositoryResult<Vec<FloorPlan>>> {
        let business_id = business_id.to_string();
        Box::pin(async move {
            let response = self
                .client
                .get(self.plans_url(None))
                .query(&[("business_id", business_id.as_str())])
                .send()
                .await?;
            let value: Value = Self::handle_response(response, None).await?;
            Ok(plans_from_listing(value))
        })
    }
}

/// Read a listing response. Anything but an array counts as empty; entries that
/// don't parse are skipped.
fn plans_from_listing(value: Value) -> Vec<FloorPlan> {
    let Value::Array(items) = value else {
        log::warn!("Floor plan listing is not an array, treating as empty");
        return Vec::new();
    };

    items
        .into_iter()
        .filter_map(|item| match serde_json::from_value(item) {
            Ok(plan) => Some(plan),
            Err(e) => {
                log::warn!("Skipping malformed floor plan in listing: {}", e);
                None
            }
        })
        .collect()
}
