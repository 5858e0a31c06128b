//! Health report served by `GET /health`

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Share of healthy components required for the service to report healthy.
const HEALTHY_THRESHOLD: f64 = 0.8;

/// Overall health status of the application
///
/// # Example
/// ```
/// use salonbook_api::utils::health::{ComponentHealth, HealthStatus};
///
/// let mut status = HealthStatus::new()
///     .add_component(ComponentHealth::healthy("database"))
///     .add_component(ComponentHealth::unhealthy("payment_terminal", "api token not configured"));
/// status.calculate_score();
///
/// assert_eq!(status.score, 0.5);
/// assert!(!status.is_healthy);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    /// `score` reached the healthy threshold.
    pub is_healthy: bool,

    /// Calculated as `healthy_components / total_components`.
    pub score: f64,

    /// Per-component results, in the order they were added.
    pub components: Vec<ComponentHealth>,

    /// Unix timestamp when the check was performed
    pub timestamp: i64,
}

impl HealthStatus {
    /// Healthy report with no components, stamped now.
    pub fn new() -> Self {
        Self { is_healthy: true, score: 1.0, components: Vec::new(), timestamp: Utc::now().timestamp() }
    }

    /// Append a component result.
    pub fn add_component(mut self, component: ComponentHealth) -> Self {
        self.components.push(component);
        self
    }

    /// Recompute `score` and `is_healthy` from the components added so far.
    pub fn calculate_score(&mut self) {
        if self.components.is_empty() {
            return;
        }

        let healthy_count = self.components.iter().filter(|c| c.is_healthy).count();

        self.score = healthy_count as f64 / self.components.len() as f64;
        self.is_healthy = self.score >= HEALTHY_THRESHOLD;
    }
}

impl Default for HealthStatus {
    fn default() -> Self {
        Self::new()
    }
}

/// Health status of an individual component
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentHealth {
    /// Component identifier (e.g., "database", "payment_terminal")
    pub name: String,
    /// Whether the component is usable.
    pub is_healthy: bool,
    /// Failure reason or extra detail.
    pub message: Option<String>,
}

impl ComponentHealth {
    /// Healthy component with no message.
    pub fn healthy(name: impl Into<String>) -> Self {
        Self { name: name.into(), is_healthy: true, message: None }
    }

    /// Unhealthy component with the reason.
    pub fn unhealthy(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self { name: name.into(), is_healthy: false, message: Some(message.into()) }
    }

    /// Attach detail without changing health.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}
