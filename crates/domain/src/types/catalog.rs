//! Service catalog read model

use serde::{Deserialize, Serialize};

use super::{CategoryId, ServiceId};

/// A bookable service (or add-on) as published by the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    pub id: ServiceId,
    pub name: String,
    /// Chair time in minutes, excluding buffers.
    pub duration: i32,
    #[serde(default)]
    pub buffer_time_before: i32,
    #[serde(default)]
    pub buffer_time_after: i32,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    #[serde(default)]
    pub is_add_on: bool,
    /// Base services this add-on may be attached to. Empty means "any".
    #[serde(default)]
    pub base_service_ids: Vec<ServiceId>,
}

impl Service {
    /// Raw bookable minutes: duration plus both buffers. May be <= 0 for
    /// malformed catalog rows; callers apply the fallback policy.
    pub fn raw_total_minutes(&self) -> i64 {
        i64::from(self.duration)
            + i64::from(self.buffer_time_before)
            + i64::from(self.buffer_time_after)
    }

    /// Whether this add-on may be attached to `base`.
    pub fn attaches_to(&self, base: ServiceId) -> bool {
        self.is_add_on && (self.base_service_ids.is_empty() || self.base_service_ids.contains(&base))
    }
}
