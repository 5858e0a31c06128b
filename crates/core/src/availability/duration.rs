//! Bookable duration resolution
//!
//! One place owns the duration fallback: unknown services and catalog rows
//! whose duration plus buffers is not positive count as
//! [`FALLBACK_SERVICE_MINUTES`] so time is never under-blocked.

use std::collections::HashMap;

use salonbook_domain::constants::FALLBACK_SERVICE_MINUTES;
use salonbook_domain::{Service, ServiceId, ServiceSelection};

/// Resolves services to bookable minutes across prioritised catalog views
/// (location-scoped first, then staff-eligible, then raw).
#[derive(Debug, Clone, Default)]
pub struct DurationResolver {
    sources: Vec<HashMap<ServiceId, Service>>,
}

impl DurationResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a lower-priority catalog view.
    pub fn with_source(mut self, services: impl IntoIterator<Item = Service>) -> Self {
        self.sources.push(services.into_iter().map(|service| (service.id, service)).collect());
        self
    }

    /// First matching service in priority order.
    pub fn lookup(&self, service_id: ServiceId) -> Option<&Service> {
        self.sources.iter().find_map(|source| source.get(&service_id))
    }

    /// Duration plus both buffers, or the fallback.
    pub fn resolve(&self, service_id: ServiceId) -> i64 {
        match self.lookup(service_id).map(Service::raw_total_minutes) {
            Some(total) if total > 0 => total,
            _ => FALLBACK_SERVICE_MINUTES,
        }
    }

    /// Base service plus every add-on, each resolved with the same fallback.
    pub fn resolve_selection(&self, selection: &ServiceSelection) -> i64 {
        self.resolve_with_add_ons(selection.service_id, &selection.add_on_ids)
    }

    pub fn resolve_with_add_ons(&self, service_id: ServiceId, add_on_ids: &[ServiceId]) -> i64 {
        add_on_ids.iter().fold(self.resolve(service_id), |total, add_on| total + self.resolve(*add_on))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(id: ServiceId, duration: i32, before: i32, after: i32) -> Service {
        Service {
            id,
            name: format!("service-{id}"),
            duration,
            buffer_time_before: before,
            buffer_time_after: after,
            price: 0.0,
            category_id: None,
            is_add_on: false,
            base_service_ids: Vec::new(),
        }
    }

    #[test]
    fn includes_both_buffers() {
        let resolver = DurationResolver::new().with_source([service(1, 60, 15, 0)]);
        assert_eq!(resolver.resolve(1), 75);
    }

    #[test]
    fn non_positive_totals_and_unknown_ids_fall_back() {
        let resolver = DurationResolver::new().with_source([service(1, 0, 0, 0), service(2, 30, -40, 0)]);

        assert_eq!(resolver.resolve(1), FALLBACK_SERVICE_MINUTES);
        assert_eq!(resolver.resolve(2), FALLBACK_SERVICE_MINUTES);
        assert_eq!(resolver.resolve(99), FALLBACK_SERVICE_MINUTES);
    }

    #[test]
    fn earlier_sources_take_priority() {
        let resolver = DurationResolver::new()
            .with_source([service(1, 45, 0, 0)])
            .with_source([service(1, 90, 0, 0), service(2, 20, 5, 5)]);

        assert_eq!(resolver.resolve(1), 45);
        assert_eq!(resolver.resolve(2), 30);
    }

    #[test]
    fn add_ons_are_summed() {
        let resolver =
            DurationResolver::new().with_source([service(1, 60, 0, 0), service(7, 15, 0, 0)]);
        let selection = ServiceSelection::with_add_ons(1, vec![7, 404]);

        assert_eq!(resolver.resolve_selection(&selection), 60 + 15 + FALLBACK_SERVICE_MINUTES);
    }
}
