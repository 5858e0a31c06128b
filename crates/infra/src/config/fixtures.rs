//! Seed data for deployments without a database
//!
//! A fixture file lists the catalog, staff assignments, schedules and any
//! existing appointments. It uses the same JSON/TOML detection as the config
//! file:
//!
//! ```toml
//! assignments = [[1, 4]]
//!
//! [[services]]
//! id = 1
//! name = "Haircut"
//! duration = 60
//!
//! [[schedules]]
//! id = 1
//! staff_id = 4
//! location_id = 1
//! day_of_week = "Monday"
//! start_time = "09:00"
//! end_time = "17:00"
//! start_date = "2025-01-01"
//! ```

use std::path::Path;

use salonbook_domain::{Appointment, Result, SalonError, Service, ServiceId, StaffId, StaffSchedule};
use serde::Deserialize;

use super::loader::parse_document;

/// Contents of a fixture file. Every section is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SalonFixtures {
    pub services: Vec<Service>,
    /// `(service_id, staff_id)` pairs.
    pub assignments: Vec<(ServiceId, StaffId)>,
    pub schedules: Vec<StaffSchedule>,
    pub appointments: Vec<Appointment>,
}

/// Read and parse a fixture file.
///
/// # Errors
/// Returns `SalonError::Config` if the file is missing or malformed.
pub fn load_fixtures(path: impl AsRef<Path>) -> Result<SalonFixtures> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path).map_err(|e| {
        SalonError::Config(format!("Failed to read fixtures {}: {e}", path.display()))
    })?;
    let fixtures: SalonFixtures = parse_document(&contents, path)?;

    tracing::info!(
        path = %path.display(),
        services = fixtures.services.len(),
        schedules = fixtures.schedules.len(),
        appointments = fixtures.appointments.len(),
        "fixtures loaded"
    );
    Ok(fixtures)
}
