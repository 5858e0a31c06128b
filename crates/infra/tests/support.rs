#![allow(dead_code)]

use std::sync::Arc;

use chrono::NaiveDate;
use salonbook_domain::{Service, StaffSchedule};
use salonbook_infra::database::DbManager;
use tempfile::TempDir;

/// Temporary database wrapper that keeps the underlying file alive for the
/// duration of a test run.
pub struct TestDatabase {
    pub manager: Arc<DbManager>,
    _temp_dir: TempDir,
}

impl TestDatabase {
    /// Create a migrated database in a fresh temp directory.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("temp dir should be created");
        let manager =
            DbManager::new(temp_dir.path().join("salon.db"), 4).expect("db manager should be created");
        manager.run_migrations().expect("migrations should run");

        Self { manager: Arc::new(manager), _temp_dir: temp_dir }
    }
}

impl Default for TestDatabase {
    fn default() -> Self {
        Self::new()
    }
}

pub fn service(id: i64, duration: i32) -> Service {
    Service {
        id,
        name: format!("service-{id}"),
        duration,
        buffer_time_before: 0,
        buffer_time_after: 0,
        price: 55.0,
        category_id: Some(1),
        is_add_on: false,
        base_service_ids: Vec::new(),
    }
}

pub fn weekday_shift(staff_id: i64, location_id: Option<i64>, day: &str) -> StaffSchedule {
    StaffSchedule {
        id: 0,
        staff_id,
        location_id,
        day_of_week: day.into(),
        start_time: "09:00".into(),
        end_time: "17:00".into(),
        start_date: NaiveDate::from_ymd_opt(2025, 1, 1).expect("valid date"),
        end_date: None,
        is_blocked: false,
    }
}
