//! SQLite-backed service catalog and staff assignments.

use std::sync::Arc;

use async_trait::async_trait;
use rusqlite::{params, Row};
use salonbook_core::availability::ports::{ServiceCatalog, StaffEligibility};
use salonbook_domain::{LocationId, Result, SalonError, Service, ServiceId, StaffId};
use tokio::task;

use super::manager::{map_join_error, map_sql_error, DbManager};

pub struct SqliteServiceCatalog {
    db: Arc<DbManager>,
}

impl SqliteServiceCatalog {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }

    /// Insert or replace a service. `location_id = None` offers it everywhere.
    pub async fn upsert(&self, service: Service, location_id: Option<LocationId>) -> Result<()> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> Result<()> {
            let conn = db.get_connection()?;
            let base_ids = serde_json::to_string(&service.base_service_ids)
                .map_err(|err| SalonError::Internal(format!("encode base_service_ids: {err}")))?;
            conn.execute(
                "INSERT OR REPLACE INTO services (
                    id, name, duration, buffer_time_before, buffer_time_after, price,
                    category_id, is_add_on, base_service_ids, location_id
                 ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                params![
                    service.id,
                    service.name,
                    service.duration,
                    service.buffer_time_before,
                    service.buffer_time_after,
                    service.price,
                    service.category_id,
                    service.is_add_on,
                    base_ids,
                    location_id,
                ],
            )
            .map_err(map_sql_error)?;
            Ok(())
        })
        .await
        .map_err(map_join_error)?
    }
}

#[async_trait]
impl ServiceCatalog for SqliteServiceCatalog {
    async fn services_for_location(&self, location_id: LocationId) -> Result<Vec<Service>> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> Result<Vec<Service>> {
            let conn = db.get_connection()?;
            let mut stmt = conn
                .prepare(
                    "SELECT id, name, duration, buffer_time_before, buffer_time_after, price,
                            category_id, is_add_on, base_service_ids
                     FROM services
                     WHERE location_id IS NULL OR location_id = ?1
                     ORDER BY id",
                )
                .map_err(map_sql_error)?;
            let rows = stmt.query_map(params![location_id], map_service_row).map_err(map_sql_error)?;
            rows.collect::<rusqlite::Result<Vec<_>>>().map_err(map_sql_error)
        })
        .await
        .map_err(map_join_error)?
    }
}

fn map_service_row(row: &Row<'_>) -> rusqlite::Result<Service> {
    let base_ids: String = row.get(8)?;
    let base_service_ids = serde_json::from_str(&base_ids).map_err(|err| {
        rusqlite::Error::FromSqlConversionFailure(8, rusqlite::types::Type::Text, Box::new(err))
    })?;

    Ok(Service {
        id: row.get(0)?,
        name: row.get(1)?,
        duration: row.get(2)?,
        buffer_time_before: row.get(3)?,
        buffer_time_after: row.get(4)?,
        price: row.get(5)?,
        category_id: row.get(6)?,
        is_add_on: row.get(7)?,
        base_service_ids,
    })
}

/// Staff to service assignments. A `NULL` location applies everywhere.
pub struct SqliteStaffEligibility {
    db: Arc<DbManager>,
}

impl SqliteStaffEligibility {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }

    pub async fn assign(
        &self,
        staff_id: StaffId,
        service_id: ServiceId,
        location_id: Option<LocationId>,
    ) -> Result<()> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> Result<()> {
            let conn = db.get_connection()?;
            conn.execute(
                "INSERT OR IGNORE INTO staff_services (staff_id, service_id, location_id)
                 VALUES (?1, ?2, ?3)",
                params![staff_id, service_id, location_id],
            )
            .map_err(map_sql_error)?;
            Ok(())
        })
        .await
        .map_err(map_join_error)?
    }
}

#[async_trait]
impl StaffEligibility for SqliteStaffEligibility {
    async fn staff_for_service(
        &self,
        service_id: ServiceId,
        location_id: LocationId,
    ) -> Result<Vec<StaffId>> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> Result<Vec<StaffId>> {
            let conn = db.get_connection()?;
            let mut stmt = conn
                .prepare(
                    "SELECT DISTINCT staff_id FROM staff_services
                     WHERE service_id = ?1 AND (location_id IS NULL OR location_id = ?2)
                     ORDER BY staff_id",
                )
                .map_err(map_sql_error)?;
            let rows = stmt
                .query_map(params![service_id, location_id], |row| row.get(0))
                .map_err(map_sql_error)?;
            rows.collect::<rusqlite::Result<Vec<StaffId>>>().map_err(map_sql_error)
        })
        .await
        .map_err(map_join_error)?
    }
}
