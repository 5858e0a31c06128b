//! SQLite-backed staff schedule rows.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use rusqlite::types::Type;
use rusqlite::{params, Row};
use salonbook_core::availability::ports::ScheduleRepository;
use salonbook_domain::{LocationId, Result, StaffSchedule};
use tokio::task;

use super::manager::{map_join_error, map_sql_error, DbManager};

const DATE_FORMAT: &str = "%Y-%m-%d";

pub struct SqliteScheduleRepository {
    db: Arc<DbManager>,
}

impl SqliteScheduleRepository {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }

    /// Store a schedule row; returns its id.
    pub async fn add(&self, schedule: StaffSchedule) -> Result<i64> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> Result<i64> {
            let conn = db.get_connection()?;
            let id = (schedule.id != 0).then_some(schedule.id);
            conn.execute(
                "INSERT OR REPLACE INTO staff_schedules (
                    id, staff_id, location_id, day_of_week, start_time, end_time,
                    start_date, end_date, is_blocked
                 ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    id,
                    schedule.staff_id,
                    schedule.location_id,
                    schedule.day_of_week,
                    schedule.start_time,
                    schedule.end_time,
                    schedule.start_date.format(DATE_FORMAT).to_string(),
                    schedule.end_date.map(|d| d.format(DATE_FORMAT).to_string()),
                    schedule.is_blocked,
                ],
            )
            .map_err(map_sql_error)?;
            Ok(conn.last_insert_rowid())
        })
        .await
        .map_err(map_join_error)?
    }
}

#[async_trait]
impl ScheduleRepository for SqliteScheduleRepository {
    async fn schedules_for_location(&self, location_id: LocationId) -> Result<Vec<StaffSchedule>> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> Result<Vec<StaffSchedule>> {
            let conn = db.get_connection()?;
            let mut stmt = conn
                .prepare(
                    "SELECT id, staff_id, location_id, day_of_week, start_time, end_time,
                            start_date, end_date, is_blocked
                     FROM staff_schedules
                     WHERE location_id IS NULL OR location_id = ?1
                     ORDER BY staff_id, id",
                )
                .map_err(map_sql_error)?;
            let rows = stmt.query_map(params![location_id], map_schedule_row).map_err(map_sql_error)?;
            rows.collect::<rusqlite::Result<Vec<_>>>().map_err(map_sql_error)
        })
        .await
        .map_err(map_join_error)?
    }
}

fn map_schedule_row(row: &Row<'_>) -> rusqlite::Result<StaffSchedule> {
    let start_date: String = row.get(6)?;
    let end_date: Option<String> = row.get(7)?;

    Ok(StaffSchedule {
        id: row.get(0)?,
        staff_id: row.get(1)?,
        location_id: row.get(2)?,
        day_of_week: row.get(3)?,
        start_time: row.get(4)?,
        end_time: row.get(5)?,
        start_date: parse_date(6, &start_date)?,
        end_date: end_date.as_deref().map(|raw| parse_date(7, raw)).transpose()?,
        is_blocked: row.get(8)?,
    })
}

fn parse_date(column: usize, raw: &str) -> rusqlite::Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .map_err(|err| rusqlite::Error::FromSqlConversionFailure(column, Type::Text, Box::new(err)))
}
