//! SQLite-backed appointment reads and inserts.
//!
//! Instants are stored as unix seconds and queried with half-open
//! `[from, to)` predicates on `start_ts`.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Row};
use salonbook_core::availability::ports::{AppointmentRepository, AppointmentWriter};
use salonbook_domain::{Appointment, AppointmentStatus, NewAppointment, Result, SalonError};
use tokio::task;

use super::manager::{map_join_error, map_sql_error, DbManager};

pub struct SqliteAppointmentStore {
    db: Arc<DbManager>,
}

impl SqliteAppointmentStore {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl AppointmentRepository for SqliteAppointmentStore {
    async fn appointments_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Appointment>> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> Result<Vec<Appointment>> {
            let conn = db.get_connection()?;
            let mut stmt = conn
                .prepare(
                    "SELECT id, staff_id, client_id, service_id, add_on_ids, start_ts, end_ts,
                            status, location_id, notes
                     FROM appointments
                     WHERE start_ts >= ?1 AND start_ts < ?2
                     ORDER BY start_ts, id",
                )
                .map_err(map_sql_error)?;
            let rows = stmt
                .query_map(params![from.timestamp(), to.timestamp()], map_appointment_row)
                .map_err(map_sql_error)?;
            rows.collect::<rusqlite::Result<Vec<_>>>().map_err(map_sql_error)
        })
        .await
        .map_err(map_join_error)?
    }
}

#[async_trait]
impl AppointmentWriter for SqliteAppointmentStore {
    async fn create_appointment(&self, appointment: NewAppointment) -> Result<Appointment> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> Result<Appointment> {
            let conn = db.get_connection()?;
            let add_on_ids = serde_json::to_string(&appointment.add_on_ids)
                .map_err(|err| SalonError::Internal(format!("encode add_on_ids: {err}")))?;
            conn.execute(
                "INSERT INTO appointments (
                    staff_id, client_id, service_id, add_on_ids, start_ts, end_ts,
                    status, location_id, notes
                 ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    appointment.staff_id,
                    appointment.client_id,
                    appointment.service_id,
                    add_on_ids,
                    appointment.start_time.timestamp(),
                    appointment.end_time.timestamp(),
                    appointment.status.to_string(),
                    appointment.location_id,
                    appointment.notes,
                ],
            )
            .map_err(map_sql_error)?;
            Ok(appointment.into_appointment(conn.last_insert_rowid()))
        })
        .await
        .map_err(map_join_error)?
    }
}

fn map_appointment_row(row: &Row<'_>) -> rusqlite::Result<Appointment> {
    let add_on_ids: String = row.get(4)?;
    let status: String = row.get(7)?;
    let end_ts: Option<i64> = row.get(6)?;

    Ok(Appointment {
        id: row.get(0)?,
        staff_id: row.get(1)?,
        client_id: row.get(2)?,
        service_id: row.get(3)?,
        add_on_ids: serde_json::from_str(&add_on_ids)
            .map_err(|err| rusqlite::Error::FromSqlConversionFailure(4, Type::Text, Box::new(err)))?,
        start_time: instant(5, row.get(5)?)?,
        end_time: end_ts.map(|ts| instant(6, ts)).transpose()?,
        status: status.parse::<AppointmentStatus>().map_err(|err| {
            rusqlite::Error::FromSqlConversionFailure(7, Type::Text, err.into())
        })?,
        location_id: row.get(8)?,
        notes: row.get(9)?,
    })
}

fn instant(column: usize, ts: i64) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::from_timestamp(ts, 0).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            column,
            Type::Integer,
            format!("timestamp out of range: {ts}").into(),
        )
    })
}
