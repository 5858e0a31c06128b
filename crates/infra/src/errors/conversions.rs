//! Conversions from external infrastructure errors into domain errors.

use r2d2::Error as PoolError;
use reqwest::Error as HttpError;
use rusqlite::Error as SqlError;
use salonbook_domain::SalonError;
use tokio::task::JoinError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub SalonError);

impl From<InfraError> for SalonError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<SalonError> for InfraError {
    fn from(value: SalonError) -> Self {
        InfraError(value)
    }
}

trait IntoSalonError {
    fn into_salon(self) -> SalonError;
}

/* -------------------------------------------------------------------------- */
/* rusqlite::Error → SalonError */
/* -------------------------------------------------------------------------- */

impl IntoSalonError for SqlError {
    fn into_salon(self) -> SalonError {
        use rusqlite::ffi::ErrorCode;
        use rusqlite::Error as RE;

        match self {
            RE::SqliteFailure(err, maybe_message) => {
                let message = maybe_message.unwrap_or_default();
                match (err.code, err.extended_code) {
                    (ErrorCode::DatabaseBusy, _) => {
                        SalonError::Persistence("database is busy".into())
                    }
                    (ErrorCode::DatabaseLocked, _) => {
                        SalonError::Persistence("database is locked".into())
                    }
                    (ErrorCode::ConstraintViolation, 2067) => {
                        SalonError::Persistence("unique constraint violation".into())
                    }
                    (ErrorCode::ConstraintViolation, 787) => {
                        SalonError::Persistence("foreign key constraint violation".into())
                    }
                    _ => SalonError::Persistence(format!(
                        "sqlite failure {:?} (code {}): {}",
                        err.code, err.extended_code, message
                    )),
                }
            }
            RE::QueryReturnedNoRows => SalonError::NotFound("no rows returned by query".into()),
            RE::FromSqlConversionFailure(_, _, cause) => {
                SalonError::Persistence(format!("failed to convert sqlite value: {cause}"))
            }
            RE::InvalidColumnType(_, name, ty) => {
                SalonError::Persistence(format!("invalid column type for {name}: {ty}"))
            }
            RE::InvalidPath(path) => SalonError::Config(format!(
                "invalid database path: {}",
                path.to_string_lossy()
            )),
            other => SalonError::Persistence(other.to_string()),
        }
    }
}

impl From<SqlError> for InfraError {
    fn from(value: SqlError) -> Self {
        InfraError(value.into_salon())
    }
}

/* -------------------------------------------------------------------------- */
/* r2d2::Error → SalonError */
/* -------------------------------------------------------------------------- */

impl From<PoolError> for InfraError {
    fn from(value: PoolError) -> Self {
        InfraError(SalonError::Persistence(format!("connection pool unavailable: {value}")))
    }
}

impl From<JoinError> for InfraError {
    fn from(value: JoinError) -> Self {
        InfraError(SalonError::Internal(format!("blocking database task failed: {value}")))
    }
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → SalonError */
/* -------------------------------------------------------------------------- */

impl IntoSalonError for HttpError {
    fn into_salon(self) -> SalonError {
        if self.is_timeout() {
            return SalonError::Network("HTTP request timed out".into());
        }

        if self.is_connect() {
            return SalonError::Network("HTTP connection failure".into());
        }

        if self.is_decode() {
            return SalonError::Network(format!("unreadable response body: {self}"));
        }

        SalonError::Network(self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_salon())
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
