//! Conversions from external infrastructure errors into domain errors.

use agenda_domain::AgendaError;
use r2d2::Error as PoolError;
use rusqlite::Error as SqlError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub AgendaError);

impl From<InfraError> for AgendaError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<AgendaError> for InfraError {
    fn from(value: AgendaError) -> Self {
        InfraError(value)
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoAgendaError {
    fn into_agenda(self) -> AgendaError;
}

/* -------------------------------------------------------------------------- */
/* rusqlite::Error → AgendaError */
/* -------------------------------------------------------------------------- */

impl IntoAgendaError for SqlError {
    fn into_agenda(self) -> AgendaError {
        use rusqlite::ffi::ErrorCode;
        use rusqlite::Error as RE;

        match self {
            RE::SqliteFailure(err, maybe_message) => {
                let message = maybe_message.unwrap_or_default();
                match err.code {
                    ErrorCode::DatabaseBusy => AgendaError::Database("database is busy".into()),
                    ErrorCode::DatabaseLocked => {
                        AgendaError::Database("database is locked".into())
                    }
                    ErrorCode::ConstraintViolation => {
                        AgendaError::Database(format!("constraint violation: {message}"))
                    }
                    _ => AgendaError::Database(format!(
                        "sqlite failure {:?} (code {}): {}",
                        err.code, err.extended_code, message
                    )),
                }
            }
            RE::QueryReturnedNoRows => AgendaError::NotFound("no rows returned by query".into()),
            RE::FromSqlConversionFailure(_, _, cause) => {
                AgendaError::Database(format!("failed to convert sqlite value: {cause}"))
            }
            RE::InvalidColumnType(_, _, ty) => {
                AgendaError::Database(format!("invalid column type: {ty}"))
            }
            RE::Utf8Error(_) => AgendaError::Database("invalid UTF-8 returned from sqlite".into()),
            RE::InvalidQuery => AgendaError::Database("invalid SQL query".into()),
            other => AgendaError::Database(other.to_string()),
        }
    }
}

impl From<SqlError> for InfraError {
    fn from(value: SqlError) -> Self {
        InfraError(value.into_agenda())
    }
}

/* -------------------------------------------------------------------------- */
/* r2d2::Error → AgendaError */
/* -------------------------------------------------------------------------- */

impl IntoAgendaError for PoolError {
    fn into_agenda(self) -> AgendaError {
        AgendaError::Database(format!("connection pool error: {self}"))
    }
}

impl From<PoolError> for InfraError {
    fn from(value: PoolError) -> Self {
        InfraError(value.into_agenda())
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
