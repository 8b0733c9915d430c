pub mod core;

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

use crate::domain::DataAccessError;
use crate::DatabaseConfig;

const CREATE_RESERVATIONS: &str = "
CREATE TABLE IF NOT EXISTS reservations (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    professor VARCHAR(100) NOT NULL,
    shift VARCHAR(20) NOT NULL,
    room INTEGER NOT NULL,
    date VARCHAR(10) NOT NULL,
    UNIQUE (date, shift, room)
)";

impl From<sqlx::Error> for DataAccessError {
    fn from(value: sqlx::Error) -> Self {
        match &value {
            sqlx::Error::Database(e) if e.is_unique_violation() => {
                Self::UniqueViolation(Box::new(value))
            }
            sqlx::Error::Configuration(_)
            | sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed => Self::ConnectionError(Box::new(value)),
            sqlx::Error::RowNotFound
            | sqlx::Error::TypeNotFound { .. }
            | sqlx::Error::ColumnIndexOutOfBounds { .. }
            | sqlx::Error::ColumnNotFound(_)
            | sqlx::Error::ColumnDecode { .. }
            | sqlx::Error::Decode(_) => Self::ReadError(Box::new(value)),
            _ => Self::QueryError(Box::new(value)),
        }
    }
}

/// Opens the pool, creating the database file when it does not exist yet.
///
/// Every connection to `sqlite::memory:` is its own database, so in-memory
/// stores need `max_connections = 1`.
pub async fn connect(config: &DatabaseConfig) -> Result<SqlitePool, DataAccessError> {
    let options = SqliteConnectOptions::from_str(&config.url)?.create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .connect_with(options)
        .await?;
    Ok(pool)
}

/// Creates the reservations table. The unique key on (date, shift, room)
/// makes the store itself refuse a second booking of the same slot.
pub async fn migrate(pool: &SqlitePool) -> Result<(), DataAccessError> {
    sqlx::query(CREATE_RESERVATIONS).execute(pool).await?;
    Ok(())
}
