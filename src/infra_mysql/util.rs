use crate::domain_port::DataAccessError;
use crate::settings::Database;
use sqlx::MySqlPool;
use sqlx::mysql::{MySqlPoolOptions, MySqlRow};
use sqlx::{Decode, Row, Type};
use std::time::Duration;

/// Pool shared by the adapters. Each query checks a connection out for its own
/// duration only; the connection returns to the pool on every exit path.
pub async fn connect_pool(database: &Database) -> Result<MySqlPool, DataAccessError> {
    MySqlPoolOptions::new()
        .max_connections(database.max_connections)
        .acquire_timeout(Duration::from_secs(database.acquire_timeout_secs))
        .connect(&database.url)
        .await
        .map_err(|e| DataAccessError::Connect(e.to_string()))
}

pub fn query_error(query: &str, err: sqlx::Error) -> DataAccessError {
    match err {
        sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::Io(_)
        | sqlx::Error::Tls(_) => DataAccessError::Connect(err.to_string()),
        other => DataAccessError::Query {
            query: query.to_owned(),
            message: other.to_string(),
        },
    }
}

pub fn column<'r, T>(row: &'r MySqlRow, query: &str, name: &str) -> Result<T, DataAccessError>
where
    T: Decode<'r, sqlx::MySql> + Type<sqlx::MySql>,
{
    row.try_get(name).map_err(|e| DataAccessError::Decode {
        query: query.to_owned(),
        message: e.to_string(),
    })
}
