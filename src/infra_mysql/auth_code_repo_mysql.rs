use super::util::{column, query_error};
use crate::domain_model::*;
use crate::domain_port::*;
use crate::query_catalog::{ConfigError, QueryCatalog, QueryName};
use chrono::{DateTime, Utc};
use sqlx::MySqlPool;
use sqlx::mysql::MySqlRow;

pub struct MySqlAuthCodeRepo {
    pool: MySqlPool,
    select_latest: String,
    select_since: String,
}

impl MySqlAuthCodeRepo {
    pub fn try_new(pool: MySqlPool, catalog: &QueryCatalog) -> Result<Self, ConfigError> {
        Ok(MySqlAuthCodeRepo {
            pool,
            select_latest: catalog.get(QueryName::SELECT_LATEST_AUTH_CODE)?.to_owned(),
            select_since: catalog.get(QueryName::SELECT_AUTH_CODES_SINCE)?.to_owned(),
        })
    }

    fn rows_to_records(
        rows: &[MySqlRow],
        query: &'static str,
    ) -> Result<Vec<AuthCodeRecord>, DataAccessError> {
        rows.iter()
            .map(|row| -> Result<AuthCodeRecord, DataAccessError> {
                let created: DateTime<Utc> = column(row, query, "created")?;
                Ok(AuthCodeRecord {
                    id: column(row, query, "id")?,
                    user_id: column(row, query, "user_id")?,
                    code: column(row, query, "code")?,
                    created,
                })
            })
            .collect()
    }
}

#[async_trait::async_trait]
impl AuthCodeRepo for MySqlAuthCodeRepo {
    async fn find_latest_auth_code(
        &self,
        user_id: &UserId,
    ) -> Result<Option<AuthCodeRecord>, DataAccessError> {
        // The catalog query is expected to ORDER BY created DESC LIMIT 1. Rows are
        // still reduced here so a query without the limit cannot pick a stale code.
        let rows: Vec<MySqlRow> = sqlx::query(&self.select_latest)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| query_error(QueryName::SELECT_LATEST_AUTH_CODE, e))?;

        let records = Self::rows_to_records(&rows, QueryName::SELECT_LATEST_AUTH_CODE)?;
        Ok(AuthCodeRecord::latest(records))
    }

    async fn find_auth_codes_since(
        &self,
        user_id: &UserId,
        since: DateTime<Utc>,
    ) -> Result<Vec<AuthCodeRecord>, DataAccessError> {
        let rows: Vec<MySqlRow> = sqlx::query(&self.select_since)
            .bind(user_id)
            .bind(since)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| query_error(QueryName::SELECT_AUTH_CODES_SINCE, e))?;

        Self::rows_to_records(&rows, QueryName::SELECT_AUTH_CODES_SINCE)
    }
}
