use super::util::query_error;
use crate::domain_port::*;
use crate::query_catalog::{ConfigError, QueryCatalog, QueryName};
use sqlx::MySqlPool;

pub struct MySqlTestDataCleaner {
    pool: MySqlPool,
    statements: Vec<(&'static str, String)>,
}

impl MySqlTestDataCleaner {
    pub fn try_new(pool: MySqlPool, catalog: &QueryCatalog) -> Result<Self, ConfigError> {
        let statements = QueryName::CLEANUP_ORDER
            .iter()
            .map(|name| Ok((*name, catalog.get(name)?.to_owned())))
            .collect::<Result<Vec<_>, ConfigError>>()?;

        Ok(MySqlTestDataCleaner { pool, statements })
    }
}

#[async_trait::async_trait]
impl TestDataCleaner for MySqlTestDataCleaner {
    async fn clear_all_test_data(&self) -> Result<(), DataAccessError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DataAccessError::Connect(e.to_string()))?;

        for (name, sql) in &self.statements {
            let result = sqlx::query(sql)
                .execute(&mut *tx)
                .await
                .map_err(|e| query_error(name, e))?;
            tracing::debug!(query = name, rows = result.rows_affected(), "cleared");
        }

        tx.commit()
            .await
            .map_err(|e| query_error("commit", e))?;
        Ok(())
    }
}
