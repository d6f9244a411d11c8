use super::util::{column, query_error};
use crate::domain_model::*;
use crate::domain_port::*;
use crate::query_catalog::{ConfigError, QueryCatalog, QueryName};
use sqlx::MySqlPool;
use sqlx::mysql::MySqlRow;

pub struct MySqlUserRepo {
    pool: MySqlPool,
    select_by_login: String,
}

impl MySqlUserRepo {
    pub fn try_new(pool: MySqlPool, catalog: &QueryCatalog) -> Result<Self, ConfigError> {
        Ok(MySqlUserRepo {
            pool,
            select_by_login: catalog.get(QueryName::SELECT_USER_BY_LOGIN)?.to_owned(),
        })
    }

    fn row_to_record(row: &MySqlRow) -> Result<UserRecord, DataAccessError> {
        let query = QueryName::SELECT_USER_BY_LOGIN;
        Ok(UserRecord {
            id: column(row, query, "id")?,
            login: column(row, query, "login")?,
            password: column(row, query, "password")?,
            status: column(row, query, "status")?,
        })
    }
}

#[async_trait::async_trait]
impl UserRepo for MySqlUserRepo {
    async fn find_user_by_login(&self, login: &str) -> Result<Option<UserRecord>, DataAccessError> {
        let row: Option<MySqlRow> = sqlx::query(&self.select_by_login)
            .bind(login)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| query_error(QueryName::SELECT_USER_BY_LOGIN, e))?;

        row.as_ref().map(Self::row_to_record).transpose()
    }
}
