use super::util::{column, query_error};
use crate::domain_model::*;
use crate::domain_port::*;
use crate::query_catalog::{ConfigError, QueryCatalog, QueryName};
use sqlx::MySqlPool;
use sqlx::mysql::MySqlRow;

pub struct MySqlCardRepo {
    pool: MySqlPool,
    select_by_user: String,
}

impl MySqlCardRepo {
    pub fn try_new(pool: MySqlPool, catalog: &QueryCatalog) -> Result<Self, ConfigError> {
        Ok(MySqlCardRepo {
            pool,
            select_by_user: catalog.get(QueryName::SELECT_CARDS_BY_USER)?.to_owned(),
        })
    }

    fn row_to_record(row: &MySqlRow) -> Result<CardRecord, DataAccessError> {
        let query = QueryName::SELECT_CARDS_BY_USER;
        Ok(CardRecord {
            id: column(row, query, "id")?,
            number: column(row, query, "number")?,
            balance: column(row, query, "balance")?,
        })
    }
}

#[async_trait::async_trait]
impl CardRepo for MySqlCardRepo {
    async fn find_cards(&self, user_id: &UserId) -> Result<CardSet, DataAccessError> {
        let rows: Vec<MySqlRow> = sqlx::query(&self.select_by_user)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| query_error(QueryName::SELECT_CARDS_BY_USER, e))?;

        rows.iter()
            .map(Self::row_to_record)
            .collect::<Result<Vec<_>, _>>()
            .map(CardSet::new)
    }
}
