use super::DataAccessError;

#[async_trait::async_trait]
pub trait TestDataCleaner: Send + Sync {
    /// Deletes transactions, cards, auth codes and users, in that order.
    /// Succeeds on an already empty store.
    async fn clear_all_test_data(&self) -> Result<(), DataAccessError>;
}
