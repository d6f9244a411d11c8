use super::DataAccessError;
use crate::domain_model::*;

#[async_trait::async_trait]
pub trait CardRepo: Send + Sync {
    /// All cards of the user in unspecified order.
    async fn find_cards(&self, user_id: &UserId) -> Result<CardSet, DataAccessError>;
}
