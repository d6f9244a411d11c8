use super::DataAccessError;
use crate::domain_model::*;

#[async_trait::async_trait]
pub trait UserRepo: Send + Sync {
    async fn find_user_by_login(&self, login: &str) -> Result<Option<UserRecord>, DataAccessError>;
}
