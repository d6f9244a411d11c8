use super::DataAccessError;
use crate::domain_model::*;
use chrono::{DateTime, Utc};

#[async_trait::async_trait]
pub trait AuthCodeRepo: Send + Sync {
    /// Most recently created code of the user, `None` if the service never issued one.
    /// Which row wins among equal timestamps is up to the store.
    async fn find_latest_auth_code(
        &self,
        user_id: &UserId,
    ) -> Result<Option<AuthCodeRecord>, DataAccessError>;

    /// Every code of the user created at or after `since`, in no particular order.
    async fn find_auth_codes_since(
        &self,
        user_id: &UserId,
        since: DateTime<Utc>,
    ) -> Result<Vec<AuthCodeRecord>, DataAccessError>;
}
