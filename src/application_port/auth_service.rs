use crate::domain_model::*;
use crate::domain_port::{DataAccessError, TransportError};
use reqwest::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("no user with login {0:?} in the database")]
    UserNotFound(String),
    #[error("invalid credentials (status {0})")]
    InvalidCredentials(StatusCode),
    #[error("unexpected login status {0}")]
    UnexpectedStatus(StatusCode),
    #[error("no auth code was ever issued for user {0}")]
    CodeNotIssued(UserId),
    #[error("no fresh auth code for user {user_id} within {waited_ms} ms")]
    CodeWaitTimedOut { user_id: UserId, waited_ms: u128 },
    #[error("verification rejected (status {0})")]
    VerificationRejected(StatusCode),
    #[error("verification succeeded without a token in the body")]
    MissingToken,
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    DataAccess(#[from] DataAccessError),
}

/// Outcome of a password login: who logged in and which codes existed before it.
#[derive(Debug, Clone)]
pub struct LoginTicket {
    pub user: UserRecord,
    pub snapshot: CodeSnapshot,
}

#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    /// `POST /auth`; succeeds only on 200.
    async fn login(&self, credentials: &Credentials) -> Result<LoginTicket, AuthError>;

    /// Waits until the code issued by `login` is visible in the database.
    async fn await_fresh_code(&self, ticket: &LoginTicket) -> Result<AuthCodeRecord, AuthError>;

    /// `POST /auth/verification`; succeeds only on 200 with a `token` field.
    async fn verify(&self, login: &str, code: &AuthCodeRecord) -> Result<SessionToken, AuthError>;

    /// Runs a full login → code → verification cycle. Every call starts over.
    async fn authenticate(&self, credentials: &Credentials) -> Result<SessionToken, AuthError> {
        let ticket = self.login(credentials).await?;
        let code = self.await_fresh_code(&ticket).await?;
        self.verify(&credentials.login, &code).await
    }
}
