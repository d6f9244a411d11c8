use super::AuthError;
use crate::domain_model::*;
use crate::domain_port::{DataAccessError, TransportError};
use reqwest::StatusCode;

/// A scenario expectation that did not hold.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AssertionFailure {
    #[error("{endpoint}: expected status {expected}, got {actual}")]
    UnexpectedStatus {
        endpoint: &'static str,
        expected: StatusCode,
        actual: StatusCode,
    },
    #[error("card {card}: expected balance {expected}, got {actual}")]
    BalanceMismatch {
        card: CardId,
        expected: i64,
        actual: i64,
    },
    #[error("total balance changed from {before} to {after}")]
    SumNotConserved { before: i64, after: i64 },
    #[error("card {0} is not listed")]
    CardMissing(CardId),
    #[error("user needs two distinct cards, found {0}")]
    NotEnoughCards(usize),
    #[error("transfer of {amount} was accepted (status {status}) but should have been rejected")]
    TransferAccepted { amount: i64, status: StatusCode },
}

#[derive(Debug, thiserror::Error)]
pub enum ScenarioError {
    #[error("assertion failed: {0}")]
    Assertion(#[from] AssertionFailure),
    #[error("authentication failed: {0}")]
    Auth(#[from] AuthError),
    #[error("transport failed: {0}")]
    Transport(#[from] TransportError),
    #[error("data access failed: {0}")]
    DataAccess(#[from] DataAccessError),
}

/// Authenticated session shared by the scenarios of one run.
/// Built once by the setup step and passed explicitly afterwards.
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub credentials: Credentials,
    pub user: UserRecord,
    pub token: SessionToken,
}

/// Balances of a source and destination card at one point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BalancePair {
    pub from: i64,
    pub to: i64,
}

impl BalancePair {
    pub fn total(&self) -> i64 {
        self.from + self.to
    }
}

/// Snapshot taken around a successful transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferOutcome {
    pub amount: i64,
    pub before: BalancePair,
    pub after: BalancePair,
}
