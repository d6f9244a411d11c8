use crate::domain_model::*;
use crate::domain_port::*;
use chrono::{DateTime, Utc};
use nanoid::nanoid;
use std::sync::{Mutex, MutexGuard};

const CODE_ALPHABET: [char; 10] = ['0', '1', '2', '3', '4', '5', '6', '7', '8', '9'];

#[derive(Debug, Clone)]
struct StoredCard {
    user_id: UserId,
    card: CardRecord,
}

#[derive(Debug, Clone)]
pub struct CardTransaction {
    pub from: CardId,
    pub to: CardId,
    pub amount: i64,
}

#[derive(Debug, Default)]
struct Tables {
    users: Vec<UserRecord>,
    auth_codes: Vec<AuthCodeRecord>,
    cards: Vec<StoredCard>,
    card_transactions: Vec<CardTransaction>,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum FakeTransferError {
    #[error("unknown card {0}")]
    UnknownCard(String),
    #[error("amount must be positive")]
    NonPositiveAmount,
    #[error("insufficient funds")]
    InsufficientFunds,
}

/// Users, auth codes, cards and transactions kept in process memory.
#[derive(Debug, Default)]
pub struct InMemoryTestData {
    tables: Mutex<Tables>,
}

impl InMemoryTestData {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> MutexGuard<'_, Tables> {
        // A panicking test must not poison the store for the rest of the run.
        self.tables.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn seed_user(&self, login: &str, password: &str) -> UserRecord {
        let user = UserRecord {
            id: UserId(uuid::Uuid::new_v4().to_string()),
            login: login.to_owned(),
            password: password.to_owned(),
            status: "active".to_owned(),
        };
        self.tables().users.push(user.clone());
        user
    }

    pub fn seed_card(&self, user_id: &UserId, number: &str, balance: i64) -> CardRecord {
        let card = CardRecord {
            id: CardId(uuid::Uuid::new_v4().to_string()),
            number: number.to_owned(),
            balance,
        };
        self.tables().cards.push(StoredCard {
            user_id: user_id.clone(),
            card: card.clone(),
        });
        card
    }

    /// Persists a fresh five-digit code the way the service does after `/auth`.
    pub fn issue_code(&self, user_id: &UserId) -> AuthCodeRecord {
        let record = AuthCodeRecord {
            id: AuthCodeId(uuid::Uuid::new_v4().to_string()),
            user_id: user_id.clone(),
            code: nanoid!(5, &CODE_ALPHABET),
            created: Utc::now(),
        };
        self.tables().auth_codes.push(record.clone());
        record
    }

    pub fn user_by_login(&self, login: &str) -> Option<UserRecord> {
        self.tables().users.iter().find(|u| u.login == login).cloned()
    }

    /// Codes of the user in the order they were issued.
    pub fn codes_of(&self, user_id: &UserId) -> Vec<AuthCodeRecord> {
        self.tables()
            .auth_codes
            .iter()
            .filter(|code| &code.user_id == user_id)
            .cloned()
            .collect()
    }

    pub fn latest_code_of(&self, user_id: &UserId) -> Option<AuthCodeRecord> {
        AuthCodeRecord::latest(self.codes_of(user_id))
    }

    pub fn cards_of(&self, user_id: &UserId) -> CardSet {
        let tables = self.tables();
        CardSet::new(
            tables
                .cards
                .iter()
                .filter(|stored| &stored.user_id == user_id)
                .map(|stored| stored.card.clone())
                .collect(),
        )
    }

    /// Moves `amount` between two cards identified by number and records the transaction.
    pub fn apply_transfer(
        &self,
        from_number: &str,
        to_number: &str,
        amount: i64,
    ) -> Result<(), FakeTransferError> {
        if amount <= 0 {
            return Err(FakeTransferError::NonPositiveAmount);
        }
        let mut tables = self.tables();
        let position = |tables: &Tables, number: &str| {
            tables
                .cards
                .iter()
                .position(|stored| stored.card.number == number)
                .ok_or_else(|| FakeTransferError::UnknownCard(number.to_owned()))
        };
        let from = position(&*tables, from_number)?;
        let to = position(&*tables, to_number)?;

        if tables.cards[from].card.balance < amount {
            return Err(FakeTransferError::InsufficientFunds);
        }
        tables.cards[from].card.balance -= amount;
        tables.cards[to].card.balance += amount;

        let transaction = CardTransaction {
            from: tables.cards[from].card.id.clone(),
            to: tables.cards[to].card.id.clone(),
            amount,
        };
        tables.card_transactions.push(transaction);
        Ok(())
    }

    pub fn transactions(&self) -> Vec<CardTransaction> {
        self.tables().card_transactions.clone()
    }

    pub fn row_count(&self) -> usize {
        let tables = self.tables();
        tables.users.len()
            + tables.auth_codes.len()
            + tables.cards.len()
            + tables.card_transactions.len()
    }
}

#[async_trait::async_trait]
impl UserRepo for InMemoryTestData {
    async fn find_user_by_login(&self, login: &str) -> Result<Option<UserRecord>, DataAccessError> {
        Ok(self.user_by_login(login))
    }
}

#[async_trait::async_trait]
impl AuthCodeRepo for InMemoryTestData {
    async fn find_latest_auth_code(
        &self,
        user_id: &UserId,
    ) -> Result<Option<AuthCodeRecord>, DataAccessError> {
        Ok(self.latest_code_of(user_id))
    }

    async fn find_auth_codes_since(
        &self,
        user_id: &UserId,
        since: DateTime<Utc>,
    ) -> Result<Vec<AuthCodeRecord>, DataAccessError> {
        let mut codes = self.codes_of(user_id);
        codes.retain(|code| code.created >= since);
        Ok(codes)
    }
}

#[async_trait::async_trait]
impl CardRepo for InMemoryTestData {
    async fn find_cards(&self, user_id: &UserId) -> Result<CardSet, DataAccessError> {
        Ok(self.cards_of(user_id))
    }
}

#[async_trait::async_trait]
impl TestDataCleaner for InMemoryTestData {
    async fn clear_all_test_data(&self) -> Result<(), DataAccessError> {
        let mut tables = self.tables();
        tables.card_transactions.clear();
        tables.cards.clear();
        tables.auth_codes.clear();
        tables.users.clear();
        Ok(())
    }
}
