use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct CardId(pub String);

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A card as stored in `cards` and as listed by `GET /cards`.
/// `balance` is in minor currency units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardRecord {
    pub id: CardId,
    pub number: String,
    pub balance: i64,
}

/// Cards of one user. Row order carries no meaning, so lookups go by identity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CardSet(Vec<CardRecord>);

impl CardSet {
    pub fn new(cards: Vec<CardRecord>) -> Self {
        Self(cards)
    }

    pub fn by_id(&self, id: &CardId) -> Option<&CardRecord> {
        self.0.iter().find(|card| &card.id == id)
    }

    pub fn by_number(&self, number: &str) -> Option<&CardRecord> {
        self.0.iter().find(|card| card.number == number)
    }

    pub fn balance_of(&self, id: &CardId) -> Option<i64> {
        self.by_id(id).map(|card| card.balance)
    }

    pub fn total_balance(&self) -> i64 {
        self.0.iter().map(|card| card.balance).sum()
    }

    /// Two distinct cards, the better funded one first. Equal balances fall back
    /// to id order, so the choice never depends on row order.
    pub fn funded_pair(&self) -> Option<(&CardRecord, &CardRecord)> {
        let mut cards: Vec<&CardRecord> = self.0.iter().collect();
        cards.sort_by(|a, b| b.balance.cmp(&a.balance).then_with(|| a.id.cmp(&b.id)));
        let (source, rest) = cards.split_first()?;
        let destination = rest.iter().find(|card| card.id != source.id)?;
        Some((*source, *destination))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CardRecord> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
