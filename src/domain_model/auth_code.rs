use super::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

#[derive(Debug, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(transparent)]
pub struct AuthCodeId(pub String);

impl fmt::Display for AuthCodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One-time verification code persisted by the service after a password login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthCodeRecord {
    pub id: AuthCodeId,
    pub user_id: UserId,
    pub code: String,
    pub created: DateTime<Utc>,
}

impl AuthCodeRecord {
    /// Picks the most recently created row; the last one wins on equal timestamps.
    pub fn latest(rows: impl IntoIterator<Item = AuthCodeRecord>) -> Option<AuthCodeRecord> {
        rows.into_iter().reduce(|latest, row| {
            if row.created >= latest.created {
                row
            } else {
                latest
            }
        })
    }
}

/// Codes of one user visible before a login: the newest creation time and
/// every row carrying it. `created` has one-second resolution, so a code issued
/// right after the snapshot may share its timestamp.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeSnapshot {
    since: Option<DateTime<Utc>>,
    seen: BTreeSet<AuthCodeId>,
}

impl CodeSnapshot {
    pub fn new(rows: impl IntoIterator<Item = AuthCodeRecord>) -> Self {
        let mut snapshot = Self::default();
        for row in rows {
            snapshot.since = snapshot.since.max(Some(row.created));
            snapshot.seen.insert(row.id);
        }
        snapshot
    }

    /// Creation time a fresh code cannot precede; `None` when no code existed.
    pub fn since(&self) -> Option<DateTime<Utc>> {
        self.since
    }

    pub fn contains(&self, id: &AuthCodeId) -> bool {
        self.seen.contains(id)
    }

    /// Newest row absent from the snapshot and not older than it.
    pub fn fresh<'a>(
        &self,
        rows: impl IntoIterator<Item = &'a AuthCodeRecord>,
    ) -> Option<AuthCodeRecord> {
        AuthCodeRecord::latest(
            rows.into_iter()
                .filter(|row| !self.contains(&row.id))
                .filter(|row| self.since.is_none_or(|since| row.created >= since))
                .cloned(),
        )
    }
}
