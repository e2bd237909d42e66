use chrono::{DateTime, Utc};

/// A persisted token → URL mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub token: String,
    pub original_url: String,
    pub expires_at: Option<DateTime<Utc>>,
    /// Set only for system-generated tokens.
    pub id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl Entry {
    pub fn generated(
        id: i64,
        token: String,
        original_url: String,
        expires_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            token,
            original_url,
            expires_at,
            id: Some(id),
            created_at: Utc::now(),
        }
    }

    pub fn custom(
        token: String,
        original_url: String,
        expires_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            token,
            original_url,
            expires_at,
            id: None,
            created_at: Utc::now(),
        }
    }

    /// 是否已过期（无过期时间视为永不过期）
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|t| t < now)
    }
}

/// Outcome of an insert that must not overwrite an existing token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    AlreadyExists,
}
