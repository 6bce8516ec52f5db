use chrono::{DateTime, Utc};

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Session {
    pub session_id: String,
    pub expire_at: DateTime<Utc>,
}

impl Session {
    /// A session stays valid up to and including `expire_at`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expire_at
    }
}
