// src/services/session_service/mod.rs

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::debug;
use uuid::Uuid;

use crate::db::Store;
use crate::error::{SessionError, StoreError};
use crate::models::Session;

/// Lifetime of a freshly minted session. Not renewed on use.
pub const SESSION_TTL: Duration = Duration::hours(1);

#[derive(Clone)]
pub struct SessionService {
    store: Arc<dyn Store>,
}

impl SessionService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Mints a new anonymous session. Every call yields a new token.
    pub async fn create(&self) -> Result<Session, StoreError> {
        self.create_at(Utc::now()).await
    }

    pub async fn create_at(&self, now: DateTime<Utc>) -> Result<Session, StoreError> {
        let session_id = Uuid::new_v4().to_string();

        let session = self
            .store
            .store_session(&session_id, now + SESSION_TTL)
            .await?;

        debug!(session_id = %session.session_id, expire_at = %session.expire_at, "Session created");
        Ok(session)
    }

    pub async fn validate(&self, session_id: &str) -> Result<(), SessionError> {
        self.validate_at(session_id, Utc::now()).await
    }

    /// Read-only check; the stored expiry is never extended.
    pub async fn validate_at(&self, session_id: &str, now: DateTime<Utc>) -> Result<(), SessionError> {
        let session = self
            .store
            .get_session(session_id)
            .await?
            .ok_or(SessionError::NotFound)?;

        if session.is_expired_at(now) {
            return Err(SessionError::Expired);
        }

        Ok(())
    }
}
