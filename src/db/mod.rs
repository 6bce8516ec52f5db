// src/db/mod.rs

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::info;

use crate::config::StoreConfig;
use crate::error::StoreError;
use crate::models::{AvgVoteResult, Session, Vote};

/// URI scheme that selects the in-process [`MemoryStore`].
pub const MEMORY_URI_SCHEME: &str = "memory://";

/// Everything the session and voting workflows need from persistence.
///
/// Lookups that match nothing return `Ok(None)` (or an empty vec); `Err` is
/// reserved for backend failures.
#[async_trait]
pub trait Store: Send + Sync {
    async fn store_session(
        &self,
        session_id: &str,
        expire_at: DateTime<Utc>,
    ) -> Result<Session, StoreError>;

    async fn get_session(&self, session_id: &str) -> Result<Option<Session>, StoreError>;

    /// Inserts the vote or overwrites the score of the existing
    /// `(session_id, product_id)` vote.
    async fn upsert_vote(
        &self,
        session_id: &str,
        product_id: &str,
        score: i32,
    ) -> Result<Vote, StoreError>;

    async fn get_session_votes(&self, session_id: &str) -> Result<Vec<Vote>, StoreError>;

    async fn get_avg_product_votes(
        &self,
        product_id: &str,
    ) -> Result<Option<AvgVoteResult>, StoreError>;
}

/// Opens the backend named by `config.uri`. Called once at startup.
pub async fn connect(config: &StoreConfig) -> Result<Arc<dyn Store>, StoreError> {
    if config.uri.starts_with(MEMORY_URI_SCHEME) {
        info!("Using in-memory store");
        return Ok(Arc::new(MemoryStore::new()));
    }

    let store = PgStore::connect(config).await?;
    Ok(Arc::new(store))
}
