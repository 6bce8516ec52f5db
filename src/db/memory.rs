use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::Store;
use crate::error::StoreError;
use crate::models::{AvgVoteResult, Session, Vote};

/// Process-local [`Store`]. Nothing survives a restart.
#[derive(Default)]
pub struct MemoryStore {
    sessions: RwLock<HashMap<String, Session>>,
    // keyed by (session_id, product_id)
    votes: RwLock<BTreeMap<(String, String), i32>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn store_session(
        &self,
        session_id: &str,
        expire_at: DateTime<Utc>,
    ) -> Result<Session, StoreError> {
        let session = Session {
            session_id: session_id.to_string(),
            expire_at,
        };

        let mut sessions = self.sessions.write().await;
        if sessions.contains_key(session_id) {
            return Err(StoreError::backend(
                "cannot insert session",
                format!("duplicate session id {session_id}"),
            ));
        }
        sessions.insert(session_id.to_string(), session.clone());

        Ok(session)
    }

    async fn get_session(&self, session_id: &str) -> Result<Option<Session>, StoreError> {
        Ok(self.sessions.read().await.get(session_id).cloned())
    }

    async fn upsert_vote(
        &self,
        session_id: &str,
        product_id: &str,
        score: i32,
    ) -> Result<Vote, StoreError> {
        self.votes
            .write()
            .await
            .insert((session_id.to_string(), product_id.to_string()), score);

        Ok(Vote {
            session_id: session_id.to_string(),
            product_id: product_id.to_string(),
            score,
        })
    }

    async fn get_session_votes(&self, session_id: &str) -> Result<Vec<Vote>, StoreError> {
        let votes = self.votes.read().await;

        Ok(votes
            .iter()
            .filter(|((sid, _), _)| sid == session_id)
            .map(|((sid, pid), score)| Vote {
                session_id: sid.clone(),
                product_id: pid.clone(),
                score: *score,
            })
            .collect())
    }

    async fn get_avg_product_votes(
        &self,
        product_id: &str,
    ) -> Result<Option<AvgVoteResult>, StoreError> {
        let votes = self.votes.read().await;

        let (sum, count) = votes
            .iter()
            .filter(|((_, pid), _)| pid == product_id)
            .fold((0i64, 0i64), |(sum, count), (_, score)| {
                (sum + i64::from(*score), count + 1)
            });

        if count == 0 {
            return Ok(None);
        }

        Ok(Some(AvgVoteResult {
            avg: sum as f64 / count as f64,
            vote_count: count,
            product_id: product_id.to_string(),
        }))
    }
}
