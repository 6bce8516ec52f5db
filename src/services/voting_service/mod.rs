// src/services/voting_service/mod.rs

use std::sync::Arc;

use tracing::{debug, warn};

use crate::db::Store;
use crate::error::{SessionError, VotingError};
use crate::models::{AvgVoteResult, Vote};
use crate::services::SessionService;

#[derive(Clone)]
pub struct VotingService {
    store: Arc<dyn Store>,
    session_service: SessionService,
}

impl VotingService {
    pub fn new(store: Arc<dyn Store>, session_service: SessionService) -> Self {
        Self {
            store,
            session_service,
        }
    }

    /// Records `score` for the pair, replacing any earlier score. The range
    /// is checked at the request boundary, not here.
    pub async fn vote(
        &self,
        session_id: &str,
        product_id: &str,
        score: i32,
    ) -> Result<Vote, VotingError> {
        self.check_session(session_id).await?;

        let vote = self.store.upsert_vote(session_id, product_id, score).await?;

        debug!(%session_id, %product_id, score, "Vote stored");
        Ok(vote)
    }

    pub async fn get_votes(&self, session_id: &str) -> Result<Vec<Vote>, VotingError> {
        self.check_session(session_id).await?;

        Ok(self.store.get_session_votes(session_id).await?)
    }

    /// Public read, no session required.
    pub async fn get_avg_product_votes(&self, product_id: &str) -> Result<AvgVoteResult, VotingError> {
        self.store
            .get_avg_product_votes(product_id)
            .await?
            .ok_or_else(|| VotingError::NotFound(product_id.to_string()))
    }

    // Unknown and expired sessions are reported the same way.
    async fn check_session(&self, session_id: &str) -> Result<(), VotingError> {
        match self.session_service.validate(session_id).await {
            Ok(()) => Ok(()),
            Err(SessionError::Store(e)) => Err(e.into()),
            Err(e) => {
                warn!(%session_id, reason = %e, "Rejected session");
                Err(VotingError::InvalidSession)
            }
        }
    }
}
