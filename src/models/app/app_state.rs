use std::sync::Arc;

use crate::db::Store;
use crate::services::{SessionService, VotingService};

#[derive(Clone)]
pub struct AppState {
    pub session_service: SessionService,
    pub voting_service: VotingService,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>) -> Self {
        let session_service = SessionService::new(store.clone());
        let voting_service = VotingService::new(store, session_service.clone());

        Self {
            session_service,
            voting_service,
        }
    }
}
