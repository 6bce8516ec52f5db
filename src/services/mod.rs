pub mod session_service;
pub mod voting_service;

pub use session_service::{SessionService, SESSION_TTL};
pub use voting_service::VotingService;
