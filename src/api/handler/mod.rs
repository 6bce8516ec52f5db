// src/api/handler/mod.rs

pub mod health;
pub mod session;
pub mod votes;

pub use health::health_handler;
pub use session::{create_session_handler, SESSION_COOKIE};
pub use votes::{
    get_avg_product_votes_handler, get_votes_handler, missing_product_handler,
    upsert_vote_handler,
};
