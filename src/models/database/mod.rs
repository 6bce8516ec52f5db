// src/models/database/mod.rs

pub mod session;
pub mod vote;

pub use session::Session;
pub use vote::{AvgVoteResult, Vote};
