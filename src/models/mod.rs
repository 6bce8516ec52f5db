// src/models/mod.rs

pub mod api;
pub mod app;
pub mod database;

pub use api::{FieldViolation, VoteRequest};
pub use app::AppState;
pub use database::{AvgVoteResult, Session, Vote};
