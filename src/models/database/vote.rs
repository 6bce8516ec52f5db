use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Vote {
    pub session_id: String,
    pub product_id: String,
    pub score: i32,
}

// Derived on every query, never stored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct AvgVoteResult {
    pub avg: f64,
    pub vote_count: i64,
    pub product_id: String,
}
