use serde::{Deserialize, Serialize};
use validator::Validate;

/// Body of `POST /api/v1/votes`. Missing fields fall back to their defaults so
/// that absence shows up as a rule violation rather than a parse failure.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct VoteRequest {
    #[validate(length(min = 1))]
    pub product_id: String,
    #[validate(range(min = 1, max = 5))]
    pub score: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldViolation {
    pub error: bool,
    pub failed_field: String,
    pub tag: String,
    pub value: serde_json::Value,
}
