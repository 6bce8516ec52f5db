use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use axum_extra::extract::cookie::CookieJar;
use tracing::warn;

use super::session::session_from_cookies;
use crate::error::AppError;
use crate::models::{AppState, AvgVoteResult, Vote, VoteRequest};
use crate::utils::validate_vote_request;

pub async fn upsert_vote_handler(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    payload: Result<Json<VoteRequest>, JsonRejection>,
) -> Result<Json<Vote>, AppError> {
    let session_id = session_from_cookies(&jar)?;

    let Json(request) = payload.map_err(|e| {
        warn!(error = %e, "Rejected vote payload");
        AppError::MalformedPayload
    })?;

    let violations = validate_vote_request(&request);
    if !violations.is_empty() {
        return Err(AppError::Validation(violations));
    }

    // In range after validation
    let score = i32::try_from(request.score).map_err(|_| AppError::MalformedPayload)?;

    let vote = state
        .voting_service
        .vote(&session_id, &request.product_id, score)
        .await?;

    Ok(Json(vote))
}

pub async fn get_votes_handler(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> Result<Json<Vec<Vote>>, AppError> {
    let session_id = session_from_cookies(&jar)?;

    let votes = state.voting_service.get_votes(&session_id).await?;

    Ok(Json(votes))
}

pub async fn get_avg_product_votes_handler(
    State(state): State<Arc<AppState>>,
    Path(product_id): Path<String>,
) -> Result<Json<AvgVoteResult>, AppError> {
    if product_id.is_empty() {
        return Err(AppError::BadRequest);
    }

    let avg = state
        .voting_service
        .get_avg_product_votes(&product_id)
        .await?;

    Ok(Json(avg))
}

// `/v1/votes/` with nothing after the slash
pub async fn missing_product_handler() -> AppError {
    AppError::BadRequest
}
