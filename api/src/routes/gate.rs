use axum::{
    extract::State, http::StatusCode, response::IntoResponse, routing::post, Json, Router,
};
use serde::Deserialize;

use crate::{gate, shared_state::AppState, Error};

#[derive(Debug, Deserialize)]
pub struct VerifyMembershipInput {
    username: Option<String>,
}

async fn verify_membership(
    State(state): State<AppState>,
    body: Option<Json<VerifyMembershipInput>>,
) -> Result<impl IntoResponse, Error> {
    let raw = body
        .and_then(|Json(body)| body.username)
        .unwrap_or_default();
    if raw.trim().is_empty() {
        return Err(Error::Validation("Username is required"));
    }

    let username = gate::clean_username(&raw)?;
    let verification = state.gate.verify(username).await?;

    Ok((StatusCode::OK, Json(verification)))
}

pub fn configure() -> Router<AppState> {
    Router::new().route("/verify-membership", post(verify_membership))
}
