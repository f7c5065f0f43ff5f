use axum::{
    extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router,
};
use diesel::prelude::*;
use serde::Serialize;

use invitehub_db::PoolExt;

use crate::{shared_state::AppState, Error};

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    database: &'static str,
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let db_result = state
        .db
        .interact(|conn| {
            diesel::sql_query("SELECT 1")
                .execute(conn)
                .map_err(Error::from)
        })
        .await;

    if db_result.is_ok() {
        (
            StatusCode::OK,
            Json(HealthResponse {
                status: "ok",
                database: "connected",
            }),
        )
    } else {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(HealthResponse {
                status: "error",
                database: "disconnected",
            }),
        )
    }
}

pub fn configure() -> Router<AppState> {
    Router::new().route("/health", get(health))
}
