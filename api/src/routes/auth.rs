use axum::{
    extract::State, http::StatusCode, response::IntoResponse, routing::post, Json, Router,
};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use db::{admins, admins::AdminCredential, object_id::AdminId, PoolExt};
use invitehub_auth as auth;
use invitehub_db as db;

use crate::{shared_state::AppState, Error};

#[derive(Debug, Deserialize)]
pub struct LoginInput {
    username: Option<String>,
    password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LoginOutput {
    token: String,
    admin: AdminSummary,
}

#[derive(Debug, Serialize)]
pub struct AdminSummary {
    id: AdminId,
    username: String,
}

async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginInput>,
) -> Result<impl IntoResponse, Error> {
    let (username, password) = match (body.username, body.password) {
        (Some(username), Some(password)) if !username.is_empty() && !password.is_empty() => {
            (username, password)
        }
        _ => return Err(Error::Validation("Username and password required")),
    };

    let credential = state
        .db
        .interact(move |conn| {
            admins::table
                .filter(admins::username.eq(username))
                .first::<AdminCredential>(conn)
                .optional()
                .map_err(Error::from)
        })
        .await?
        // Same response whether the username is unknown or the password
        // is wrong.
        .ok_or(Error::InvalidCredentials)?;

    auth::password::verify_password(&password, &credential.password_hash).map_err(|e| match e {
        auth::Error::InvalidPassword => Error::InvalidCredentials,
        e => Error::AuthError(e),
    })?;

    let token = state
        .token_key
        .issue(credential.admin_id.into_inner(), &credential.username)?;

    Ok((
        StatusCode::OK,
        Json(LoginOutput {
            token,
            admin: AdminSummary {
                id: credential.admin_id,
                username: credential.username,
            },
        }),
    ))
}

pub fn configure() -> Router<AppState> {
    Router::new().route("/login", post(login))
}
