use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use db::{
    joins,
    joins::NewJoin,
    object_id::{JoinId, TeamId},
    teams,
    teams::Team,
    PoolExt,
};
use invitehub_db as db;

use crate::{shared_state::AppState, Error};

/// Listing entry for visitors. The invite link stays hidden until they
/// actually join.
#[derive(Debug, Serialize, Queryable, Selectable)]
#[diesel(table_name = teams)]
pub struct PublicTeam {
    #[diesel(column_name = team_id)]
    id: TeamId,
    name: String,
    description: Option<String>,
    max_members: i32,
    current_members: i32,
    is_active: bool,
}

#[derive(Debug, Deserialize)]
pub struct JoinInput {
    email: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinOutput {
    success: bool,
    message: String,
    invite_link: String,
    team_name: String,
}

async fn list_open_teams(State(state): State<AppState>) -> Result<impl IntoResponse, Error> {
    let teams = state
        .db
        .interact(move |conn| {
            teams::table
                .filter(teams::is_active.eq(true))
                .filter(teams::current_members.lt(teams::max_members))
                .order(teams::created_at.desc())
                .select(PublicTeam::as_select())
                .load::<PublicTeam>(conn)
                .map_err(Error::from)
        })
        .await?;

    Ok((StatusCode::OK, Json(teams)))
}

async fn join_team(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Path(team_id): Path<TeamId>,
    body: Option<Json<JoinInput>>,
) -> Result<impl IntoResponse, Error> {
    let ip_address = addr.ip().to_string();
    if state.rate_limiter.check(&ip_address).is_limited() {
        return Err(Error::RateLimited);
    }

    let email = body
        .and_then(|Json(body)| body.email)
        .map(|email| email.trim().to_string())
        .filter(|email| !email.is_empty());

    let output = state
        .db
        .transaction(move |conn| {
            let team = teams::table
                .filter(teams::team_id.eq(team_id))
                .filter(teams::is_active.eq(true))
                .filter(teams::current_members.lt(teams::max_members))
                .first::<Team>(conn)
                .optional()?
                .ok_or(Error::TeamUnavailable)?;

            let Some(email) = email else {
                // Anonymous joins hand out the link without recording
                // anything or taking a member slot.
                return Ok(JoinOutput {
                    success: true,
                    message: "Click the link below to join the team!".to_string(),
                    invite_link: team.invite_link,
                    team_name: team.name,
                });
            };

            let join = NewJoin {
                join_id: JoinId::new(),
                team_id,
                email: Some(email),
                ip_address,
                joined_at: Utc::now().naive_utc(),
            };

            diesel::insert_into(joins::table)
                .values(&join)
                .execute(conn)
                .map_err(|e| match e {
                    diesel::result::Error::DatabaseError(
                        diesel::result::DatabaseErrorKind::UniqueViolation,
                        _,
                    ) => Error::DuplicateJoin,
                    e => Error::from(e),
                })?;

            let updated = diesel::update(
                teams::table
                    .filter(teams::team_id.eq(team_id))
                    .filter(teams::current_members.lt(teams::max_members)),
            )
            .set(teams::current_members.eq(teams::current_members + 1))
            .execute(conn)?;

            // Someone else took the last slot between our read and this
            // update. Returning an error rolls the inserted join back.
            if updated == 0 {
                return Err(Error::TeamUnavailable);
            }

            Ok(JoinOutput {
                success: true,
                message: "Successfully joined the team!".to_string(),
                invite_link: team.invite_link,
                team_name: team.name,
            })
        })
        .await?;

    Ok((StatusCode::OK, Json(output)))
}

pub fn configure() -> Router<AppState> {
    Router::new()
        .route("/", get(list_open_teams))
        .route("/:team_id/join", post(join_team))
}
