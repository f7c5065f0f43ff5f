use std::collections::HashMap;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post, put},
    Json, Router,
};
use chrono::{NaiveDateTime, Utc};
use diesel::{prelude::*, sql_types::BigInt};
use serde::{Deserialize, Serialize};
use serde_json::json;

use db::{
    admins,
    admins::AdminCredential,
    joins,
    object_id::{JoinId, TeamId},
    teams,
    teams::{NewTeam, Team},
    PoolExt,
};
use invitehub_auth as auth;
use invitehub_db as db;

use crate::{auth::Authenticated, shared_state::AppState, Error};

#[derive(Debug, Deserialize)]
pub struct CreateTeamInput {
    name: Option<String>,
    description: Option<String>,
    invite_link: Option<String>,
    max_members: Option<i32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTeamOutput {
    success: bool,
    team_id: TeamId,
    message: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct UpdateTeamInput {
    name: Option<String>,
    description: Option<String>,
    invite_link: Option<String>,
    max_members: Option<i32>,
    is_active: Option<bool>,
}

/// Full team row plus the count of recorded joins, which can differ from
/// `current_members` after edits to the team.
#[derive(Debug, Serialize)]
pub struct AdminTeam {
    id: TeamId,
    name: String,
    description: Option<String>,
    invite_link: String,
    max_members: i32,
    current_members: i32,
    is_active: bool,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
    actual_joins: i64,
}

impl AdminTeam {
    fn from_team(team: Team, actual_joins: i64) -> AdminTeam {
        AdminTeam {
            id: team.team_id,
            name: team.name,
            description: team.description,
            invite_link: team.invite_link,
            max_members: team.max_members,
            current_members: team.current_members,
            is_active: team.is_active,
            created_at: team.created_at,
            updated_at: team.updated_at,
            actual_joins,
        }
    }
}

fn require_field(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

async fn list_teams(
    State(state): State<AppState>,
    Authenticated(_admin): Authenticated,
) -> Result<impl IntoResponse, Error> {
    let (teams, counts) = state
        .db
        .interact(|conn| {
            let teams = teams::table
                .order(teams::created_at.desc())
                .load::<Team>(conn)?;
            let counts = joins::table
                .group_by(joins::team_id)
                .select((joins::team_id, diesel::dsl::count_star()))
                .load::<(TeamId, i64)>(conn)?;
            Ok::<_, Error>((teams, counts))
        })
        .await?;

    let counts: HashMap<TeamId, i64> = counts.into_iter().collect();
    let teams = teams
        .into_iter()
        .map(|team| {
            let actual_joins = counts.get(&team.team_id).copied().unwrap_or(0);
            AdminTeam::from_team(team, actual_joins)
        })
        .collect::<Vec<_>>();

    Ok((StatusCode::OK, Json(teams)))
}

async fn create_team(
    State(state): State<AppState>,
    Authenticated(_admin): Authenticated,
    Json(body): Json<CreateTeamInput>,
) -> Result<impl IntoResponse, Error> {
    let (Some(name), Some(invite_link)) =
        (require_field(body.name), require_field(body.invite_link))
    else {
        return Err(Error::Validation("Name and invite link are required"));
    };

    let max_members = body.max_members.unwrap_or(50);
    if max_members < 1 {
        return Err(Error::Validation("Max members must be a positive number"));
    }

    let now = Utc::now().naive_utc();
    let team_id = TeamId::new();
    let team = NewTeam {
        team_id,
        name,
        description: require_field(body.description),
        invite_link,
        max_members,
        current_members: 0,
        is_active: true,
        created_at: now,
        updated_at: now,
    };

    state
        .db
        .interact(move |conn| {
            diesel::insert_into(teams::table)
                .values(&team)
                .execute(conn)
                .map_err(Error::from)
        })
        .await?;

    Ok((
        StatusCode::OK,
        Json(CreateTeamOutput {
            success: true,
            team_id,
            message: "Team created successfully",
        }),
    ))
}

async fn update_team(
    State(state): State<AppState>,
    Authenticated(_admin): Authenticated,
    Path(team_id): Path<TeamId>,
    Json(body): Json<UpdateTeamInput>,
) -> Result<impl IntoResponse, Error> {
    let (Some(name), Some(invite_link)) =
        (require_field(body.name), require_field(body.invite_link))
    else {
        return Err(Error::Validation("Name and invite link are required"));
    };

    let max_members = body.max_members.unwrap_or(50);
    if max_members < 1 {
        return Err(Error::Validation("Max members must be a positive number"));
    }

    let description = require_field(body.description);
    let is_active = body.is_active.unwrap_or(true);

    let updated = state
        .db
        .interact(move |conn| {
            diesel::update(teams::table.filter(teams::team_id.eq(team_id)))
                .set((
                    teams::name.eq(name),
                    teams::description.eq(description),
                    teams::invite_link.eq(invite_link),
                    teams::max_members.eq(max_members),
                    teams::is_active.eq(is_active),
                    teams::updated_at.eq(Utc::now().naive_utc()),
                ))
                .execute(conn)
                .map_err(Error::from)
        })
        .await?;

    if updated == 0 {
        return Err(Error::NotFound);
    }

    Ok((
        StatusCode::OK,
        Json(json!({ "success": true, "message": "Team updated successfully" })),
    ))
}

async fn delete_team(
    State(state): State<AppState>,
    Authenticated(_admin): Authenticated,
    Path(team_id): Path<TeamId>,
) -> Result<impl IntoResponse, Error> {
    state
        .db
        .transaction(move |conn| {
            // Joins go first so a failure can never leave them orphaned.
            diesel::delete(joins::table.filter(joins::team_id.eq(team_id))).execute(conn)?;

            let deleted =
                diesel::delete(teams::table.filter(teams::team_id.eq(team_id))).execute(conn)?;
            if deleted == 0 {
                return Err(Error::NotFound);
            }

            Ok(())
        })
        .await?;

    Ok((
        StatusCode::OK,
        Json(json!({ "success": true, "message": "Team deleted successfully" })),
    ))
}

#[derive(Debug, Serialize, QueryableByName)]
pub struct StatsOutput {
    #[diesel(sql_type = BigInt)]
    total_teams: i64,
    #[diesel(sql_type = BigInt)]
    active_teams: i64,
    #[diesel(sql_type = BigInt)]
    total_joins: i64,
    #[diesel(sql_type = BigInt)]
    unique_users: i64,
}

async fn get_stats(
    State(state): State<AppState>,
    Authenticated(_admin): Authenticated,
) -> Result<impl IntoResponse, Error> {
    let stats = state
        .db
        .interact(|conn| {
            diesel::sql_query(
                "SELECT \
                    (SELECT COUNT(*) FROM teams) AS total_teams, \
                    (SELECT COUNT(*) FROM teams WHERE is_active = 1) AS active_teams, \
                    (SELECT COUNT(*) FROM joins) AS total_joins, \
                    (SELECT COUNT(DISTINCT email) FROM joins) AS unique_users",
            )
            .get_result::<StatsOutput>(conn)
            .map_err(Error::from)
        })
        .await?;

    Ok((StatusCode::OK, Json(stats)))
}

#[derive(Debug, Serialize, Queryable)]
pub struct RecentJoin {
    id: JoinId,
    email: Option<String>,
    team_id: TeamId,
    ip_address: String,
    joined_at: NaiveDateTime,
    team_name: String,
}

async fn recent_joins(
    State(state): State<AppState>,
    Authenticated(_admin): Authenticated,
) -> Result<impl IntoResponse, Error> {
    let recent = state
        .db
        .interact(|conn| {
            joins::table
                .inner_join(teams::table)
                .order(joins::joined_at.desc())
                .limit(50)
                .select((
                    joins::join_id,
                    joins::email,
                    joins::team_id,
                    joins::ip_address,
                    joins::joined_at,
                    teams::name,
                ))
                .load::<RecentJoin>(conn)
                .map_err(Error::from)
        })
        .await?;

    Ok((StatusCode::OK, Json(recent)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSettingsInput {
    current_password: Option<String>,
    new_username: Option<String>,
    new_password: Option<String>,
}

#[derive(AsChangeset)]
#[diesel(table_name = admins)]
struct CredentialChanges {
    username: Option<String>,
    password_hash: Option<String>,
    updated_at: NaiveDateTime,
}

async fn update_settings(
    State(state): State<AppState>,
    Authenticated(admin): Authenticated,
    Json(body): Json<UpdateSettingsInput>,
) -> Result<impl IntoResponse, Error> {
    let current_password = body
        .current_password
        .filter(|p| !p.is_empty())
        .ok_or(Error::Validation("Current password is required"))?;

    let admin_id = admin.admin_id;
    let credential = state
        .db
        .interact(move |conn| {
            admins::table
                .find(admin_id)
                .first::<AdminCredential>(conn)
                .optional()
                .map_err(Error::from)
        })
        .await?
        .ok_or(Error::AdminNotFound)?;

    auth::password::verify_password(&current_password, &credential.password_hash).map_err(|e| {
        match e {
            auth::Error::InvalidPassword => Error::IncorrectCurrentPassword,
            e => Error::AuthError(e),
        }
    })?;

    let new_username = require_field(body.new_username);
    let new_password = body.new_password.filter(|p| !p.trim().is_empty());

    if let Some(password) = &new_password {
        if password.len() < 6 {
            return Err(Error::Validation(
                "New password must be at least 6 characters",
            ));
        }
    }

    if new_username.is_none() && new_password.is_none() {
        return Err(Error::NoChanges);
    }

    let password_hash = new_password
        .map(|p| auth::password::hash_password(&p))
        .transpose()?;

    let changes = CredentialChanges {
        username: new_username,
        password_hash,
        updated_at: Utc::now().naive_utc(),
    };

    state
        .db
        .interact(move |conn| {
            diesel::update(admins::table.find(admin_id))
                .set(&changes)
                .execute(conn)
                .map_err(Error::from)
        })
        .await?;

    Ok((
        StatusCode::OK,
        Json(json!({ "success": true, "message": "Settings updated successfully" })),
    ))
}

pub fn configure() -> Router<AppState> {
    Router::new()
        .route("/teams", get(list_teams))
        .route("/teams", post(create_team))
        .route("/teams/:team_id", put(update_team))
        .route("/teams/:team_id", delete(delete_team))
        .route("/stats", get(get_stats))
        .route("/recent-joins", get(recent_joins))
        .route("/settings", put(update_settings))
}
