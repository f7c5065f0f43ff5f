use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::{object_id::TeamId, schema::*};

pub use crate::schema::teams::*;

#[derive(Clone, Debug, Queryable, Identifiable)]
#[diesel(primary_key(team_id))]
pub struct Team {
    pub team_id: TeamId,
    pub name: String,
    pub description: Option<String>,
    pub invite_link: String,
    pub max_members: i32,
    pub current_members: i32,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = teams)]
pub struct NewTeam {
    pub team_id: TeamId,
    pub name: String,
    pub description: Option<String>,
    pub invite_link: String,
    pub max_members: i32,
    pub current_members: i32,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}
