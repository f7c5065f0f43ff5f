use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::{
    object_id::{JoinId, TeamId},
    schema::*,
};

pub use crate::schema::joins::*;

#[derive(Clone, Debug, Queryable, Identifiable)]
#[diesel(primary_key(join_id))]
pub struct Join {
    pub join_id: JoinId,
    pub team_id: TeamId,
    pub email: Option<String>,
    pub ip_address: String,
    pub joined_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = joins)]
pub struct NewJoin {
    pub join_id: JoinId,
    pub team_id: TeamId,
    pub email: Option<String>,
    pub ip_address: String,
    pub joined_at: NaiveDateTime,
}
