use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::{object_id::AdminId, schema::*};

pub use crate::schema::admin_credentials::*;

#[derive(Clone, Debug, Queryable, Identifiable)]
#[diesel(primary_key(admin_id))]
#[diesel(table_name = admin_credentials)]
pub struct AdminCredential {
    pub admin_id: AdminId,
    pub username: String,
    pub password_hash: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = admin_credentials)]
pub struct NewAdminCredential {
    pub admin_id: AdminId,
    pub username: String,
    pub password_hash: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}
