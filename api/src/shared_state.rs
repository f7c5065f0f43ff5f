use std::sync::Arc;

use invitehub_auth::token::TokenKey;
use invitehub_db::Pool;

use crate::{gate::MembershipGate, rate_limit::RateLimiter};

pub struct InnerState {
    pub production: bool,
    pub db: Pool,

    pub token_key: TokenKey,
    pub rate_limiter: RateLimiter,
    pub gate: MembershipGate,
}

pub type AppState = Arc<InnerState>;
