use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use uuid::Uuid;

use invitehub_db::object_id::AdminId;

use crate::{shared_state::AppState, Error};

#[derive(Clone, Debug)]
pub struct AdminIdentity {
    pub admin_id: AdminId,
    pub username: String,
}

/// Extractor for routes that require an admin token. Requests without an
/// `Authorization` header get a 401; requests with a token that fails
/// verification get a 400.
pub struct Authenticated(pub AdminIdentity);

fn bearer_token(parts: &Parts) -> Option<&str> {
    let header = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    // The scheme prefix is not checked; only the token part matters.
    let (_, token) = header.split_once(' ')?;
    if token.is_empty() {
        return None;
    }

    Some(token)
}

#[async_trait]
impl FromRequestParts<AppState> for Authenticated {
    type Rejection = Error;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or(Error::Unauthenticated)?;
        let claims = state
            .token_key
            .verify(token)
            .map_err(|_| Error::InvalidToken)?;
        let admin_id = Uuid::parse_str(&claims.sub)
            .map(AdminId::from)
            .map_err(|_| Error::InvalidToken)?;

        Ok(Authenticated(AdminIdentity {
            admin_id,
            username: claims.username,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts_with(header: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/");
        if let Some(h) = header {
            builder = builder.header(AUTHORIZATION, h);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn extracts_token_after_scheme() {
        let parts = parts_with(Some("Bearer abc.def.ghi"));
        assert_eq!(bearer_token(&parts), Some("abc.def.ghi"));
    }

    #[test]
    fn missing_or_malformed_headers_yield_none() {
        assert_eq!(bearer_token(&parts_with(None)), None);
        assert_eq!(bearer_token(&parts_with(Some("Bearer"))), None);
        assert_eq!(bearer_token(&parts_with(Some("Bearer "))), None);
    }
}
