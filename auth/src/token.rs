use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Error;

/// How long an issued admin token stays valid. Tokens are self-contained
/// and can not be revoked before this expires.
pub const TOKEN_VALIDITY_SECS: i64 = 24 * 60 * 60;

/// Claims embedded in every admin access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminClaims {
    /// Subject, the admin's id as a UUID string.
    pub sub: String,
    /// Admin username at issuance time.
    pub username: String,
    /// Issued-at (Unix timestamp).
    pub iat: i64,
    /// Expiration (Unix timestamp).
    pub exp: i64,
}

/// HMAC key pair for signing and verifying admin tokens.
pub struct TokenKey {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl TokenKey {
    pub fn new(secret: &str) -> TokenKey {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        TokenKey {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Issue a token for the admin, valid for [TOKEN_VALIDITY_SECS].
    pub fn issue(&self, admin_id: Uuid, username: &str) -> Result<String, Error> {
        self.issue_with_lifetime(admin_id, username, Duration::seconds(TOKEN_VALIDITY_SECS))
    }

    pub fn issue_with_lifetime(
        &self,
        admin_id: Uuid,
        username: &str,
        lifetime: Duration,
    ) -> Result<String, Error> {
        let now = Utc::now().timestamp();
        let claims = AdminClaims {
            sub: admin_id.to_string(),
            username: username.to_string(),
            iat: now,
            exp: now + lifetime.num_seconds(),
        };

        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(Error::TokenCreateError)
    }

    /// Verify signature and expiry. Every failure mode collapses into
    /// [Error::InvalidToken] so callers can not tell them apart.
    pub fn verify(&self, token: &str) -> Result<AdminClaims, Error> {
        jsonwebtoken::decode::<AdminClaims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|_| Error::InvalidToken)
    }
}
