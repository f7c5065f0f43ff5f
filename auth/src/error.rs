use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Password hashing failure: {0}")]
    PasswordHasherError(String),

    #[error("Invalid password")]
    InvalidPassword,

    #[error("Failed to create token: {0}")]
    TokenCreateError(jsonwebtoken::errors::Error),

    #[error("Invalid token")]
    InvalidToken,
}
