use serde::Serialize;
use std::borrow::Cow;
use tracing::{event, Level};

/// The JSON body returned for every failed request:
/// `{"error": {"kind": "...", "message": "..."}}`.
#[derive(Debug, Serialize)]
pub struct ErrorResponseData {
    error: ErrorDetails,
}

#[derive(Debug, Serialize)]
struct ErrorDetails {
    kind: Cow<'static, str>,
    message: Cow<'static, str>,
}

impl ErrorResponseData {
    pub fn new(
        kind: impl Into<Cow<'static, str>>,
        message: impl Into<Cow<'static, str>>,
    ) -> ErrorResponseData {
        let ret = ErrorResponseData {
            error: ErrorDetails {
                kind: kind.into(),
                message: message.into(),
            },
        };

        event!(Level::ERROR, kind=%ret.error.kind, message=%ret.error.message);

        ret
    }

    pub fn kind(&self) -> &str {
        &self.error.kind
    }

    pub fn message(&self) -> &str {
        &self.error.message
    }
}
