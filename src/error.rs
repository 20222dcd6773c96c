use reqwest::StatusCode;
use serde::Deserialize;
use std::{fmt, io};

/// The result type returned by camunda methods.
pub type Result<T> = std::result::Result<T, Error>;

/// The error type which is returned from camunda processing failures.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Error returned from invalid client base url configuration.
    #[error("invalid base url '{url:?}': {message:?}")]
    InvalidBaseUrl {
        /// The error message.
        message: String,
        /// The invalid url argument.
        url: String,
    },
    /// HTTP transport errors
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    /// The engine rejected the request as malformed (400).
    #[error("bad request: {0}")]
    BadRequest(ApiError),
    /// The request was not authenticated (401).
    #[error("unauthorized: {0}")]
    Unauthorized(ApiError),
    /// The authenticated user lacks the required permission (403).
    #[error("forbidden: {0}")]
    Forbidden(ApiError),
    /// The addressed resource does not exist (404).
    #[error("not found: {0}")]
    NotFound(ApiError),
    /// The engine failed while processing the request (500).
    #[error("internal server error: {0}")]
    InternalServerError(ApiError),
    /// Any other non-success response.
    #[error("request was not successful: {0}")]
    NoSuccess(ApiError),
    /// Payloads that do not match the expected shape.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    /// File I/O errors when reading deployment resources from disk.
    #[error("Invalid resource file {resource_file:?}: {source:?}")]
    FileIo {
        /// The specified resource file
        resource_file: String,
        /// The underlying `io::Error`.
        source: io::Error,
    },
    /// Timestamps not in the engine's date format.
    #[error("invalid timestamp '{0}'")]
    InvalidTimestamp(String),
    /// Invalid method parameters
    #[error("Invalid parameters: {0}")]
    InvalidParameters(&'static str),
}

impl Error {
    /// Map a non-success status and its decoded error body onto an error.
    pub(crate) fn from_status(error: ApiError) -> Self {
        match error.status {
            StatusCode::BAD_REQUEST => Error::BadRequest(error),
            StatusCode::UNAUTHORIZED => Error::Unauthorized(error),
            StatusCode::FORBIDDEN => Error::Forbidden(error),
            StatusCode::NOT_FOUND => Error::NotFound(error),
            StatusCode::INTERNAL_SERVER_ERROR => Error::InternalServerError(error),
            _ => Error::NoSuccess(error),
        }
    }

    /// The engine error details, if the error came from a non-success response.
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            Error::BadRequest(error)
            | Error::Unauthorized(error)
            | Error::Forbidden(error)
            | Error::NotFound(error)
            | Error::InternalServerError(error)
            | Error::NoSuccess(error) => Some(error),
            _ => None,
        }
    }
}

/// Error details returned by the engine alongside a non-success status.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiError {
    /// HTTP status of the response.
    pub status: StatusCode,
    /// The engine exception class, e.g. `InvalidRequestException`.
    pub kind: Option<String>,
    /// Human readable message.
    pub message: String,
    /// Engine error code, if any.
    pub code: Option<i64>,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(rename = "type")]
    kind: Option<String>,
    message: Option<String>,
    code: Option<i64>,
}

impl ApiError {
    /// Decode the engine's `{type, message, code}` body, falling back to the raw text.
    pub(crate) fn from_body(status: StatusCode, body: &str) -> Self {
        match serde_json::from_str::<ErrorBody>(body) {
            Ok(ErrorBody {
                kind,
                message,
                code,
            }) => ApiError {
                status,
                kind,
                message: message.unwrap_or_default(),
                code,
            },
            Err(_) => ApiError {
                status,
                kind: None,
                message: body.trim().to_owned(),
                code: None,
            },
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            Some(kind) => write!(f, "{} {}: {}", self.status.as_u16(), kind, self.message),
            None => write!(f, "{}: {}", self.status.as_u16(), self.message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_error_body_is_decoded() {
        let error = ApiError::from_body(
            StatusCode::NOT_FOUND,
            r#"{"type":"InvalidRequestException","message":"No task with id 'x'","code":0}"#,
        );
        assert_eq!(error.kind.as_deref(), Some("InvalidRequestException"));
        assert_eq!(error.message, "No task with id 'x'");
        assert_eq!(error.code, Some(0));
        assert!(matches!(Error::from_status(error), Error::NotFound(_)));
    }

    #[test]
    fn plain_text_body_becomes_message() {
        let error = ApiError::from_body(StatusCode::BAD_GATEWAY, "upstream down\n");
        assert_eq!(error.kind, None);
        assert_eq!(error.message, "upstream down");

        let error = Error::from_status(error);
        assert!(matches!(error, Error::NoSuccess(_)));
        assert_eq!(error.api_error().map(|e| e.status), Some(StatusCode::BAD_GATEWAY));
        assert_eq!(error.to_string(), "request was not successful: 502: upstream down");
    }
}
