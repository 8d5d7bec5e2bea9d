use serde::Deserialize;
use thiserror::Error;

/// The error payload Azure Resource Manager attaches to failure responses.
///
/// ARM wraps error details as `{"error": {"code": ..., "message": ...}}`,
/// but some services return the fields at the top level. Use
/// [`ErrorEnvelope::failsafe_from_bytes`] to extract whichever shape is
/// present without ever failing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ErrorEnvelope {
    /// Service-defined error code, e.g. `"ResourceNotFound"`.
    pub code: Option<String>,

    /// Human-readable description of the failure.
    pub message: Option<String>,

    /// The target of the error (such as the offending property name).
    pub target: Option<String>,

    /// Nested error details.
    #[serde(default)]
    pub details: Vec<ErrorEnvelope>,
}

impl ErrorEnvelope {
    /// Parse an error body, tolerating every malformed input.
    ///
    /// Tries the wrapped ARM shape first, then a flat object, and falls
    /// back to an empty envelope when the body is not JSON at all. The
    /// HTTP status always decides the error kind; a body that cannot be
    /// parsed only costs the diagnostic details.
    pub fn failsafe_from_bytes(body: &[u8]) -> Self {
        #[derive(Deserialize)]
        struct Wrapped {
            error: ErrorEnvelope,
        }

        if let Ok(wrapped) = serde_json::from_slice::<Wrapped>(body) {
            return wrapped.error;
        }

        serde_json::from_slice::<ErrorEnvelope>(body).unwrap_or_default()
    }

    /// Whether the envelope carries no details at all.
    pub fn is_empty(&self) -> bool {
        self.code.is_none()
            && self.message.is_none()
            && self.target.is_none()
            && self.details.is_empty()
    }
}

impl std::fmt::Display for ErrorEnvelope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (&self.code, &self.message) {
            (Some(code), Some(message)) => write!(f, "{code}: {message}"),
            (Some(code), None) => write!(f, "{code}"),
            (None, Some(message)) => write!(f, "{message}"),
            (None, None) => write!(f, "no error details"),
        }
    }
}

/// Errors that can occur when interacting with Azure Resource Manager.
#[derive(Error, Debug)]
pub enum ArmError {
    /// The service rejected the request credentials (HTTP 401).
    #[error("authentication failed: {envelope}")]
    Authentication { envelope: ErrorEnvelope },

    /// The addressed resource does not exist (HTTP 404).
    #[error("resource not found: {envelope}")]
    NotFound { envelope: ErrorEnvelope },

    /// The request conflicts with existing state (HTTP 409).
    #[error("resource conflict: {envelope}")]
    Conflict { envelope: ErrorEnvelope },

    /// The service returned a status outside the operation's success set.
    #[error("HTTP error {status}: {envelope}")]
    Http { status: u16, envelope: ErrorEnvelope },

    /// A request argument failed local validation before any I/O.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A credential could not produce a token.
    #[error("credential error: {0}")]
    Credential(String),

    /// The endpoint URL is invalid.
    #[error("invalid endpoint URL: {0}")]
    InvalidEndpoint(String),

    /// A required configuration value is missing.
    #[error("missing configuration: {0}")]
    MissingConfig(String),

    /// The HTTP request failed at the transport level.
    #[error("request error: {0}")]
    Request(#[from] reqwest::Error),

    /// A payload could not be serialized or deserialized.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The service violated the wire contract (e.g. an unusable poll target).
    #[error("protocol error: {0}")]
    Protocol(String),
}

impl ArmError {
    /// Classify a non-success HTTP status into the matching error kind.
    ///
    /// 401, 404, and 409 map to their dedicated variants; every other
    /// status becomes [`ArmError::Http`] with the status retained.
    pub fn from_status(status: u16, envelope: ErrorEnvelope) -> Self {
        match status {
            401 => Self::Authentication { envelope },
            404 => Self::NotFound { envelope },
            409 => Self::Conflict { envelope },
            _ => Self::Http { status, envelope },
        }
    }

    /// The HTTP status behind this error, when it is status-derived.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Authentication { .. } => Some(401),
            Self::NotFound { .. } => Some(404),
            Self::Conflict { .. } => Some(409),
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The error envelope attached to a status-derived error.
    pub fn envelope(&self) -> Option<&ErrorEnvelope> {
        match self {
            Self::Authentication { envelope }
            | Self::NotFound { envelope }
            | Self::Conflict { envelope }
            | Self::Http { envelope, .. } => Some(envelope),
            _ => None,
        }
    }
}

/// Result type alias for ARM operations.
pub type ArmResult<T> = std::result::Result<T, ArmError>;
