//! Error types for chatdesk.
//!
//! Errors fall into two families.  Validation errors are detected locally and never reach the
//! backend.  Everything else is a request error: the backend could not be reached, or it answered
//! with a non-success status.

use std::error;
use std::fmt;
use std::io;
use std::sync::Arc;

/// The main error type for chatdesk.
#[derive(Clone, Debug)]
pub enum Error {
    /// Input rejected locally before any network call.
    Validation {
        /// Human-readable error message.
        message: String,
    },

    /// The backend answered with a non-success status.
    Api {
        /// HTTP status code.
        status_code: u16,
        /// The `error` member of the response body, when the backend supplied one.
        message: Option<String>,
    },

    /// The backend rejected the credentials or the bearer token (HTTP 401).
    Authentication {
        /// The `error` member of the response body, when the backend supplied one.
        message: Option<String>,
    },

    /// The backend could not find the resource (HTTP 404).
    NotFound {
        /// The `error` member of the response body, when the backend supplied one.
        message: Option<String>,
        /// Resource ID.
        resource_id: Option<String>,
    },

    /// The backend could not be reached.
    Connection {
        /// Human-readable error message.
        message: String,
        /// Underlying cause.
        source: Option<Arc<dyn error::Error + Send + Sync>>,
    },

    /// The transport gave up waiting for the backend.
    Timeout {
        /// Human-readable error message.
        message: String,
        /// Duration of the timeout in seconds.
        duration: Option<f64>,
    },

    /// HTTP client error.
    HttpClient {
        /// Human-readable error message.
        message: String,
        /// The underlying error.
        source: Option<Arc<dyn error::Error + Send + Sync>>,
    },

    /// Error during JSON or YAML serialization or deserialization.
    Serialization {
        /// Human-readable error message.
        message: String,
        /// The underlying error.
        source: Option<Arc<dyn error::Error + Send + Sync>>,
    },

    /// I/O error.
    Io {
        /// Human-readable error message.
        message: String,
        /// The underlying error.
        source: Arc<io::Error>,
    },

    /// A URL parsing or manipulation error.
    Url {
        /// Human-readable error message.
        message: String,
        /// The underlying error.
        source: Option<url::ParseError>,
    },

    /// Invalid configuration.
    Config {
        /// Human-readable error message.
        message: String,
    },
}

impl Error {
    /// Creates a new validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Error::Validation {
            message: message.into(),
        }
    }

    /// Creates a new API error.
    pub fn api(status_code: u16, message: Option<String>) -> Self {
        Error::Api {
            status_code,
            message,
        }
    }

    /// Creates a new authentication error.
    pub fn authentication(message: Option<String>) -> Self {
        Error::Authentication { message }
    }

    /// Creates a new not found error.
    pub fn not_found(message: Option<String>, resource_id: Option<String>) -> Self {
        Error::NotFound {
            message,
            resource_id,
        }
    }

    /// Creates a new connection error.
    pub fn connection(
        message: impl Into<String>,
        source: Option<Box<dyn error::Error + Send + Sync>>,
    ) -> Self {
        Error::Connection {
            message: message.into(),
            source: source.map(Arc::from),
        }
    }

    /// Creates a new timeout error.
    pub fn timeout(message: impl Into<String>, duration: Option<f64>) -> Self {
        Error::Timeout {
            message: message.into(),
            duration,
        }
    }

    /// Creates a new HTTP client error.
    pub fn http_client(
        message: impl Into<String>,
        source: Option<Box<dyn error::Error + Send + Sync>>,
    ) -> Self {
        Error::HttpClient {
            message: message.into(),
            source: source.map(Arc::from),
        }
    }

    /// Creates a new serialization error.
    pub fn serialization(
        message: impl Into<String>,
        source: Option<Box<dyn error::Error + Send + Sync>>,
    ) -> Self {
        Error::Serialization {
            message: message.into(),
            source: source.map(Arc::from),
        }
    }

    /// Creates a new I/O error.
    pub fn io(message: impl Into<String>, source: io::Error) -> Self {
        Error::Io {
            message: message.into(),
            source: Arc::new(source),
        }
    }

    /// Creates a new URL error.
    pub fn url(message: impl Into<String>, source: Option<url::ParseError>) -> Self {
        Error::Url {
            message: message.into(),
            source,
        }
    }

    /// Creates a new configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
        }
    }

    /// Returns true if this error was raised locally before any network call.
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation { .. })
    }

    /// Returns true if this error came out of talking to the backend.
    pub fn is_request_error(&self) -> bool {
        matches!(
            self,
            Error::Api { .. }
                | Error::Authentication { .. }
                | Error::NotFound { .. }
                | Error::Connection { .. }
                | Error::Timeout { .. }
                | Error::HttpClient { .. }
                | Error::Serialization { .. }
        )
    }

    /// Returns true if this error is related to authentication.
    pub fn is_authentication(&self) -> bool {
        matches!(self, Error::Authentication { .. })
    }

    /// Returns true if this error is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }

    /// Returns true if the backend never answered.
    pub fn is_connection(&self) -> bool {
        matches!(
            self,
            Error::Connection { .. } | Error::Timeout { .. } | Error::HttpClient { .. }
        )
    }

    /// Returns the message the backend put in its error payload, if any.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Error::Api { message, .. } => message.as_deref(),
            Error::Authentication { message } => message.as_deref(),
            Error::NotFound { message, .. } => message.as_deref(),
            _ => None,
        }
    }

    /// Returns the status code associated with this error, if any.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Error::Api { status_code, .. } => Some(*status_code),
            Error::Authentication { .. } => Some(401),
            Error::NotFound { .. } => Some(404),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Validation { message } => write!(f, "{message}"),
            Error::Api {
                status_code,
                message,
            } => match message {
                Some(message) => write!(f, "API error ({status_code}): {message}"),
                None => write!(f, "API error ({status_code})"),
            },
            Error::Authentication { message } => match message {
                Some(message) => write!(f, "Authentication error: {message}"),
                None => write!(f, "Authentication error"),
            },
            Error::NotFound {
                message,
                resource_id,
            } => {
                let suffix = if let Some(resource_id) = resource_id {
                    format!(" [ID: {resource_id}]")
                } else {
                    "".to_string()
                };
                match message {
                    Some(message) => write!(f, "Resource not found: {message}{suffix}"),
                    None => write!(f, "Resource not found{suffix}"),
                }
            }
            Error::Connection { message, .. } => {
                write!(f, "Connection error: {message}")
            }
            Error::Timeout { message, duration } => {
                if let Some(duration) = duration {
                    write!(f, "Timeout error: {message} ({duration} seconds)")
                } else {
                    write!(f, "Timeout error: {message}")
                }
            }
            Error::HttpClient { message, .. } => {
                write!(f, "HTTP client error: {message}")
            }
            Error::Serialization { message, .. } => {
                write!(f, "Serialization error: {message}")
            }
            Error::Io { message, .. } => {
                write!(f, "I/O error: {message}")
            }
            Error::Url { message, .. } => {
                write!(f, "URL error: {message}")
            }
            Error::Config { message } => {
                write!(f, "Configuration error: {message}")
            }
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Error::Connection { source, .. } => source
                .as_ref()
                .map(|e| e.as_ref() as &(dyn error::Error + 'static)),
            Error::HttpClient { source, .. } => source
                .as_ref()
                .map(|e| e.as_ref() as &(dyn error::Error + 'static)),
            Error::Serialization { source, .. } => source
                .as_ref()
                .map(|e| e.as_ref() as &(dyn error::Error + 'static)),
            Error::Io { source, .. } => Some(source),
            Error::Url { source, .. } => {
                source.as_ref().map(|e| e as &(dyn error::Error + 'static))
            }
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::io(err.to_string(), err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::serialization(format!("JSON error: {err}"), Some(Box::new(err)))
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error::serialization(format!("YAML error: {err}"), Some(Box::new(err)))
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Error::url(format!("URL parse error: {err}"), Some(err))
    }
}

/// A specialized Result type for chatdesk operations.
pub type Result<T> = std::result::Result<T, Error>;
