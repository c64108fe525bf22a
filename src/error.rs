use reqwest::StatusCode;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, GleanError>;

/// Every way a fetch/parse/shape pass can come up short.
///
/// Nothing in the library panics on bad input; callers get one of these back
/// and can match on it (or on [`GleanError::kind`]) to tell a dead network
/// apart from a page that simply had nothing in it.
#[derive(Error, Debug)]
pub enum GleanError {
    /// The request never produced a response.
    #[error("transport error for {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} not found (404)")]
    NotFound { url: String },

    /// Any non-200 status other than 404.
    #[error("unexpected status {status} from {url}")]
    Status { url: String, status: StatusCode },

    /// The response arrived but did not have the expected structure.
    #[error("unexpected response shape: {message}")]
    Shape { message: String },

    /// Everything succeeded and nothing matched.
    #[error("nothing found: {message}")]
    Empty { message: String },

    #[error("configuration error: {message}")]
    Config { message: String },

    #[error("chart rendering failed: {message}")]
    Chart { message: String },

    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

/// Fieldless view of [`GleanError`], handy for assertions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Transport,
    NotFound,
    Status,
    Shape,
    Empty,
    Config,
    Chart,
    Io,
}

impl GleanError {
    pub fn shape<S: Into<String>>(message: S) -> Self {
        Self::Shape {
            message: message.into(),
        }
    }

    pub fn empty<S: Into<String>>(message: S) -> Self {
        Self::Empty {
            message: message.into(),
        }
    }

    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn chart<S: Into<String>>(message: S) -> Self {
        Self::Chart {
            message: message.into(),
        }
    }

    /// Maps a non-200 status to `NotFound` or `Status`.
    pub fn from_status(url: &str, status: StatusCode) -> Self {
        if status == StatusCode::NOT_FOUND {
            Self::NotFound {
                url: url.to_string(),
            }
        } else {
            Self::Status {
                url: url.to_string(),
                status,
            }
        }
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            GleanError::Transport { .. } => FailureKind::Transport,
            GleanError::NotFound { .. } => FailureKind::NotFound,
            GleanError::Status { .. } => FailureKind::Status,
            GleanError::Shape { .. } => FailureKind::Shape,
            GleanError::Empty { .. } => FailureKind::Empty,
            GleanError::Config { .. } => FailureKind::Config,
            GleanError::Chart { .. } => FailureKind::Chart,
            GleanError::Io { .. } => FailureKind::Io,
        }
    }

    /// True when the failure happened before any response was received.
    pub fn is_transport(&self) -> bool {
        matches!(self, GleanError::Transport { .. })
    }
}
