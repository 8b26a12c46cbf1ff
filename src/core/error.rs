//! Error taxonomy for the run client.
//!
//! Validation problems are not errors here: they are reported as an ordered list of
//! messages by [`crate::validation::validate`] and never leave the client.

/// Schema registry lookups.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    #[error("unknown algorithm: {0}")]
    UnknownAlgorithm(String),
}

/// Failures of a submitted run, as seen at the orchestrator boundary.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RunError {
    /// The request never produced an HTTP response (offline, DNS, platform timeout).
    #[error("transport failure: {0}")]
    Transport(String),

    /// Non-2xx response. `message` is the server-supplied `error` string, if any.
    #[error("server returned status {status}")]
    Server { status: u16, message: Option<String> },

    /// 2xx response whose body is not a well-formed run result.
    #[error("malformed response: {0}")]
    Malformed(String),
}

pub const GENERIC_TRANSPORT_MESSAGE: &str =
    "Failed to communicate with the optimization service.";
pub const GENERIC_SERVER_MESSAGE: &str = "Server-side error.";

impl RunError {
    /// The single message shown in the error panel.
    pub fn user_message(&self) -> String {
        match self {
            RunError::Transport(_) => GENERIC_TRANSPORT_MESSAGE.to_string(),
            RunError::Server {
                message: Some(m), ..
            } if !m.trim().is_empty() => m.clone(),
            RunError::Server { .. } | RunError::Malformed(_) => {
                GENERIC_SERVER_MESSAGE.to_string()
            }
        }
    }
}

/// Playback setup and runtime failures. None of these are fatal to the page; each one
/// downgrades the animation panel to a placeholder.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PlaybackError {
    #[error("degenerate search bounds: min={min}, max={max}")]
    DegenerateBounds { min: f64, max: f64 },

    #[error("no search bounds available for the animation")]
    MissingBounds,

    #[error("background image failed to load: {0}")]
    ImageLoad(String),

    #[error("background image did not load within {after_ms} ms")]
    ImageTimeout { after_ms: u32 },

    #[error("timer setup failed: {0}")]
    Scheduler(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),

    #[error("config io error: {0}")]
    Io(#[from] std::io::Error),
}
