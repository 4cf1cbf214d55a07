use thiserror::Error;

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Connection refused or timed out. The only kind the health poller treats as "not yet ready".
    #[error("Server unreachable: {0}")]
    Unreachable(String),

    #[error("Request error: {0}")]
    RequestError(String),

    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("Unexpected response shape: {0}")]
    UnexpectedResponse(String),

    #[error("Decode error: {0}")]
    DecodeError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Process error: {0}")]
    ProcessError(String),

    #[error("Installation step '{step}' failed with exit code {code:?}")]
    InstallFailed { step: String, code: Option<i32> },

    #[error("Verification failed: {0}")]
    VerificationFailed(String),

    #[error("Server did not become ready after {attempts} attempts")]
    ServerTimeout { attempts: u32 },

    #[error("Interrupted")]
    Interrupted,
}

impl MediaError {
    pub fn is_unreachable(&self) -> bool {
        matches!(self, MediaError::Unreachable(_))
    }

    /// Process exit status for a run that ended with this error.
    pub fn exit_code(&self) -> u8 {
        1
    }
}

impl From<reqwest::Error> for MediaError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_connect() || e.is_timeout() {
            MediaError::Unreachable(e.to_string())
        } else {
            MediaError::RequestError(e.to_string())
        }
    }
}

impl From<serde_json::Error> for MediaError {
    fn from(e: serde_json::Error) -> Self {
        MediaError::UnexpectedResponse(e.to_string())
    }
}

impl From<base64::DecodeError> for MediaError {
    fn from(e: base64::DecodeError) -> Self {
        MediaError::DecodeError(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, MediaError>;
