use std::io;
use thiserror::Error;

/// Unified error type for the natter application
#[derive(Error, Debug)]
pub enum ChatError {
    /// App config file missing, unparseable, or incomplete; fatal at startup
    #[error("Configuration error: {0}")]
    Config(String),

    /// No credential record matches the requested model name
    #[error("No credentials found for model \"{0}\"")]
    CredentialNotFound(String),

    /// A credential record matched but is unusable (missing fields, bad file)
    #[error("Credential configuration error: {0}")]
    CredentialConfig(String),

    /// Transport, auth, or remote failure while invoking the model.
    /// Local to one turn; the session stays usable afterwards.
    #[error("Model invocation failed: {0}")]
    ModelInvocation(String),

    /// Line editor and user input errors
    #[error("Input error: {0}")]
    Input(String),

    /// IO-related errors
    #[error("IO error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl From<reqwest::Error> for ChatError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ChatError::ModelInvocation(format!("request timed out: {}", err))
        } else if err.is_connect() {
            ChatError::ModelInvocation(format!("connection failed: {}", err))
        } else if err.is_status() {
            ChatError::ModelInvocation(format!("API returned error status: {}", err))
        } else {
            ChatError::ModelInvocation(format!("request failed: {}", err))
        }
    }
}
