//! Error types and exit codes for the assistant.
//!
//! Backend failures are modeled as a discriminated enum rather than a bag of
//! strings so that the top-level handler in `main` can map every failure kind
//! to one specific remediation message and a stable exit code.

use thiserror::Error;

/// Exit code for unrecoverable core errors (e.g. translation failure).
pub const EXIT_CORE_ERROR: i32 = 1;
/// Exit code for invalid CLI arguments (e.g. an empty prompt).
pub const EXIT_USAGE: i32 = 2;
/// Exit code shared by every backend/API failure kind.
pub const EXIT_BACKEND_ERROR: i32 = 3;

/// A failure while talking to the language-model API.
///
/// One variant per failure kind the API can surface. Each variant knows its
/// own user-facing remediation message; callers never recover from these
/// locally, they unwind to `main`.
#[derive(Error, Debug)]
pub enum BackendError {
    /// The request never reached the API.
    #[error("could not connect to the API")]
    Connection,

    /// The request reached the API but timed out.
    #[error("the API request timed out")]
    Timeout,

    /// The API rejected the request as malformed.
    #[error("the API rejected the request as malformed")]
    InvalidRequest,

    /// The API key is missing, invalid, expired or revoked.
    #[error("the API key was not accepted")]
    Authentication,

    /// The API key lacks the scope or role for the requested model.
    #[error("the API key lacks permission for this request")]
    Permission,

    /// Too many requests in too little time.
    #[error("the API rate limit was exceeded")]
    RateLimit,

    /// Temporary server-side failure.
    #[error("the API is temporarily unavailable")]
    ServiceUnavailable,

    /// The API reported a server-side error.
    #[error("the API reported an internal error")]
    Api,

    /// Anything the other variants do not cover.
    #[error("an unknown API error occurred: {0}")]
    Unknown(String),
}

impl BackendError {
    /// Classifies an HTTP status code from the API into an error variant.
    pub fn from_status(status: u16, body: &str) -> Self {
        match status {
            400 => Self::InvalidRequest,
            401 => Self::Authentication,
            403 => Self::Permission,
            429 => Self::RateLimit,
            500 => Self::Api,
            501..=599 => Self::ServiceUnavailable,
            _ => Self::Unknown(format!("HTTP {status}: {}", body.trim())),
        }
    }

    /// The user-facing remediation message for this failure kind.
    pub fn remediation(&self) -> String {
        match self {
            Self::Connection => {
                "The request failed to connect. Please check your internet \
                 connection and try again."
                    .to_string()
            }
            Self::Timeout => {
                "The request timed out. Please retry after a brief wait.".to_string()
            }
            Self::InvalidRequest => {
                "The request was malformed or missing a required parameter. \
                 This is likely a bug in conjure; please report it."
                    .to_string()
            }
            Self::Authentication => {
                "Your API key is invalid, expired or revoked. Run `conjure config` \
                 to set it up again. Get a key from https://console.anthropic.com"
                    .to_string()
            }
            Self::Permission => {
                "Your API key does not have the required scope or role for this \
                 request. Make sure it has access to the model being used."
                    .to_string()
            }
            Self::RateLimit => {
                "The request exceeded the API rate limit. Please wait a moment \
                 and try again, or check your plan limits."
                    .to_string()
            }
            Self::ServiceUnavailable => {
                "The API is temporarily unavailable. The problem is on the \
                 provider's side; please retry after a brief wait."
                    .to_string()
            }
            Self::Api => {
                "The API reported an internal error. Please retry after a brief \
                 wait; the problem is on the provider's side."
                    .to_string()
            }
            Self::Unknown(detail) => {
                format!(
                    "An unknown error occurred while talking to the API ({detail}). \
                     Please retry after a brief wait."
                )
            }
        }
    }
}

impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_connect() {
            Self::Connection
        } else {
            Self::Unknown(err.to_string())
        }
    }
}

/// Failure of the translation step.
#[derive(Error, Debug)]
pub enum TranslateError {
    /// The model did not produce a usable shell command.
    #[error("the model could not produce a shell command")]
    NoCommand,
    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Failure of the danger-assessment step.
///
/// `Unrecognized` is recoverable: the caller degrades to "not dangerous".
#[derive(Error, Debug)]
pub enum AssessError {
    /// The model's answer could not be parsed into an assessment.
    #[error("the model's danger assessment could not be parsed")]
    Unrecognized,
    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Failure of the revision step.
///
/// `Unusable` is recoverable: the caller keeps the prior command.
#[derive(Error, Debug)]
pub enum EditError {
    /// The model's answer was empty or could not be parsed into a command.
    #[error("the model could not apply the revision")]
    Unusable,
    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Top-level failure of an `ask` invocation, mapped to messages and exit
/// codes in `main`.
#[derive(Error, Debug)]
pub enum AppError {
    /// Translation failed before the loop was entered.
    #[error("conjure doesn't know how to do this")]
    Translation,
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error("{0}")]
    Other(anyhow::Error),
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err)
    }
}

impl AppError {
    /// The process exit code for this failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Backend(_) => EXIT_BACKEND_ERROR,
            Self::Translation | Self::Other(_) => EXIT_CORE_ERROR,
        }
    }
}
