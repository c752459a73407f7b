use thiserror::Error;

/// Errors raised while validating, generating, or storing travel data
#[derive(Error, Debug)]
pub enum PlannerError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Completion transport failed: {0}")]
    Transport(String),

    #[error("Completion endpoint returned {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Could not parse completion response: {0}")]
    Parse(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, PlannerError>;

impl PlannerError {
    /// HTTP status code a caller should report for this error
    pub fn status_code(&self) -> u16 {
        match self {
            PlannerError::Validation(_) => 400,
            PlannerError::NotFound(_) => 404,
            PlannerError::Transport(_) | PlannerError::Http { .. } => 502,
            _ => 500,
        }
    }
}

impl From<reqwest::Error> for PlannerError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => PlannerError::Http {
                status: status.as_u16(),
                body: err.to_string(),
            },
            None => PlannerError::Transport(err.to_string()),
        }
    }
}
