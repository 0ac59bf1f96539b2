use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ClientError {
    #[error("Cannot connect to the backend at {base_url}. Make sure the server is running. ({message})")]
    Unreachable { base_url: String, message: String },
    #[error("The backend did not answer in time.")]
    Timeout,
    #[error("Backend returned HTTP {status}: {message}")]
    HttpStatus { status: u16, message: String },
    #[error("Invalid response from backend: {0}")]
    InvalidResponse(String),
    #[error("Backend did not return a job id.")]
    MissingJobId,
    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),
    #[error("{0}")]
    Rejected(String),
    #[error("Invalid url: {0}")]
    InvalidUrl(String),
    #[error("Could not set up the HTTP client: {0}")]
    ClientSetup(String),
}

impl ClientError {
    /// Transport-level failures that are worth retrying.
    pub fn is_network(&self) -> bool {
        matches!(self, ClientError::Unreachable { .. } | ClientError::Timeout)
    }
}
