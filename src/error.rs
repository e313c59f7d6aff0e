use thiserror::Error;

#[derive(Error, Debug)]
pub enum CueError {
    #[error("Failed to fetch '{resource}': {message}")]
    Network { resource: String, message: String },

    #[error("{0}")]
    Parse(String),

    #[error("Invalid timestamp: '{0}'")]
    Timestamp(String),

    #[error("Invalid manifest: {0}")]
    Manifest(#[from] serde_json::Error),
}

impl CueError {
    pub(crate) fn network<E: std::fmt::Display>(resource: &str, err: E) -> Self {
        CueError::Network {
            resource: resource.to_string(),
            message: err.to_string(),
        }
    }
}
