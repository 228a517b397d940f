use thiserror::Error;

pub type CoampResult<T> = Result<T, CoampError>;

#[derive(Debug, Error)]
pub enum CoampError {
    #[error("{0}")]
    InputInvalid(String),

    #[error("Gene {gene} not found or server error: {reason}")]
    FetchFailed { gene: String, reason: String },

    #[error("{0}")]
    IncompleteData(String),

    #[error("invalid graph data: {0}")]
    InvalidGraph(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CoampError {
    pub fn fetch_failed(gene: &str, reason: impl ToString) -> Self {
        Self::FetchFailed {
            gene: gene.to_owned(),
            reason: reason.to_string(),
        }
    }
}

impl From<serde_json::Error> for CoampError {
    fn from(error: serde_json::Error) -> Self {
        Self::InvalidGraph(error.to_string())
    }
}

impl From<csv::Error> for CoampError {
    fn from(error: csv::Error) -> Self {
        Self::IncompleteData(format!("failed to serialize export: {error}"))
    }
}
