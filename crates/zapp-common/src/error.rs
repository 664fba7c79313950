use thiserror::Error;

#[derive(Debug, Error)]
pub enum ZappError {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Ontology load error: {0}")]
    OntologyLoad(String),

    #[error("Substance catalog error: {0}")]
    SubstanceCatalog(String),

    #[error("Observation failed validation ({0} field error(s))")]
    InvalidObservation(usize),

    #[error("Submission error: {0}")]
    Submission(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Security error: {0}")]
    Security(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, ZappError>;
