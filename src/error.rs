use thiserror::Error;

/// Failure taxonomy for one pipeline invocation. Each variant carries the
/// rendered context chain of the underlying failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EtlError {
    #[error("extraction failed: {0}")]
    Extraction(String),

    #[error("transformation failed: {0}")]
    Transformation(String),

    #[error("load failed: {0}")]
    Load(String),
}

impl EtlError {
    pub fn extraction(err: anyhow::Error) -> Self {
        Self::Extraction(format!("{err:#}"))
    }

    pub fn transformation(err: anyhow::Error) -> Self {
        Self::Transformation(format!("{err:#}"))
    }

    pub fn load(err: anyhow::Error) -> Self {
        Self::Load(format!("{err:#}"))
    }
}

pub type EtlResult<T> = std::result::Result<T, EtlError>;
