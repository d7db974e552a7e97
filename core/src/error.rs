use thiserror::Error;

/// Everything that can go wrong between receiving a generation request and
/// handing level JSON back to the caller.
#[derive(Debug, Error)]
pub enum RelayError {
    /// The text-generation service could not be reached or refused the call
    /// (network, auth, quota). The message is relayed as-is.
    #[error("{0}")]
    Upstream(String),

    /// The model output contained no brace-delimited region.
    #[error("Could not parse level data from AI response")]
    Extraction,

    /// A brace-delimited region was found but is not valid JSON.
    #[error("{0}")]
    Parse(#[from] serde_json::Error),

    /// Valid JSON that does not have the level shape (strict mode only).
    #[error("level data does not match the expected shape: {0}")]
    Schema(#[source] serde_json::Error),
}

impl RelayError {
    pub fn upstream(message: impl Into<String>) -> Self {
        Self::Upstream(message.into())
    }

    /// Short machine-readable name, used as a structured log field.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Upstream(_) => "upstream",
            Self::Extraction => "extraction",
            Self::Parse(_) => "parse",
            Self::Schema(_) => "schema",
        }
    }
}

pub type Result<T> = std::result::Result<T, RelayError>;
