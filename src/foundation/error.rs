/// Convenience result type used across gradekit.
pub type GradeResult<T> = Result<T, GradeError>;

/// Top-level error taxonomy used by engine APIs.
#[derive(thiserror::Error, Debug)]
pub enum GradeError {
    /// Unusable caller input: empty image, mismatched buffer, non-finite setting, unknown preset.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A suggestion response that could not be read as settings.
    #[error("malformed suggestion: {0}")]
    MalformedSuggestion(String),

    /// The render was cancelled between stages.
    #[error("render cancelled")]
    Cancelled,

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl GradeError {
    /// Build a [`GradeError::InvalidInput`] value.
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Build a [`GradeError::MalformedSuggestion`] value.
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedSuggestion(msg.into())
    }

    /// Build a [`GradeError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

impl From<serde_json::Error> for GradeError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serde(err.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
