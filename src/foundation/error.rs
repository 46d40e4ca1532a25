pub type DlResult<T> = Result<T, DlError>;

/// Recoverable failures surfaced by the crate.
///
/// Contract violations (unbalanced save/restore, using an open slice, ...) are not
/// represented here; they panic.
#[derive(thiserror::Error, Debug)]
pub enum DlError {
    /// Caller-provided data was rejected.
    #[error("validation error: {0}")]
    Validation(String),

    /// A backend canvas or surface could not be produced.
    #[error("render error: {0}")]
    Render(String),

    /// The platform thread or its controller failed.
    #[error("platform error: {0}")]
    Platform(String),

    /// Configuration (de)serialization failed.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Anything else, with its source preserved.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DlError {
    /// Build a [`DlError::Validation`].
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`DlError::Render`].
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`DlError::Platform`].
    pub fn platform(msg: impl Into<String>) -> Self {
        Self::Platform(msg.into())
    }

    /// Build a [`DlError::Serde`].
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
