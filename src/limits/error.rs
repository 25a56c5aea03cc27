use thiserror::Error;

pub(crate) type LimitResult<T> = Result<T, LimitError>;

/// Failures surfaced by the limit store and evaluator.
#[derive(Debug, Error)]
pub(crate) enum LimitError {
    /// Rejected input; nothing was persisted.
    #[error("{0}")]
    Validation(String),
    #[error("Limit {0} not found")]
    NotFound(i64),
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

impl LimitError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        Self::Validation(reason.into())
    }

    #[cfg(test)]
    pub(crate) fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}
