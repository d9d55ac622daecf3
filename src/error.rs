use thiserror::Error;

/// Failures a fetch/cache/render pass can hit. None of them is fatal: the
/// controller reports them and goes back to waiting for input.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// Association, TLS, HTTP status or transport failure. Retried.
    #[error("network failure: {0}")]
    Network(String),

    /// Wall clock is not set, so time-stamped data is refused.
    #[error("clock not synchronized")]
    ClockNotSynchronized,

    /// Backing storage for a cache entry could not be reserved.
    #[error("allocation failed")]
    Allocation,

    /// Body did not parse into a site record. Handled like a network failure.
    #[error("malformed site data: {0}")]
    Malformed(String),

    #[error("unknown site index {0}")]
    UnknownSite(usize),
}

impl FetchError {
    /// Whether another attempt against the data source may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, FetchError::Network(_) | FetchError::Malformed(_))
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(e: serde_json::Error) -> Self {
        FetchError::Malformed(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_errors_become_malformed() {
        let err: FetchError = serde_json::from_str::<u32>("{").unwrap_err().into();
        assert!(matches!(err, FetchError::Malformed(_)));
        assert!(err.is_retryable());
    }

    #[test]
    fn clock_refusal_is_not_retried() {
        assert!(!FetchError::ClockNotSynchronized.is_retryable());
        assert!(!FetchError::Allocation.is_retryable());
    }
}
