use thiserror::Error;

/// Everything that can go wrong while pulling data for one sync cycle.
///
/// A valid but empty pnode list is not an error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("network error: {0}")]
    Network(String),

    #[error("request timed out after {0}ms")]
    Timeout(u64),

    #[error("service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed response: {0}")]
    Malformed(String),
}

impl FetchError {
    /// Unreachable host or timeout, as opposed to a bad answer
    pub fn is_network(&self) -> bool {
        matches!(self, FetchError::Network(_) | FetchError::Timeout(_))
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            FetchError::Malformed(e.to_string())
        } else if let Some(status) = e.status() {
            FetchError::Status {
                status: status.as_u16(),
                body: e.to_string(),
            }
        } else {
            FetchError::Network(e.to_string())
        }
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
    fn test_display_and_classification() {
        let e = FetchError::Timeout(10_000);
        assert_eq!(e.to_string(), "request timed out after 10000ms");
        assert!(e.is_network());

        let e = FetchError::Status { status: 502, body: "bad gateway".into() };
        assert_eq!(e.to_string(), "service returned 502: bad gateway");
        assert!(!e.is_network());
    }

    #[test]
    fn test_json_error_is_malformed() {
        let err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        assert!(matches!(FetchError::from(err), FetchError::Malformed(_)));
    }
}
