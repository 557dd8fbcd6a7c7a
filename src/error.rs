use thiserror::Error;

pub type Result<T> = std::result::Result<T, SearchError>;

// Errors surfaced by a search backend.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Server error (status {status}): {message}")]
    Server { status: u16, message: String },

    #[error("Parse error: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for SearchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            SearchError::Parse(err.to_string())
        } else {
            SearchError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for SearchError {
    fn from(err: serde_json::Error) -> Self {
        SearchError::Parse(err.to_string())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("search query must not be empty")]
    EmptyQuery,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Network,
    Server,
    Parse,
}

// A fetch failure as kept in store state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureInfo {
    pub kind: FailureKind,
    pub message: String,
}

impl From<&SearchError> for FailureInfo {
    fn from(err: &SearchError) -> Self {
        let kind = match err {
            SearchError::Network(_) => FailureKind::Network,
            SearchError::Server { .. } => FailureKind::Server,
            SearchError::Parse(_) => FailureKind::Parse,
        };

        Self {
            kind,
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_info_from_server_error() {
        let err = SearchError::Server {
            status: 503,
            message: "unavailable".into(),
        };
        let info = FailureInfo::from(&err);

        assert_eq!(info.kind, FailureKind::Server);
        assert_eq!(info.message, "Server error (status 503): unavailable");
    }

    #[test]
    fn test_parse_error_from_serde() {
        let err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err = SearchError::from(err);
        assert!(matches!(err, SearchError::Parse(_)));
    }
}
