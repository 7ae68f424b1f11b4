use thiserror::Error;

#[derive(Error, Debug)]
pub enum FeedError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    // Transport errors
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP status {status} from {url}")]
    HttpStatus { status: u16, url: String },

    #[error("Malformed API payload: {0}")]
    Payload(String),

    // Application errors reported by the content API
    #[error("API error {code}: {message}")]
    Api { code: i64, message: String },

    #[error("Article not found: {0}")]
    NotFound(String),

    #[error("Content unavailable: {0}")]
    Unavailable(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // User input errors
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl From<serde_json::Error> for FeedError {
    fn from(err: serde_json::Error) -> Self {
        FeedError::Payload(err.to_string())
    }
}

/// Coarse classification used by controllers and the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Transport,
    Api,
    NotFound,
    Other,
}

impl FeedError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            FeedError::Http(_) | FeedError::HttpStatus { .. } | FeedError::Payload(_) => {
                ErrorKind::Transport
            }
            FeedError::Api { .. } => ErrorKind::Api,
            FeedError::NotFound(_) => ErrorKind::NotFound,
            _ => ErrorKind::Other,
        }
    }
}

pub type FeedResult<T> = Result<T, FeedError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_classification() {
        let status = FeedError::HttpStatus {
            status: 502,
            url: "https://example.com".to_string(),
        };
        assert_eq!(status.kind(), ErrorKind::Transport);
        assert_eq!(FeedError::Payload("bad".into()).kind(), ErrorKind::Transport);
        assert_eq!(
            FeedError::Api { code: 1, message: "nope".into() }.kind(),
            ErrorKind::Api
        );
        assert_eq!(FeedError::NotFound("42".into()).kind(), ErrorKind::NotFound);
        assert_eq!(FeedError::Config("x".into()).kind(), ErrorKind::Other);
    }

    #[test]
    fn test_api_error_message() {
        let err = FeedError::Api {
            code: 1001,
            message: "token expired".to_string(),
        };
        assert_eq!(err.to_string(), "API error 1001: token expired");
    }

    #[test]
    fn test_serde_error_maps_to_payload() {
        let err: FeedError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert!(matches!(err, FeedError::Payload(_)));
    }
}
