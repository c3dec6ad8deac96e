/// Failures talking to a document store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Location or credentials are missing. Raised before any request.
    #[error("Store configuration error: {0}")]
    Config(String),

    /// The stored revision moved on since the document was loaded.
    #[error(
        "Save rejected: the data file changed since revision {expected} was loaded. Reload and try again."
    )]
    Conflict { expected: String },

    #[error("Store request failed{}: {message}", status_suffix(.status))]
    Transport { status: Option<u16>, message: String },

    /// Payload could not be decoded or parsed.
    #[error("Data file is not valid: {0}")]
    Format(String),
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" (HTTP {})", s)).unwrap_or_default()
}

impl StoreError {
    pub fn transport(status: Option<u16>, message: impl Into<String>) -> Self {
        StoreError::Transport {
            status,
            message: message.into(),
        }
    }

    /// Worth retrying: network failures, rate limits and server errors.
    pub fn is_transient(&self) -> bool {
        match self {
            StoreError::Transport { status: None, .. } => true,
            StoreError::Transport {
                status: Some(status),
                ..
            } => *status == 429 || *status >= 500,
            _ => false,
        }
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, StoreError::Conflict { .. })
    }

    /// Extra guidance for common HTTP failures, shown under the error.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            StoreError::Transport {
                status: Some(401), ..
            } => Some("Authentication failed. Your GitHub token may be invalid or expired."),
            StoreError::Transport {
                status: Some(403), ..
            } => Some("Access denied or rate limited. Check the token's contents permission."),
            StoreError::Transport {
                status: Some(404), ..
            } => Some("Data file not found. Check owner, repo, branch and path in the config."),
            StoreError::Conflict { .. } => Some("Run the command again to work from the latest data."),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            return StoreError::Format(err.to_string());
        }
        StoreError::Transport {
            status: err.status().map(|s| s.as_u16()),
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(StoreError::transport(None, "connection reset").is_transient());
        assert!(StoreError::transport(Some(502), "bad gateway").is_transient());
        assert!(StoreError::transport(Some(429), "slow down").is_transient());
        assert!(!StoreError::transport(Some(404), "missing").is_transient());
        assert!(!StoreError::Conflict {
            expected: "abc".into()
        }
        .is_transient());
        assert!(!StoreError::Format("bad".into()).is_transient());
    }

    #[test]
    fn test_transport_display_includes_status() {
        let err = StoreError::transport(Some(404), "Not Found");
        assert_eq!(err.to_string(), "Store request failed (HTTP 404): Not Found");
        let err = StoreError::transport(None, "timed out");
        assert_eq!(err.to_string(), "Store request failed: timed out");
    }

    #[test]
    fn test_hints() {
        assert!(StoreError::transport(Some(401), "").hint().is_some());
        assert!(StoreError::transport(Some(500), "").hint().is_none());
        assert!(StoreError::Conflict {
            expected: "x".into()
        }
        .hint()
        .is_some());
    }
}
