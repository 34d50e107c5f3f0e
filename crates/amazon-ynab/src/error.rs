use std::path::PathBuf;

/// Failure talking to the ledger service.
#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    #[error("HTTP error")]
    Http(#[source] reqwest::Error),

    #[error("request timed out")]
    Timeout,

    #[error("{method} {url} returned {status}: {body}")]
    Status {
        method: &'static str,
        url: String,
        status: u16,
        body: String,
    },

    #[error("no budgets found")]
    NoBudgets,

    #[error("failed to decode response")]
    Decode(#[from] serde_json::Error),
}

impl From<reqwest::Error> for RemoteError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            RemoteError::Timeout
        } else {
            RemoteError::Http(error)
        }
    }
}

/// A single purchase or ledger entry that could not be interpreted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MalformedRecord {
    #[error("unparseable date {0:?}")]
    Date(String),

    #[error("unparseable amount {0:?}")]
    Amount(String),
}

/// Errors that end a run before any memo update is attempted.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("failed to fetch transactions")]
    Fetch(#[from] RemoteError),

    #[error("cache error: {0:#}")]
    Cache(anyhow::Error),

    #[error("failed to read purchases from {}: {error:#}", .path.display())]
    Input {
        path: PathBuf,
        error: anyhow::Error,
    },
}
