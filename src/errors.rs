/// Error types for the pricing client session.
/// Transport failures are recovered locally (alert + ready state).
/// Integrity failures (missing form field, malformed plot data, chart engine)
/// are contract violations and are surfaced as faults, not recovered.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("network error: {0}")]
    Network(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("missing form field: {0}")]
    MissingField(&'static str),

    #[error("malformed plot data: {0}")]
    PlotShape(String),

    #[error("chart engine error: {0}")]
    Chart(String),

    #[error("channel closed: {0}")]
    ChannelClosed(String),
}

impl ClientError {
    /// Transport failures get the generic alert; everything else is a fault.
    #[inline]
    pub fn is_transport(&self) -> bool {
        matches!(self, ClientError::Network(_) | ClientError::Parse(_))
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        ClientError::Network(e.to_string())
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(e: serde_json::Error) -> Self {
        ClientError::Parse(e.to_string())
    }
}

impl From<std::io::Error> for ClientError {
    fn from(e: std::io::Error) -> Self {
        ClientError::Network(e.to_string())
    }
}

pub type ClientResult<T> = Result<T, ClientError>;
