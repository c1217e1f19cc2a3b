#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("invalid server url {url}: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("stream ended without a result")]
    Incomplete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    Config,
    Network,
    Timeout,
    Server,
    Protocol,
}

impl TransportError {
    pub fn kind(&self) -> TransportErrorKind {
        match self {
            TransportError::InvalidUrl { .. } => TransportErrorKind::Config,
            TransportError::Http(e) if e.is_timeout() => TransportErrorKind::Timeout,
            TransportError::Http(_) => TransportErrorKind::Network,
            TransportError::Status { .. } => TransportErrorKind::Server,
            TransportError::Incomplete => TransportErrorKind::Protocol,
        }
    }
}
