use reqwest::StatusCode;

use crate::session::SessionState;

pub type Result<T> = std::result::Result<T, Error>;

/// Failures surfaced by lifecycle and signaling operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The signaling service answered with a non-success status.
    #[error("signaling service failed at {endpoint} ({status})")]
    RemoteFault {
        endpoint: &'static str,
        status: StatusCode,
    },

    /// The request never completed: DNS failure, refused connection,
    /// timeout, or an unreadable response body.
    #[error("signaling request failed: {0}")]
    TransportFault(#[from] reqwest::Error),

    /// A local precondition failed; nothing was sent to the service.
    #[error("{0}")]
    Validation(String),

    /// The operation is not permitted in the current session state.
    #[error("`{operation}` is not valid in state {state:?}")]
    InvalidState {
        operation: &'static str,
        state: SessionState,
    },

    /// The local media transport reported a failure.
    #[error("peer connection error: {0}")]
    Peer(#[from] webrtc::Error),
}
