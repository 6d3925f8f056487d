pub mod connection;
pub mod types;

pub use connection::{WebRtcTransport, WebRtcTransportFactory};
pub use types::{IceCandidate, PeerEvent};

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;
use webrtc::peer_connection::sdp::session_description::RTCSessionDescription;

use crate::error::Result;

/// Session-facing surface of the media transport.
///
/// Call order per session is fixed: `apply_remote_description` once, then
/// `create_local_answer`, then `commit_local_description`. `close` may be
/// called at any point and is a no-op on an already-closed transport.
#[async_trait]
pub trait MediaTransport: Send + Sync {
    async fn apply_remote_description(&self, desc: RTCSessionDescription) -> Result<()>;

    /// Suspends until the transport has generated a local description.
    async fn create_local_answer(&self) -> Result<RTCSessionDescription>;

    async fn commit_local_description(&self, desc: RTCSessionDescription) -> Result<()>;

    /// Releases all transport resources.
    async fn close(&self) -> Result<()>;
}

/// Builds one configured transport per session, wired to an event stream.
#[async_trait]
pub trait TransportFactory: Send + Sync {
    /// Opens a transport with the given connectivity-helper URLs applied.
    /// The receiver carries candidate, connectivity and track events until
    /// the transport closes.
    async fn open(
        &self,
        ice_servers: &[String],
    ) -> Result<(Arc<dyn MediaTransport>, mpsc::UnboundedReceiver<PeerEvent>)>;
}
