//! Client-side coordinator for real-time streaming avatar sessions.
//!
//! Drives one audio/video session against the remote avatar service:
//! create, offer/answer exchange, trickle-ICE candidate relay, in-session
//! text tasks, and teardown. Media negotiation itself is delegated to the
//! `webrtc` crate; this crate owns the signaling protocol and the session
//! state machine around it.

pub mod config;
pub mod error;
pub mod lifecycle;
pub mod peer;
pub mod session;
pub mod signaling;

pub use config::{ClientConfig, ConfigError};
pub use error::{Error, Result};
pub use lifecycle::{SessionEvent, SessionLifecycle};
pub use peer::{IceCandidate, MediaTransport, PeerEvent, TransportFactory};
pub use session::{SessionContext, SessionState};
pub use signaling::{Quality, SessionInfo, Signaling, SignalingClient};
