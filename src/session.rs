use webrtc::peer_connection::sdp::session_description::RTCSessionDescription;

/// Lifecycle states of the single session a coordinator drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No session exists yet; only `create` is accepted.
    Idle,
    /// The service allocated a session and its offer has been applied
    /// to the local transport.
    Created,
    /// Local answer committed, the start exchange is in flight.
    Starting,
    /// Media is flowing; tasks can be submitted.
    Active,
    Closed,
    Failed,
}

impl SessionState {
    /// Closed and Failed accept no further lifecycle commands.
    pub fn is_terminal(self) -> bool {
        matches!(self, SessionState::Closed | SessionState::Failed)
    }
}

/// The negotiated session record.
///
/// Exists from a successful create exchange until the session is closed
/// and is mutated only by the lifecycle that owns it.
#[derive(Debug, Clone)]
pub struct SessionContext {
    /// Identifier assigned by the service, stable for the session's lifetime.
    pub id: String,
    /// The service's offer, applied once at creation.
    pub remote_description: RTCSessionDescription,
    /// Our answer; set exactly once while the start exchange runs.
    pub local_description: Option<RTCSessionDescription>,
    /// Connectivity-helper URLs handed out at creation.
    pub ice_servers: Vec<String>,
}

impl SessionContext {
    pub fn new(
        id: String,
        remote_description: RTCSessionDescription,
        ice_servers: Vec<String>,
    ) -> Self {
        Self {
            id,
            remote_description,
            local_description: None,
            ice_servers,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_states() {
        assert!(SessionState::Closed.is_terminal());
        assert!(SessionState::Failed.is_terminal());
        assert!(!SessionState::Idle.is_terminal());
        assert!(!SessionState::Created.is_terminal());
        assert!(!SessionState::Starting.is_terminal());
        assert!(!SessionState::Active.is_terminal());
    }

    #[test]
    fn fresh_context_has_no_local_description() {
        let ctx = SessionContext::new(
            "sess-1".into(),
            RTCSessionDescription::default(),
            vec!["stun:stun.example.org:3478".into()],
        );
        assert!(ctx.local_description.is_none());
        assert_eq!(ctx.ice_servers.len(), 1);
    }
}
