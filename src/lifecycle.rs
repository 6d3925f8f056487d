//! The session lifecycle state machine.
//!
//! Owns the one [`SessionContext`] and the one media transport, and is the
//! only component that mutates either. Commands validate the current state,
//! run their signaling exchange, then advance the state; candidate relay
//! runs beside them on its own task and never blocks a transition.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use webrtc::ice_transport::ice_connection_state::RTCIceConnectionState;
use webrtc::track::track_remote::TrackRemote;

use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::peer::{MediaTransport, PeerEvent, TransportFactory, WebRtcTransportFactory};
use crate::session::{SessionContext, SessionState};
use crate::signaling::{Quality, Signaling, SignalingClient};

/// Notifications for the presentation layer.
#[derive(Clone)]
pub enum SessionEvent {
    StateChanged(SessionState),
    /// Transport connectivity transition; observational only.
    Connectivity(RTCIceConnectionState),
    /// Inbound media, ready to be rendered.
    TrackReceived(Arc<TrackRemote>),
}

/// Drives one session from creation to teardown.
pub struct SessionLifecycle {
    signaling: Arc<dyn Signaling>,
    factory: Arc<dyn TransportFactory>,
    transport: Option<Arc<dyn MediaTransport>>,
    session: Option<SessionContext>,
    state: SessionState,
    events_tx: mpsc::UnboundedSender<SessionEvent>,
    relay_task: Option<JoinHandle<()>>,
}

impl SessionLifecycle {
    pub fn new(
        signaling: Arc<dyn Signaling>,
        factory: Arc<dyn TransportFactory>,
    ) -> (Self, mpsc::UnboundedReceiver<SessionEvent>) {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        (
            Self {
                signaling,
                factory,
                transport: None,
                session: None,
                state: SessionState::Idle,
                events_tx,
                relay_task: None,
            },
            events_rx,
        )
    }

    /// Wires the HTTP signaling client and the WebRTC transport factory.
    pub fn from_config(
        config: &ClientConfig,
    ) -> Result<(Self, mpsc::UnboundedReceiver<SessionEvent>)> {
        let signaling = Arc::new(SignalingClient::new(config)?);
        Ok(Self::new(signaling, Arc::new(WebRtcTransportFactory)))
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn session(&self) -> Option<&SessionContext> {
        self.session.as_ref()
    }

    /// Creates a session: allocates it remotely, opens the local transport
    /// with the returned connectivity helpers and applies the offer.
    pub async fn create(&mut self, quality: Quality) -> Result<()> {
        if self.state != SessionState::Idle {
            warn!(state = ?self.state, "create rejected; a session already exists");
            return Err(Error::InvalidState {
                operation: "create",
                state: self.state,
            });
        }

        let info = match self.signaling.new_session(quality).await {
            Ok(info) => info,
            Err(e) => return self.fail_with(e).await,
        };
        info!(
            session_id = %info.session_id,
            ice_servers = info.ice_servers.len(),
            "session created"
        );

        let (transport, peer_events) = match self.factory.open(&info.ice_servers).await {
            Ok(pair) => pair,
            Err(e) => return self.fail_with(e).await,
        };
        if let Err(e) = transport.apply_remote_description(info.sdp.clone()).await {
            if let Err(close_err) = transport.close().await {
                warn!(error = %close_err, "transport teardown failed");
            }
            return self.fail_with(e).await;
        }

        self.relay_task = Some(spawn_peer_event_pump(
            Arc::clone(&self.signaling),
            info.session_id.clone(),
            peer_events,
            self.events_tx.clone(),
        ));
        self.session = Some(SessionContext::new(
            info.session_id,
            info.sdp,
            info.ice_servers,
        ));
        self.transport = Some(transport);
        self.set_state(SessionState::Created);
        Ok(())
    }

    /// Starts media flow: answers the offer, commits the answer locally and
    /// announces it to the service.
    pub async fn start(&mut self) -> Result<()> {
        if self.state != SessionState::Created {
            return Err(Error::InvalidState {
                operation: "start",
                state: self.state,
            });
        }
        let (transport, session_id) = match (&self.transport, &self.session) {
            (Some(t), Some(s)) => (Arc::clone(t), s.id.clone()),
            _ => {
                return Err(Error::InvalidState {
                    operation: "start",
                    state: self.state,
                })
            }
        };

        self.set_state(SessionState::Starting);

        let answer = match transport.create_local_answer().await {
            Ok(answer) => answer,
            Err(e) => return self.fail_with(e).await,
        };
        if let Err(e) = transport.commit_local_description(answer.clone()).await {
            return self.fail_with(e).await;
        }
        if let Some(session) = self.session.as_mut() {
            session.local_description = Some(answer.clone());
        }

        if let Err(e) = self.signaling.start_session(&session_id, &answer).await {
            return self.fail_with(e).await;
        }
        info!(session_id = %session_id, "session started");
        self.set_state(SessionState::Active);
        Ok(())
    }

    /// Submits a text task into the active session and returns the
    /// service's acknowledgment.
    pub async fn send_task(&mut self, text: &str) -> Result<serde_json::Value> {
        if self.state != SessionState::Active {
            return Err(Error::InvalidState {
                operation: "send_task",
                state: self.state,
            });
        }
        if text.trim().is_empty() {
            return Err(Error::Validation("task text is empty".into()));
        }
        let session_id = match &self.session {
            Some(session) => session.id.clone(),
            None => {
                return Err(Error::InvalidState {
                    operation: "send_task",
                    state: self.state,
                })
            }
        };
        self.signaling.submit_task(&session_id, text).await
    }

    /// Tears the session down: local transport first, then the remote
    /// record. A remote fault cannot block local resource release, so it
    /// is logged and the session still ends up `Closed`.
    pub async fn close(&mut self) -> Result<()> {
        match self.state {
            SessionState::Idle => {
                return Err(Error::InvalidState {
                    operation: "close",
                    state: self.state,
                })
            }
            SessionState::Closed => return Ok(()),
            _ => {}
        }

        if let Some(task) = self.relay_task.take() {
            task.abort();
        }
        if let Some(transport) = self.transport.take() {
            if let Err(e) = transport.close().await {
                warn!(error = %e, "transport close failed");
            }
        }
        // Mark closed before the remote call so a late failure or an
        // in-flight response cannot revive the session.
        self.set_state(SessionState::Closed);

        if let Some(session) = self.session.take() {
            if let Err(e) = self.signaling.stop_session(&session.id).await {
                warn!(session_id = %session.id, error = %e, "remote stop failed");
            } else {
                info!(session_id = %session.id, "session closed");
            }
        }
        Ok(())
    }

    /// Shared failure path: local teardown, then `Failed`. The session
    /// record is kept so a later `close` can still reach the remote stop.
    async fn fail_with(&mut self, error: Error) -> Result<()> {
        if let Some(task) = self.relay_task.take() {
            task.abort();
        }
        if let Some(transport) = self.transport.take() {
            if let Err(e) = transport.close().await {
                warn!(error = %e, "transport teardown failed");
            }
        }
        self.set_state(SessionState::Failed);
        Err(error)
    }

    fn set_state(&mut self, next: SessionState) {
        if self.state != next {
            info!(from = ?self.state, to = ?next, "session state");
            self.state = next;
            let _ = self.events_tx.send(SessionEvent::StateChanged(next));
        }
    }
}

impl Drop for SessionLifecycle {
    fn drop(&mut self) {
        if let Some(task) = self.relay_task.take() {
            task.abort();
        }
    }
}

/// Consumes transport events for one session: candidates are relayed to
/// the service, connectivity and track events are forwarded to the
/// presentation stream. Runs until the transport closes or the session
/// is torn down.
fn spawn_peer_event_pump(
    signaling: Arc<dyn Signaling>,
    session_id: String,
    mut peer_events: mpsc::UnboundedReceiver<PeerEvent>,
    events_tx: mpsc::UnboundedSender<SessionEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = peer_events.recv().await {
            match event {
                PeerEvent::Candidate(Some(candidate)) => {
                    // Relay is best-effort: a rejected candidate is logged
                    // and the session carries on with the ones that landed.
                    let signaling = Arc::clone(&signaling);
                    let session_id = session_id.clone();
                    tokio::spawn(async move {
                        if let Err(e) =
                            signaling.submit_candidate(&session_id, &candidate).await
                        {
                            warn!(%session_id, error = %e, "candidate relay failed");
                        }
                    });
                }
                PeerEvent::Candidate(None) => {
                    debug!(%session_id, "candidate gathering finished");
                }
                PeerEvent::ConnectionState(state) => {
                    let _ = events_tx.send(SessionEvent::Connectivity(state));
                }
                PeerEvent::Track(track) => {
                    let _ = events_tx.send(SessionEvent::TrackReceived(track));
                }
            }
        }
    })
}
