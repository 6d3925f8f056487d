use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::{debug, warn};
use webrtc::api::interceptor_registry::register_default_interceptors;
use webrtc::api::media_engine::MediaEngine;
use webrtc::api::APIBuilder;
use webrtc::ice_transport::ice_candidate::RTCIceCandidate;
use webrtc::ice_transport::ice_server::RTCIceServer;
use webrtc::interceptor::registry::Registry;
use webrtc::peer_connection::configuration::RTCConfiguration;
use webrtc::peer_connection::sdp::session_description::RTCSessionDescription;
use webrtc::peer_connection::RTCPeerConnection;

use crate::error::Result;
use crate::peer::types::{IceCandidate, PeerEvent};
use crate::peer::{MediaTransport, TransportFactory};

/// Adapter over `RTCPeerConnection` for the answering side of a session.
///
/// Connectivity-helper URLs are applied at construction; everything the
/// connection discovers afterwards is surfaced on the event stream handed
/// out by [`WebRtcTransport::open`].
pub struct WebRtcTransport {
    pc: Arc<RTCPeerConnection>,
    closed: AtomicBool,
}

impl WebRtcTransport {
    pub async fn open(
        ice_servers: &[String],
    ) -> Result<(Self, mpsc::UnboundedReceiver<PeerEvent>)> {
        let mut media = MediaEngine::default();
        media.register_default_codecs()?;
        let mut registry = Registry::new();
        registry = register_default_interceptors(registry, &mut media)?;
        let api = APIBuilder::new()
            .with_media_engine(media)
            .with_interceptor_registry(registry)
            .build();

        let pc = Arc::new(api.new_peer_connection(rtc_config(ice_servers)).await?);
        let (tx, rx) = mpsc::unbounded_channel();

        let candidate_tx = tx.clone();
        pc.on_ice_candidate(Box::new(move |candidate: Option<RTCIceCandidate>| {
            let tx = candidate_tx.clone();
            Box::pin(async move {
                match candidate {
                    Some(c) => match IceCandidate::from_rtc(&c) {
                        Ok(candidate) => {
                            debug!(candidate = %candidate.candidate, "local candidate discovered");
                            let _ = tx.send(PeerEvent::Candidate(Some(candidate)));
                        }
                        Err(e) => warn!(error = %e, "could not serialize local candidate"),
                    },
                    // A null candidate marks the end of gathering.
                    None => {
                        debug!("candidate gathering complete");
                        let _ = tx.send(PeerEvent::Candidate(None));
                    }
                }
            })
        }));

        let state_tx = tx.clone();
        pc.on_ice_connection_state_change(Box::new(move |state| {
            let tx = state_tx.clone();
            debug!(?state, "ice connection state changed");
            Box::pin(async move {
                let _ = tx.send(PeerEvent::ConnectionState(state));
            })
        }));

        let track_tx = tx;
        pc.on_track(Box::new(move |track, _receiver, _transceiver| {
            let tx = track_tx.clone();
            debug!(kind = %track.kind(), "remote track received");
            Box::pin(async move {
                let _ = tx.send(PeerEvent::Track(track));
            })
        }));

        Ok((
            Self {
                pc,
                closed: AtomicBool::new(false),
            },
            rx,
        ))
    }
}

#[async_trait]
impl MediaTransport for WebRtcTransport {
    async fn apply_remote_description(&self, desc: RTCSessionDescription) -> Result<()> {
        self.pc.set_remote_description(desc).await?;
        Ok(())
    }

    async fn create_local_answer(&self) -> Result<RTCSessionDescription> {
        Ok(self.pc.create_answer(None).await?)
    }

    async fn commit_local_description(&self, desc: RTCSessionDescription) -> Result<()> {
        self.pc.set_local_description(desc).await?;
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        self.pc.close().await?;
        Ok(())
    }
}

/// Default factory: one fresh `RTCPeerConnection` per session.
pub struct WebRtcTransportFactory;

#[async_trait]
impl TransportFactory for WebRtcTransportFactory {
    async fn open(
        &self,
        ice_servers: &[String],
    ) -> Result<(Arc<dyn MediaTransport>, mpsc::UnboundedReceiver<PeerEvent>)> {
        let (transport, events) = WebRtcTransport::open(ice_servers).await?;
        let transport: Arc<dyn MediaTransport> = Arc::new(transport);
        Ok((transport, events))
    }
}

/// The service hands out bare URLs; each becomes its own server entry.
fn rtc_config(ice_servers: &[String]) -> RTCConfiguration {
    RTCConfiguration {
        ice_servers: ice_servers
            .iter()
            .map(|url| RTCIceServer {
                urls: vec![url.clone()],
                ..Default::default()
            })
            .collect(),
        ..Default::default()
    }
}
