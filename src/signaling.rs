//! Request/response signaling against the avatar service.
//!
//! Five operations under `/v1/realtime.*`, each a JSON POST carrying the
//! API key. The client is stateless; session identity travels in every
//! request body.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;
use webrtc::peer_connection::sdp::session_description::RTCSessionDescription;

use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::peer::IceCandidate;

const NEW_ENDPOINT: &str = "/v1/realtime.new";
const START_ENDPOINT: &str = "/v1/realtime.start";
const ICE_ENDPOINT: &str = "/v1/realtime.ice";
const TASK_ENDPOINT: &str = "/v1/realtime.task";
const STOP_ENDPOINT: &str = "/v1/realtime.stop";

const API_KEY_HEADER: &str = "X-Api-Key";

/// Video quality tier requested at session creation.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Quality {
    Low,
    Medium,
    #[default]
    High,
}

/// Payload of a successful create exchange.
#[derive(Deserialize, Debug, Clone)]
pub struct SessionInfo {
    pub session_id: String,
    /// The service's offer.
    pub sdp: RTCSessionDescription,
    #[serde(default)]
    pub ice_servers: Vec<String>,
}

/// Every response wraps its payload in `{code, message, data}`.
#[derive(Deserialize, Debug)]
struct Envelope<T> {
    #[allow(dead_code)]
    #[serde(default)]
    code: Option<i64>,
    #[allow(dead_code)]
    #[serde(default)]
    message: Option<String>,
    data: T,
}

#[derive(Serialize)]
struct NewSessionRequest {
    quality: Quality,
}

#[derive(Serialize)]
struct StartSessionRequest<'a> {
    session_id: &'a str,
    sdp: &'a RTCSessionDescription,
}

#[derive(Serialize)]
struct CandidateRequest<'a> {
    session_id: &'a str,
    candidate: &'a IceCandidate,
}

#[derive(Serialize)]
struct TaskRequest<'a> {
    session_id: &'a str,
    text: &'a str,
}

#[derive(Serialize)]
struct StopRequest<'a> {
    session_id: &'a str,
}

/// The signaling operations the lifecycle depends on.
#[async_trait]
pub trait Signaling: Send + Sync {
    async fn new_session(&self, quality: Quality) -> Result<SessionInfo>;
    async fn start_session(&self, session_id: &str, sdp: &RTCSessionDescription)
        -> Result<Value>;
    async fn submit_candidate(&self, session_id: &str, candidate: &IceCandidate)
        -> Result<Value>;
    async fn submit_task(&self, session_id: &str, text: &str) -> Result<Value>;
    async fn stop_session(&self, session_id: &str) -> Result<Value>;
}

/// HTTP implementation of [`Signaling`].
pub struct SignalingClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl SignalingClient {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()?;
        Ok(Self {
            http,
            base_url: config.server_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    async fn post<B, T>(&self, endpoint: &'static str, body: &B) -> Result<T>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        debug!(endpoint, "signaling request");
        let response = self
            .http
            .post(format!("{}{}", self.base_url, endpoint))
            .header(API_KEY_HEADER, &self.api_key)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            // 5xx means the service itself failed; anything else
            // non-success must still never pass as an ack.
            return Err(Error::RemoteFault { endpoint, status });
        }
        let envelope: Envelope<T> = response.json().await?;
        Ok(envelope.data)
    }
}

#[async_trait]
impl Signaling for SignalingClient {
    async fn new_session(&self, quality: Quality) -> Result<SessionInfo> {
        self.post(NEW_ENDPOINT, &NewSessionRequest { quality }).await
    }

    async fn start_session(
        &self,
        session_id: &str,
        sdp: &RTCSessionDescription,
    ) -> Result<Value> {
        self.post(START_ENDPOINT, &StartSessionRequest { session_id, sdp })
            .await
    }

    async fn submit_candidate(
        &self,
        session_id: &str,
        candidate: &IceCandidate,
    ) -> Result<Value> {
        self.post(ICE_ENDPOINT, &CandidateRequest { session_id, candidate })
            .await
    }

    async fn submit_task(&self, session_id: &str, text: &str) -> Result<Value> {
        if text.trim().is_empty() {
            return Err(Error::Validation("task text is empty".into()));
        }
        self.post(TASK_ENDPOINT, &TaskRequest { session_id, text })
            .await
    }

    async fn stop_session(&self, session_id: &str) -> Result<Value> {
        self.post(STOP_ENDPOINT, &StopRequest { session_id }).await
    }
}
