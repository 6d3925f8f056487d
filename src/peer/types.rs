use std::sync::Arc;

use serde::{Deserialize, Serialize};
use webrtc::ice_transport::ice_candidate::RTCIceCandidate;
use webrtc::ice_transport::ice_connection_state::RTCIceConnectionState;
use webrtc::track::track_remote::TrackRemote;

/// A discovered local connectivity candidate, in the JSON shape the
/// signaling service expects (browser `RTCIceCandidate.toJSON()`).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IceCandidate {
    pub candidate: String,
    pub sdp_mid: Option<String>,
    #[serde(rename = "sdpMLineIndex")]
    pub sdp_mline_index: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username_fragment: Option<String>,
}

impl IceCandidate {
    pub fn from_rtc(candidate: &RTCIceCandidate) -> Result<Self, webrtc::Error> {
        let init = candidate.to_json()?;
        Ok(Self {
            candidate: init.candidate,
            sdp_mid: init.sdp_mid,
            sdp_mline_index: init.sdp_mline_index,
            username_fragment: init.username_fragment,
        })
    }
}

/// Events the media transport emits while a session is up.
#[derive(Clone)]
pub enum PeerEvent {
    /// A local candidate was discovered; `None` marks the end of gathering.
    Candidate(Option<IceCandidate>),
    /// The transport's connectivity changed (checking, connected, ...).
    ConnectionState(RTCIceConnectionState),
    /// Inbound media became available.
    Track(Arc<TrackRemote>),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn candidate_serializes_in_browser_shape() {
        let candidate = IceCandidate {
            candidate: "candidate:1 1 udp 2130706431 192.0.2.1 54400 typ host".into(),
            sdp_mid: Some("0".into()),
            sdp_mline_index: Some(0),
            username_fragment: None,
        };
        let value = serde_json::to_value(&candidate).unwrap();
        assert_eq!(value["sdpMid"], "0");
        assert_eq!(value["sdpMLineIndex"], 0);
        assert!(value.get("usernameFragment").is_none());
        assert!(value["candidate"].as_str().unwrap().contains("typ host"));
    }

    #[test]
    fn candidate_roundtrips() {
        let candidate = IceCandidate {
            candidate: "candidate:2 1 udp 1694498815 198.51.100.4 61000 typ srflx".into(),
            sdp_mid: Some("audio".into()),
            sdp_mline_index: Some(1),
            username_fragment: Some("frag".into()),
        };
        let raw = serde_json::to_string(&candidate).unwrap();
        let back: IceCandidate = serde_json::from_str(&raw).unwrap();
        assert_eq!(back, candidate);
    }
}
