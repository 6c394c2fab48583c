use crate::media::{LocalTracks, TrackKind};
use crate::peer::{
    PeerConnection, PeerConnectionFactory, PeerConnectionState, PeerError, PeerEvent,
    PeerEventSink, SdpKind, SessionDescription,
};
use async_trait::async_trait;
use medcall_core::{IceCandidate, IceServerConfig};
use std::sync::Arc;
use tracing::{debug, info, warn};
use webrtc::api::APIBuilder;
use webrtc::api::interceptor_registry::register_default_interceptors;
use webrtc::api::media_engine::{MIME_TYPE_OPUS, MIME_TYPE_VP8, MediaEngine};
use webrtc::ice_transport::ice_candidate::{RTCIceCandidate, RTCIceCandidateInit};
use webrtc::ice_transport::ice_server::RTCIceServer;
use webrtc::interceptor::registry::Registry;
use webrtc::peer_connection::RTCPeerConnection;
use webrtc::peer_connection::configuration::RTCConfiguration;
use webrtc::peer_connection::peer_connection_state::RTCPeerConnectionState;
use webrtc::peer_connection::sdp::session_description::RTCSessionDescription;
use webrtc::rtp_transceiver::RTCRtpTransceiver;
use webrtc::rtp_transceiver::rtp_codec::{RTCRtpCodecCapability, RTPCodecType};
use webrtc::rtp_transceiver::rtp_receiver::RTCRtpReceiver;
use webrtc::track::track_local::TrackLocal;
use webrtc::track::track_local::track_local_static_sample::TrackLocalStaticSample;
use webrtc::track::track_remote::TrackRemote;

const STREAM_ID: &str = "medcall";

/// Receives the outbound RTP track created for each local capture track, so
/// the capture pipeline can write samples into it.
///
/// Muting does not touch the RTP track. The pipeline must skip writes while
/// the matching [`MediaTrack`](crate::MediaTrack) reports `is_enabled() == false`.
pub type OutboundTrackSink = Arc<dyn Fn(&str, TrackKind, Arc<TrackLocalStaticSample>) + Send + Sync>;

/// Builds [`RtcPeerConnection`]s on top of webrtc-rs.
#[derive(Clone, Default)]
pub struct RtcPeerConnectionFactory {
    outbound_sink: Option<OutboundTrackSink>,
}

impl RtcPeerConnectionFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_outbound_sink(mut self, sink: OutboundTrackSink) -> Self {
        self.outbound_sink = Some(sink);
        self
    }
}

fn setup_err(e: webrtc::Error) -> PeerError {
    PeerError::Setup(e.to_string())
}

fn rtc_ice_servers(ice_servers: &[IceServerConfig]) -> Vec<RTCIceServer> {
    ice_servers
        .iter()
        .map(|server| RTCIceServer {
            urls: server.urls.clone(),
            username: server.username.clone().unwrap_or_default(),
            credential: server.credential.clone().unwrap_or_default(),
        })
        .collect()
}

fn peer_state(state: RTCPeerConnectionState) -> PeerConnectionState {
    match state {
        RTCPeerConnectionState::Unspecified | RTCPeerConnectionState::New => {
            PeerConnectionState::New
        }
        RTCPeerConnectionState::Connecting => PeerConnectionState::Connecting,
        RTCPeerConnectionState::Connected => PeerConnectionState::Connected,
        RTCPeerConnectionState::Disconnected => PeerConnectionState::Disconnected,
        RTCPeerConnectionState::Failed => PeerConnectionState::Failed,
        RTCPeerConnectionState::Closed => PeerConnectionState::Closed,
    }
}

#[async_trait]
impl PeerConnectionFactory for RtcPeerConnectionFactory {
    async fn create(
        &self,
        ice_servers: &[IceServerConfig],
        local: &LocalTracks,
        events: PeerEventSink,
    ) -> Result<Arc<dyn PeerConnection>, PeerError> {
        let mut media_engine = MediaEngine::default();
        media_engine.register_default_codecs().map_err(setup_err)?;
        let registry =
            register_default_interceptors(Registry::new(), &mut media_engine).map_err(setup_err)?;

        let api = APIBuilder::new()
            .with_media_engine(media_engine)
            .with_interceptor_registry(registry)
            .build();

        let rtc_config = RTCConfiguration {
            ice_servers: rtc_ice_servers(ice_servers),
            ..Default::default()
        };

        let peer_connection = Arc::new(
            api.new_peer_connection(rtc_config)
                .await
                .map_err(setup_err)?,
        );

        for track in local.tracks() {
            let mime_type = match track.kind() {
                TrackKind::Audio => MIME_TYPE_OPUS,
                TrackKind::Video => MIME_TYPE_VP8,
            };
            let outbound = Arc::new(TrackLocalStaticSample::new(
                RTCRtpCodecCapability {
                    mime_type: mime_type.to_owned(),
                    ..Default::default()
                },
                track.id().to_owned(),
                STREAM_ID.to_owned(),
            ));

            peer_connection
                .add_track(Arc::clone(&outbound) as Arc<dyn TrackLocal + Send + Sync>)
                .await
                .map_err(setup_err)?;
            debug!("Added local {} track {}", track.kind(), track.id());

            if let Some(sink) = &self.outbound_sink {
                sink(track.id(), track.kind(), outbound);
            }
        }

        let state_events = events.clone();
        peer_connection.on_peer_connection_state_change(Box::new(
            move |s: RTCPeerConnectionState| {
                state_events.emit(PeerEvent::StateChanged(peer_state(s)));
                Box::pin(async {})
            },
        ));

        let ice_events = events.clone();
        peer_connection.on_ice_candidate(Box::new(move |c: Option<RTCIceCandidate>| {
            let events = ice_events.clone();
            Box::pin(async move {
                let Some(candidate) = c else { return };
                match candidate.to_json() {
                    Ok(init) => events.emit(PeerEvent::LocalCandidate(IceCandidate {
                        candidate: init.candidate,
                        sdp_mid: init.sdp_mid,
                        sdp_m_line_index: init.sdp_mline_index,
                    })),
                    Err(e) => warn!("Failed to serialize local ICE candidate: {}", e),
                }
            })
        }));

        let track_events = events;
        peer_connection.on_track(Box::new(
            move |track: Arc<TrackRemote>,
                  _receiver: Arc<RTCRtpReceiver>,
                  _transceiver: Arc<RTCRtpTransceiver>| {
                let kind = match track.kind() {
                    RTPCodecType::Audio => Some(TrackKind::Audio),
                    RTPCodecType::Video => Some(TrackKind::Video),
                    RTPCodecType::Unspecified => None,
                };
                if let Some(kind) = kind {
                    info!("Remote {} track {} arrived", kind, track.id());
                    track_events.emit(PeerEvent::RemoteTrack(kind));
                }
                Box::pin(async {})
            },
        ));

        Ok(Arc::new(RtcPeerConnection { peer_connection }))
    }
}

pub struct RtcPeerConnection {
    peer_connection: Arc<RTCPeerConnection>,
}

impl RtcPeerConnection {
    pub fn inner(&self) -> &Arc<RTCPeerConnection> {
        &self.peer_connection
    }
}

#[async_trait]
impl PeerConnection for RtcPeerConnection {
    async fn create_offer(&self) -> Result<String, PeerError> {
        let offer = self
            .peer_connection
            .create_offer(None)
            .await
            .map_err(|e| PeerError::operation("create offer", e))?;
        self.peer_connection
            .set_local_description(offer.clone())
            .await
            .map_err(|e| PeerError::operation("set local offer", e))?;
        Ok(offer.sdp)
    }

    async fn create_answer(&self) -> Result<String, PeerError> {
        let answer = self
            .peer_connection
            .create_answer(None)
            .await
            .map_err(|e| PeerError::operation("create answer", e))?;
        self.peer_connection
            .set_local_description(answer.clone())
            .await
            .map_err(|e| PeerError::operation("set local answer", e))?;
        Ok(answer.sdp)
    }

    async fn set_remote_description(
        &self,
        description: SessionDescription,
    ) -> Result<(), PeerError> {
        let desc = match description.kind {
            SdpKind::Offer => RTCSessionDescription::offer(description.sdp),
            SdpKind::Answer => RTCSessionDescription::answer(description.sdp),
        }
        .map_err(|e| PeerError::operation("parse remote description", e))?;

        self.peer_connection
            .set_remote_description(desc)
            .await
            .map_err(|e| PeerError::operation("set remote description", e))
    }

    async fn add_ice_candidate(&self, candidate: IceCandidate) -> Result<(), PeerError> {
        let init = RTCIceCandidateInit {
            candidate: candidate.candidate,
            sdp_mid: candidate.sdp_mid,
            sdp_mline_index: candidate.sdp_m_line_index,
            ..Default::default()
        };
        self.peer_connection
            .add_ice_candidate(init)
            .await
            .map_err(|e| PeerError::operation("add ICE candidate", e))
    }

    async fn close(&self) -> Result<(), PeerError> {
        self.peer_connection
            .close()
            .await
            .map_err(|e| PeerError::operation("close", e))
    }
}
