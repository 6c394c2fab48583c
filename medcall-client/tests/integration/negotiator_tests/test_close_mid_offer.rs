use medcall_client::{LocalTracks, NegotiationRole, NegotiationState, NegotiatorSetup, PeerNegotiator};
use medcall_core::Role;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

use crate::integration::{eventually, init_tracing, participant};
use crate::utils::{FakePeerFactory, PeerCall, RecordingTransport};

#[tokio::test]
async fn test_close_mid_offer() {
    init_tracing();

    let peers = FakePeerFactory::holding_offers();
    let transport = RecordingTransport::new();
    let (events_tx, mut events) = mpsc::unbounded_channel();
    let local = LocalTracks::default();

    let mut negotiator = PeerNegotiator::open(
        participant(Role::Patient),
        NegotiationRole::Initiator,
        1,
        NegotiatorSetup {
            factory: peers.as_ref(),
            ice_servers: &[],
            local: &local,
            transport: Arc::new(transport.clone()),
            events: events_tx,
        },
    )
    .await
    .unwrap();

    negotiator.start();
    assert_eq!(negotiator.state(), NegotiationState::HaveLocalOffer);

    let pc = peers.last().unwrap();
    eventually("offer creation to start", || {
        pc.count(&PeerCall::CreateOffer) == 1
    })
    .await;

    negotiator.close().await;

    assert!(pc.is_closed());
    assert!(transport.sent().is_empty());
    // The worker is gone, so nothing comes back from the abandoned offer.
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(events.try_recv().is_err());
}
