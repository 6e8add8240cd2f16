//! End-to-end routing through running actors

mod common;

use codec::BincodeCodec;
use common::{decode, encode, harness, join_within, wait_until};
use messaging_actors::test_utils::RecordingHub;
use messaging_actors::{ActorConfig, ActorState, EnqueueOutcome};
use types::{ClientId, Envelope, Message};

#[tokio::test]
async fn test_identity_announced_first() {
    let hub = RecordingHub::starting_at(7);
    let mut h = harness(hub.clone(), BincodeCodec::new(), ActorConfig::default());
    let handle = h.spawn();

    let frame = h.remote.next_written().await.unwrap();
    assert_eq!(
        decode(&frame),
        Envelope::new(ClientId(7), Message::id(ClientId(7)))
    );
    assert!(wait_until(|| h.actor.state() == ActorState::Active).await);

    h.remote.hang_up();
    join_within(handle).await;
}

#[tokio::test]
async fn test_omitted_sender_is_broadcast_as_self() {
    let hub = RecordingHub::starting_at(7);
    let mut h = harness(hub.clone(), BincodeCodec::new(), ActorConfig::default());
    let handle = h.spawn();
    h.remote.next_written().await.unwrap();

    h.remote
        .send_frame(encode(&Envelope::new(ClientId::UNSET, Message::chat("hi"))));

    assert!(wait_until(|| !hub.broadcasts().is_empty()).await);
    assert_eq!(
        hub.broadcasts(),
        vec![Envelope::new(ClientId(7), Message::chat("hi"))]
    );
    // nothing echoed back down our own connection
    assert!(h.remote.drain_written().is_empty());

    h.remote.hang_up();
    join_within(handle).await;
    assert_eq!(hub.broadcasts().len(), 1);
}

#[tokio::test]
async fn test_explicit_own_sender_is_broadcast() {
    let hub = RecordingHub::starting_at(7);
    let mut h = harness(hub.clone(), BincodeCodec::new(), ActorConfig::default());
    let handle = h.spawn();
    h.remote.next_written().await.unwrap();

    h.remote
        .send_frame(encode(&Envelope::new(ClientId(7), Message::chat("mine"))));

    assert!(wait_until(|| hub.broadcasts().len() == 1).await);
    assert_eq!(hub.broadcasts()[0].sender_id, ClientId(7));

    h.remote.hang_up();
    join_within(handle).await;
}

#[tokio::test]
async fn test_foreign_message_written_with_original_sender() {
    let hub = RecordingHub::starting_at(7);
    let mut h = harness(hub.clone(), BincodeCodec::new(), ActorConfig::default());
    let handle = h.spawn();
    h.remote.next_written().await.unwrap();

    // what the hub does when relaying from peer 9
    h.actor.route(ClientId(9), Message::chat("yo"));

    let frame = h.remote.next_written().await.unwrap();
    assert_eq!(
        decode(&frame),
        Envelope::new(ClientId(9), Message::chat("yo"))
    );
    assert!(hub.broadcasts().is_empty());

    h.remote.hang_up();
    join_within(handle).await;
}

#[tokio::test]
async fn test_frames_written_in_enqueue_order() {
    let hub = RecordingHub::starting_at(7);
    let mut h = harness(hub.clone(), BincodeCodec::new(), ActorConfig::default());
    let handle = h.spawn();
    h.remote.next_written().await.unwrap();

    for n in 0..50 {
        h.actor.route(ClientId(9), Message::chat(n.to_string()));
    }

    let mut seen = Vec::new();
    for _ in 0..50 {
        seen.push(decode(&h.remote.next_written().await.unwrap()));
    }
    let expected: Vec<_> = (0..50)
        .map(|n| Envelope::new(ClientId(9), Message::chat(n.to_string())))
        .collect();
    assert_eq!(seen, expected);

    h.remote.hang_up();
    join_within(handle).await;
}

#[tokio::test]
async fn test_flood_from_hub_retains_capacity() {
    let hub = RecordingHub::starting_at(7);
    let h = harness(hub.clone(), BincodeCodec::new(), ActorConfig::default());
    let mut receiver = h.receiver.unwrap();
    h.actor.initialize(ClientId(7));
    receiver.try_recv().unwrap();

    let outcomes: Vec<_> = (0..300)
        .map(|n| h.actor.send_as(Message::chat(n.to_string()), ClientId(9)))
        .collect();

    assert_eq!(outcomes.iter().filter(|o| o.is_queued()).count(), 256);
    assert_eq!(
        outcomes
            .iter()
            .filter(|o| **o == EnqueueOutcome::DroppedFull)
            .count(),
        44
    );
    assert_eq!(h.actor.metrics().snapshot().dropped_full, 44);

    let mut retained = Vec::new();
    while let Some(envelope) = receiver.try_recv() {
        retained.push(envelope);
    }
    assert_eq!(retained.len(), 256);
    assert_eq!(retained[0].payload, Message::chat("0"));
    assert_eq!(retained[255].payload, Message::chat("255"));
}

#[tokio::test]
async fn test_malformed_frame_skipped() {
    let hub = RecordingHub::starting_at(7);
    let mut h = harness(hub.clone(), BincodeCodec::new(), ActorConfig::default());
    let handle = h.spawn();
    h.remote.next_written().await.unwrap();

    h.remote.send_frame(vec![0xff, 0xff, 0xff]);
    h.remote.send_frame(Vec::new());
    h.remote
        .send_frame(encode(&Envelope::new(ClientId::UNSET, Message::chat("still here"))));

    assert!(wait_until(|| hub.broadcasts().len() == 1).await);
    assert_eq!(h.actor.state(), ActorState::Active);

    let snapshot = h.actor.metrics().snapshot();
    assert_eq!(snapshot.decode_failures, 2);
    assert_eq!(snapshot.frames_read, 3);

    h.remote.hang_up();
    join_within(handle).await;
}

#[tokio::test]
async fn test_unencodable_envelope_dropped() {
    let hub = RecordingHub::starting_at(7);
    let mut h = harness(
        hub.clone(),
        BincodeCodec::with_max_frame_size(8),
        ActorConfig::default(),
    );
    let handle = h.spawn();
    h.remote.next_written().await.unwrap();

    h.actor
        .route(ClientId(9), Message::chat("far too long for the limit"));
    h.actor.route(ClientId(9), Message::chat("ok"));

    let frame = h.remote.next_written().await.unwrap();
    assert_eq!(decode(&frame), Envelope::new(ClientId(9), Message::chat("ok")));
    assert_eq!(h.actor.metrics().snapshot().encode_failures, 1);
    assert_eq!(h.actor.state(), ActorState::Active);

    h.remote.hang_up();
    join_within(handle).await;
}
