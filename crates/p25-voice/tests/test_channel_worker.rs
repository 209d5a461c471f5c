mod common;

use std::time::Duration;

use common::*;
use p25_core::{Duid, debug};
use p25_voice::{ChannelEvent, ChannelHandle, LduAssembler, NET_FUNC_PROTOCOL};

const WAIT: Duration = Duration::from_secs(2);

/// Collect events until one matches `done`, returning all of them
fn wait_for(handle: &ChannelHandle, done: impl Fn(&ChannelEvent) -> bool) -> Vec<ChannelEvent> {
    let mut events = Vec::new();
    loop {
        let ev = handle.events().recv_timeout(WAIT).expect("timed out waiting for channel event");
        let finished = done(&ev);
        events.push(ev);
        if finished {
            return events;
        }
    }
}

fn spawn(hold_limit: Duration) -> (ChannelHandle, RecordingTransport) {
    let transport = RecordingTransport::default();
    let handle = ChannelHandle::spawn(
        clear_channel("TAC1"),
        MockVocoder::default(),
        MockVocoder::default(),
        transport.clone(),
        hold_limit,
    )
    .unwrap();
    (handle, transport)
}

#[test]
fn test_ptt_release_sends_terminator() {
    debug::setup_logging_verbose();
    let (handle, transport) = spawn(Duration::from_secs(60));

    for i in 0..20u8 {
        assert!(handle.push_pcm(pcm_chunk(i)));
    }
    handle.ptt_release();
    let events = wait_for(&handle, |e| matches!(e, ChannelEvent::TxCallEnd { .. }));

    let ChannelEvent::TxCallStart { stream_id } = events[0] else {
        panic!("expected tx call start, got {:?}", events[0]);
    };
    assert!(matches!(events.last(), Some(ChannelEvent::TxCallEnd { stream_id: s, forced: false }) if *s == stream_id));

    // Two complete LDUs, the partial third one is discarded, then the TDU
    let sent = transport.sent();
    let duids: Vec<Option<Duid>> = sent.iter().map(|f| f.duid()).collect();
    assert_eq!(duids, vec![Some(Duid::Ldu1), Some(Duid::Ldu2), Some(Duid::Tdu)]);
    assert!(sent.iter().all(|f| f.stream_id == stream_id && f.function_code == NET_FUNC_PROTOCOL));
    assert_eq!(sent[2].payload, vec![Duid::Tdu.into_raw()]);
    let sequences: Vec<u16> = sent.iter().map(|f| f.sequence).collect();
    assert_eq!(sequences, vec![0, 1, 2]);
}

#[test]
fn test_short_call_terminator_resets_sequence() {
    debug::setup_logging_verbose();
    let (handle, transport) = spawn(Duration::from_secs(60));
    assert_eq!(handle.name(), "TAC1");

    for i in 0..9u8 {
        handle.push_pcm(pcm_chunk(i));
    }
    handle.ptt_release();
    wait_for(&handle, |e| matches!(e, ChannelEvent::TxCallEnd { .. }));

    // Released before its first LDU completed: the TDU is the call's first frame
    handle.push_pcm(pcm_chunk(0));
    handle.ptt_release();
    let events = wait_for(&handle, |e| matches!(e, ChannelEvent::TxCallEnd { .. }));
    let ChannelEvent::TxCallStart { stream_id } = events[0] else {
        panic!("expected tx call start, got {:?}", events[0]);
    };

    let sent = transport.sent();
    assert_eq!(sent.len(), 3);
    assert_eq!((sent[0].duid(), sent[0].sequence), (Some(Duid::Ldu1), 0));
    assert_eq!((sent[1].duid(), sent[1].sequence), (Some(Duid::Tdu), 1));
    assert_eq!(sent[2].duid(), Some(Duid::Tdu));
    assert_eq!(sent[2].stream_id, stream_id);
    assert_eq!(sent[2].sequence, 0);
}

#[test]
fn test_release_without_call_sends_nothing() {
    let (handle, transport) = spawn(Duration::from_secs(60));
    handle.ptt_release();
    handle.push_pcm(pcm_chunk(0));
    wait_for(&handle, |e| matches!(e, ChannelEvent::TxCallStart { .. }));
    assert!(transport.sent().is_empty());
}

#[test]
fn test_hold_limit_forces_terminator() {
    debug::setup_logging_verbose();
    let (handle, transport) = spawn(Duration::from_millis(300));

    for i in 0..9u8 {
        handle.push_pcm(pcm_chunk(i));
    }
    let events = wait_for(&handle, |e| matches!(e, ChannelEvent::TxCallEnd { .. }));
    let ChannelEvent::TxCallStart { stream_id } = events[0] else {
        panic!("expected tx call start, got {:?}", events[0]);
    };
    assert!(events.iter().any(|e| matches!(e, ChannelEvent::HoldLimitReached { stream_id: s } if *s == stream_id)));
    assert!(matches!(events.last(), Some(ChannelEvent::TxCallEnd { forced: true, .. })));

    let duids: Vec<Option<Duid>> = transport.sent().iter().map(|f| f.duid()).collect();
    assert_eq!(duids, vec![Some(Duid::Ldu1), Some(Duid::Tdu)]);

    // Audio keeps arriving while PTT is still held: ignored until release
    for i in 0..9u8 {
        handle.push_pcm(pcm_chunk(i));
    }
    handle.ptt_release();
    handle.push_pcm(pcm_chunk(0));
    handle.ptt_release();
    let events = wait_for(&handle, |e| matches!(e, ChannelEvent::TxCallEnd { .. }));
    assert_eq!(events.len(), 2);
    let ChannelEvent::TxCallStart { stream_id: second } = events[0] else {
        panic!("expected tx call start, got {:?}", events[0]);
    };
    assert_ne!(second, stream_id);
    assert!(matches!(events[1], ChannelEvent::TxCallEnd { forced: false, .. }));

    // Second call only produced its terminator
    let sent = transport.sent();
    assert_eq!(sent.len(), 3);
    assert_eq!(sent[2].duid(), Some(Duid::Tdu));
    assert_eq!(sent[2].stream_id, second);
}

#[test]
fn test_inbound_frames_produce_rx_events() {
    debug::setup_logging_verbose();
    let (handle, _transport) = spawn(Duration::from_secs(60));

    // Build a clear LDU1 the way a remote console would
    let mut remote = clear_channel("REMOTE");
    let mut remote_net = RecordingTransport::default();
    let mut asm = LduAssembler::new(MockVocoder::default());
    let ldu1 = (0..9u8)
        .filter_map(|i| asm.push_pcm(&mut remote, &pcm_chunk(i), &mut remote_net))
        .next()
        .unwrap();

    handle.submit_frame(0x77, vec![]);
    handle.submit_frame(0x77, vec![0x09, 0x00]);
    handle.submit_frame(0x77, ldu1.payload());
    handle.submit_frame(0x77, vec![Duid::Tdu.into_raw()]);

    let events = wait_for(&handle, |e| matches!(e, ChannelEvent::RxCallEnd(_)));
    assert_eq!(events.len(), 11);
    match &events[0] {
        ChannelEvent::RxCallStart(start) => {
            assert_eq!(start.stream_id, 0x77);
            assert_eq!(start.dst_id, TALKGROUP);
            assert_eq!(start.src_id, SOURCE);
        }
        other => panic!("expected rx call start, got {:?}", other),
    }
    assert!(events[1..10].iter().all(|e| matches!(e, ChannelEvent::Audio(a) if a.stream_id == 0x77)));
    match &events[10] {
        ChannelEvent::RxCallEnd(end) => assert_eq!(end.ldu_count, 1),
        other => panic!("expected rx call end, got {:?}", other),
    }
}

#[test]
fn test_transport_failure_keeps_channel_running() {
    let (handle, transport) = spawn(Duration::from_secs(60));
    transport.set_offline(true);

    for i in 0..18u8 {
        handle.push_pcm(pcm_chunk(i));
    }
    handle.push_pcm(vec![0i16; 80]);
    handle.ptt_release();
    wait_for(&handle, |e| matches!(e, ChannelEvent::TxCallEnd { .. }));
    assert!(transport.sent().is_empty());

    transport.set_offline(false);
    handle.push_pcm(pcm_chunk(0));
    handle.ptt_release();
    wait_for(&handle, |e| matches!(e, ChannelEvent::TxCallEnd { .. }));
    assert_eq!(transport.sent().len(), 1);
}
