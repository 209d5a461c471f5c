//! Per-channel worker: owns one channel's call state and serializes every transmit and
//! receive mutation through a single command queue.

use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use p25_core::{Duid, FrameParseErr, StreamId};

use crate::channel::call_state::ChannelCallState;
use crate::channel::hold_timer::CallHoldTimer;
use crate::codec::Vocoder;
use crate::crypto::cipher::CipherEngine;
use crate::framing::assembler::{LduAssembler, TransmitEvent};
use crate::framing::disassembler::{DecodedAudio, LduDisassembler, RxCallEnd, RxCallStart, RxEvent};
use crate::network::{NET_FUNC_PROTOCOL, VoiceTransport};

/// Hold timer resolution
const TICK: Duration = Duration::from_millis(50);

/// Commands into the channel worker
#[derive(Debug)]
pub enum ChannelCommand {
    /// One PCM chunk from audio capture
    Pcm(Vec<i16>),

    /// Operator released PTT
    PttRelease,

    /// Inbound P25 frame: DUID byte followed by the record stream
    Frame {
        stream_id: StreamId,
        payload: Vec<u8>,
        received: Instant,
    },

    /// Stop the worker, ending any transmission in progress
    Shutdown,
}

/// Events the channel worker emits
#[derive(Debug, Clone)]
pub enum ChannelEvent {
    TxCallStart { stream_id: StreamId },

    /// `forced` is set when the hold limit ended the call
    TxCallEnd { stream_id: StreamId, forced: bool },

    RxCallStart(RxCallStart),

    RxCallEnd(RxCallEnd),

    /// Decoded PCM for playback
    Audio(DecodedAudio),

    /// Transmission exceeded the configured hold limit and was terminated
    HoldLimitReached { stream_id: StreamId },
}

pub struct ChannelWorker<V: Vocoder, C: CipherEngine, T: VoiceTransport> {
    state: ChannelCallState<C>,
    assembler: LduAssembler<V>,
    disassembler: LduDisassembler<V>,
    transport: T,
    hold_timer: CallHoldTimer,
    /// Set after a forced terminator; PCM is ignored until PTT is released
    hold_lockout: bool,

    event_sender: Sender<ChannelEvent>,
    command_receiver: Receiver<ChannelCommand>,
}

impl<V: Vocoder, C: CipherEngine, T: VoiceTransport> ChannelWorker<V, C, T> {
    pub fn new(
        state: ChannelCallState<C>,
        tx_vocoder: V,
        rx_vocoder: V,
        transport: T,
        hold_limit: Duration,
        event_sender: Sender<ChannelEvent>,
        command_receiver: Receiver<ChannelCommand>,
    ) -> Self {
        Self {
            state,
            assembler: LduAssembler::new(tx_vocoder),
            disassembler: LduDisassembler::new(rx_vocoder),
            transport,
            hold_timer: CallHoldTimer::new(hold_limit),
            hold_lockout: false,
            event_sender,
            command_receiver,
        }
    }

    /// Main loop. Returns on `Shutdown` or when the command sender is dropped.
    pub fn run(&mut self) {
        tracing::debug!(ch = %self.state.name, "channel worker started");
        loop {
            match self.command_receiver.recv_timeout(TICK) {
                Ok(ChannelCommand::Shutdown) => break,
                Ok(cmd) => self.handle_command(cmd),
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => {
                    tracing::debug!(ch = %self.state.name, "command queue closed");
                    break;
                }
            }
            self.check_hold_timer(Instant::now());
        }

        self.release_ptt(false);
        tracing::debug!(ch = %self.state.name, "channel worker stopped");
    }

    pub fn handle_command(&mut self, cmd: ChannelCommand) {
        match cmd {
            ChannelCommand::Pcm(pcm) => self.handle_pcm(&pcm),
            ChannelCommand::PttRelease => {
                self.hold_lockout = false;
                self.release_ptt(false);
            }
            ChannelCommand::Frame {
                stream_id,
                payload,
                received,
            } => self.handle_frame(stream_id, &payload, received),
            ChannelCommand::Shutdown => self.release_ptt(false),
        }
    }

    fn handle_pcm(&mut self, pcm: &[i16]) {
        if self.hold_lockout {
            tracing::trace!(ch = %self.state.name, "hold limit lockout, ignoring PCM until PTT release");
            return;
        }

        let was_active = self.state.tx_active();
        let event = self.assembler.push_pcm(&mut self.state, pcm, &mut self.transport);

        if !was_active && self.state.tx_active() {
            let stream_id = self.state.tx_stream_id;
            self.hold_timer.arm(stream_id, Instant::now());
            self.emit(ChannelEvent::TxCallStart { stream_id });
        }

        if let Some(event) = event {
            self.send_ldu(&event);
        }
    }

    fn send_ldu(&mut self, event: &TransmitEvent) {
        let payload = event.payload();
        match self.transport.send(NET_FUNC_PROTOCOL, &payload, event.sequence, event.stream_id) {
            Ok(()) => self.state.tx_sequence = event.sequence,
            Err(e) => tracing::warn!(ch = %self.state.name, "-> {} stream={} not sent: {}", event.duid, event.stream_id, e),
        }
    }

    /// End the transmission in progress: discard any partial LDU and send a terminator
    fn release_ptt(&mut self, forced: bool) {
        let Some(call) = self.assembler.end_call(&mut self.state) else {
            return;
        };
        let stream_id = call.stream_id;
        self.hold_timer.cancel(stream_id);

        // A call released before its first LDU has the terminator as its first frame
        let sequence = self.transport.next_sequence(call.first_pending);
        match self.transport.send(NET_FUNC_PROTOCOL, &[Duid::Tdu.into_raw()], sequence, stream_id) {
            Ok(()) => self.state.tx_sequence = sequence,
            Err(e) => tracing::warn!(ch = %self.state.name, "-> TDU stream={} not sent: {}", stream_id, e),
        }

        self.emit(ChannelEvent::TxCallEnd { stream_id, forced });
    }

    fn check_hold_timer(&mut self, now: Instant) {
        let Some(stream_id) = self.hold_timer.expired(now) else {
            return;
        };
        if stream_id != self.state.tx_stream_id {
            return;
        }
        tracing::warn!(
            ch = %self.state.name,
            "-> stream={} exceeded hold limit of {}s, forcing terminator",
            stream_id,
            self.hold_timer.limit().as_secs()
        );
        self.emit(ChannelEvent::HoldLimitReached { stream_id });
        self.release_ptt(true);
        self.hold_lockout = true;
    }

    fn handle_frame(&mut self, stream_id: StreamId, payload: &[u8], received: Instant) {
        let Some((&raw_duid, records)) = payload.split_first() else {
            tracing::warn!(ch = %self.state.name, "<- empty frame stream={}", stream_id);
            return;
        };
        let Some(duid) = Duid::from_raw(raw_duid) else {
            tracing::warn!(ch = %self.state.name, "<- stream={}: {}", stream_id, FrameParseErr::UnknownDuid { found: raw_duid });
            return;
        };

        for event in self.disassembler.on_frame(&mut self.state, duid, records, stream_id, received) {
            self.emit(match event {
                RxEvent::CallStart(start) => ChannelEvent::RxCallStart(start),
                RxEvent::CallEnd(end) => ChannelEvent::RxCallEnd(end),
                RxEvent::Audio(audio) => ChannelEvent::Audio(audio),
            });
        }
    }

    fn emit(&self, event: ChannelEvent) {
        if self.event_sender.send(event).is_err() {
            tracing::trace!(ch = %self.state.name, "event receiver gone, dropping event");
        }
    }
}
