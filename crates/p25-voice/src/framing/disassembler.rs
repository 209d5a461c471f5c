//! Receive side: validates inbound LDUs, tracks call boundaries on the channel's receive
//! slot, deciphers and decodes the 9 codewords of each LDU, and keeps the receive MI in
//! sync from the embedded HDU and encryption sync fields.

use std::time::{Duration, Instant};

use p25_core::ldu_layout::{VOICE_PER_LDU, read_codeword};
use p25_core::{CryptoParams, Duid, LduBuffer, RadioId, StreamId};

use crate::channel::call_state::{ChannelCallState, RxSlot};
use crate::codec::{CodewordCodec, Vocoder};
use crate::crypto::cipher::{CipherEngine, FrameType};

use super::records::{ParsedLdu, decode_records};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RxCallStart {
    pub stream_id: StreamId,
    /// Zero when the call was entered on an LDU2
    pub src_id: RadioId,
    pub dst_id: RadioId,
    pub emergency: bool,
    pub encrypted: bool,
    /// Stream of a previous call that was still active and is now implicitly superseded
    pub superseded: Option<StreamId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RxCallEnd {
    pub stream_id: StreamId,
    pub src_id: RadioId,
    pub dst_id: RadioId,
    pub duration: Duration,
    pub ldu_count: u32,
}

/// PCM recovered from one codeword
#[derive(Debug, Clone)]
pub struct DecodedAudio {
    pub stream_id: StreamId,
    pub dst_id: RadioId,
    pub src_id: RadioId,
    pub duid: Duid,
    pub voice_index: usize,
    pub samples: Vec<i16>,
    pub errors: u32,
}

#[derive(Debug, Clone)]
pub enum RxEvent {
    CallStart(RxCallStart),
    CallEnd(RxCallEnd),
    Audio(DecodedAudio),
}

/// How the codewords of one LDU are to be handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RxCipher {
    Clear,
    Keyed,
    /// Encrypted, but no sync acquired yet
    NoSync,
    /// Declared params do not match the channel binding or no key is loaded
    Mismatch,
}

pub struct LduDisassembler<V: Vocoder> {
    codec: CodewordCodec<V>,
}

impl<V: Vocoder> LduDisassembler<V> {
    pub fn new(vocoder: V) -> Self {
        Self {
            codec: CodewordCodec::new(vocoder),
        }
    }

    /// Process one inbound frame for a channel. `raw` is the record stream without the
    /// DUID byte. Malformed frames are skipped without touching any state.
    pub fn on_frame<C: CipherEngine>(
        &mut self,
        ch: &mut ChannelCallState<C>,
        duid: Duid,
        raw: &[u8],
        stream_id: StreamId,
        pkt_time: Instant,
    ) -> Vec<RxEvent> {
        let mut events = Vec::new();

        if duid.is_terminator() {
            if ch.rx_slot.is_active() && stream_id != ch.rx_slot.stream_id {
                tracing::debug!(
                    ch = %ch.name,
                    "<- {} stream={} does not match active stream={}, ignoring",
                    duid,
                    stream_id,
                    ch.rx_slot.stream_id
                );
                return events;
            }
            if let Some(end) = self.end_call(ch, pkt_time) {
                events.push(RxEvent::CallEnd(end));
            } else {
                tracing::trace!(ch = %ch.name, "<- {} without active call, ignoring", duid);
            }
            return events;
        }

        if duid == Duid::Hdu {
            // Call parameters arrive through the HDU trailer of the first LDU1
            p25_core::unimplemented_log!("standalone HDU stream={}", stream_id);
            return events;
        }
        if !duid.is_voice() {
            tracing::trace!(ch = %ch.name, "<- {} stream={} ignored", duid, stream_id);
            return events;
        }

        let parsed = match decode_records(duid, raw) {
            Ok(p) => p,
            Err(e) => {
                tracing::warn!(ch = %ch.name, "<- malformed {} stream={}: {}", duid, stream_id, e);
                return events;
            }
        };

        if stream_id != ch.rx_slot.stream_id {
            events.push(RxEvent::CallStart(self.start_call(ch, &parsed, stream_id, pkt_time)));
        }

        self.update_slot(&mut ch.rx_slot, &parsed);

        if let Some(hdu) = parsed.hdu.filter(|h| h.is_encrypted()) {
            ch.rx_slot.encrypted = true;
            if !ch.rx_crypto.is_prepared() {
                tracing::debug!(ch = %ch.name, "<- HDU alg=0x{:02X} kid=0x{:04X} mi={}", hdu.alg_id, hdu.key_id, hdu.mi);
                ch.rx_crypto.prepare(hdu.alg_id, hdu.key_id, hdu.mi);
            }
        }

        let frame_type = match duid {
            Duid::Ldu1 => {
                ch.rx_ldu1 = parsed.buffer;
                FrameType::Ldu1
            }
            _ => {
                ch.rx_ldu2 = parsed.buffer;
                FrameType::Ldu2
            }
        };

        let mode = rx_cipher_mode(ch, &parsed);
        let mut last_errors = 0;
        match mode {
            RxCipher::Clear | RxCipher::Keyed => {
                let buffer: LduBuffer = match frame_type {
                    FrameType::Ldu1 => ch.rx_ldu1,
                    FrameType::Ldu2 => ch.rx_ldu2,
                };
                for voice_index in 0..VOICE_PER_LDU {
                    let mut codeword = read_codeword(&buffer, voice_index);
                    if mode == RxCipher::Keyed {
                        ch.rx_crypto.apply_keystream(&mut codeword, frame_type, voice_index);
                    }
                    let decoded = self.codec.decode(&codeword);
                    last_errors = decoded.errors;
                    events.push(RxEvent::Audio(DecodedAudio {
                        stream_id,
                        dst_id: ch.rx_slot.dst_id,
                        src_id: ch.rx_slot.src_id,
                        duid,
                        voice_index,
                        samples: decoded.samples.to_vec(),
                        errors: decoded.errors,
                    }));
                }
            }
            RxCipher::NoSync => {
                tracing::debug!(ch = %ch.name, "<- {} encrypted without sync, dropping audio", duid);
            }
            RxCipher::Mismatch => {
                tracing::debug!(ch = %ch.name, "<- {} key mismatch for {}, dropping", duid, ch.binding);
            }
        }

        // MI update for the next superframe
        if let Some(es) = parsed.es.as_ref().filter(|es| es.params.is_encrypted()) {
            if matches!(mode, RxCipher::Keyed | RxCipher::NoSync) {
                ch.rx_crypto.rx_apply_sync(&es.params, last_errors);
            }
        }

        events
    }

    fn start_call<C: CipherEngine>(
        &self,
        ch: &mut ChannelCallState<C>,
        parsed: &ParsedLdu,
        stream_id: StreamId,
        pkt_time: Instant,
    ) -> RxCallStart {
        let superseded = ch.rx_slot.is_active().then_some(ch.rx_slot.stream_id);
        if let Some(old) = superseded {
            tracing::debug!(ch = %ch.name, "<- stream {} supersedes active stream {}", stream_id, old);
        }

        ch.reset_rx();
        ch.rx_slot = RxSlot::open(stream_id, pkt_time);

        let link = parsed.link.unwrap_or_default();
        let encrypted = parsed.hdu.is_some_and(|h| h.is_encrypted())
            || parsed.link.is_some_and(|l| l.is_encrypted())
            || parsed.es.as_ref().is_some_and(|es| es.params.is_encrypted());

        tracing::info!(
            ch = %ch.name,
            "<- call start stream={} src={} dst={}{}{}",
            stream_id,
            link.src_id,
            link.dst_id,
            if link.is_emergency() { " EMERGENCY" } else { "" },
            if encrypted { " encrypted" } else { "" }
        );

        RxCallStart {
            stream_id,
            src_id: link.src_id,
            dst_id: link.dst_id,
            emergency: link.is_emergency(),
            encrypted,
            superseded,
        }
    }

    fn update_slot(&self, slot: &mut RxSlot, parsed: &ParsedLdu) {
        slot.last_duid = Some(parsed.duid);
        slot.ldu_count += 1;
        if let Some(link) = parsed.link {
            slot.dst_id = link.dst_id;
            slot.src_id = link.src_id;
            slot.emergency = link.is_emergency();
            slot.encrypted |= link.is_encrypted();
        }
        if let Some(es) = &parsed.es {
            slot.encrypted |= es.params.is_encrypted();
        }
    }

    /// Close the active call on the first terminator. Later terminators find no
    /// active slot and are ignored.
    fn end_call<C: CipherEngine>(&self, ch: &mut ChannelCallState<C>, pkt_time: Instant) -> Option<RxCallEnd> {
        if !ch.rx_slot.is_active() {
            return None;
        }
        let slot = &ch.rx_slot;
        let duration = slot.start.map(|s| pkt_time.saturating_duration_since(s)).unwrap_or_default();
        let end = RxCallEnd {
            stream_id: slot.stream_id,
            src_id: slot.src_id,
            dst_id: slot.dst_id,
            duration,
            ldu_count: slot.ldu_count,
        };
        tracing::info!(
            ch = %ch.name,
            "<- call end stream={} src={} dst={} after {:.1}s ({} LDUs)",
            end.stream_id,
            end.src_id,
            end.dst_id,
            duration.as_secs_f64(),
            end.ldu_count
        );
        ch.reset_rx();
        Some(end)
    }
}

/// Decide whether this LDU can be decoded, and whether it needs deciphering
fn rx_cipher_mode<C: CipherEngine>(ch: &ChannelCallState<C>, parsed: &ParsedLdu) -> RxCipher {
    // Declared (algId, keyId) of the stream; None when encrypted but not yet known
    let declared: Option<CryptoParams> = match (&parsed.es, parsed.hdu) {
        (Some(es), _) => Some(es.params),
        (None, Some(hdu)) => Some(hdu),
        (None, None) if ch.rx_crypto.is_prepared() => Some(*ch.rx_crypto.params()),
        (None, None) if parsed.link.is_some_and(|l| l.is_encrypted()) => None,
        (None, None) => Some(CryptoParams::clear()),
    };

    match declared {
        Some(params) if !params.is_encrypted() => RxCipher::Clear,
        Some(params) => {
            if !ch.binding.matches(&params) || !ch.rx_crypto.has_key(params.key_id) {
                RxCipher::Mismatch
            } else if !ch.rx_crypto.is_prepared() {
                RxCipher::NoSync
            } else {
                RxCipher::Keyed
            }
        }
        None if ch.binding.is_encrypted() => RxCipher::NoSync,
        None => RxCipher::Mismatch,
    }
}
