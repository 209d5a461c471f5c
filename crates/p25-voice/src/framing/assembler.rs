//! Transmit side: packs sequential codewords into LDU1/LDU2 scratch buffers and hands a
//! complete LDU to the transport every 9 codewords.

use p25_core::ldu_layout::{VOICE_PER_LDU, VOICE_PER_SUPERFRAME, write_codeword};
use p25_core::{Codeword, CryptoParams, Duid, LDU_BUFFER_LEN, LduBuffer, LinkControl, StreamId};

use crate::channel::call_state::ChannelCallState;
use crate::codec::{CodewordCodec, Vocoder};
use crate::crypto::cipher::{CipherEngine, FrameType};
use crate::network::VoiceTransport;

use super::records::{encode_ldu1, encode_ldu2};

/// One complete LDU ready for the transport
#[derive(Debug, Clone)]
pub struct TransmitEvent {
    pub duid: Duid,
    pub buffer: LduBuffer,
    pub stream_id: StreamId,
    pub sequence: u16,
    /// First frame of the call; the transport resets its continuity state
    pub first_of_call: bool,
    /// LDU1 only
    pub link: Option<LinkControl>,
    /// LDU1: HDU trailer parameters (first LDU1 of an encrypted call).
    /// LDU2: encryption sync, always present.
    pub crypto: Option<CryptoParams>,
}

impl TransmitEvent {
    /// Transport payload: DUID byte followed by the raw record stream
    pub fn payload(&self) -> Vec<u8> {
        let raw = match self.duid {
            Duid::Ldu1 => encode_ldu1(&self.buffer, &self.link.unwrap_or_default(), self.crypto.as_ref()),
            _ => encode_ldu2(&self.buffer, &self.crypto.unwrap_or_else(CryptoParams::clear)),
        };
        let mut payload = Vec::with_capacity(raw.len() + 1);
        payload.push(self.duid.into_raw());
        payload.extend_from_slice(&raw);
        payload
    }
}

/// Transmission stopped by `LduAssembler::end_call`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EndedCall {
    pub stream_id: StreamId,
    /// No frame of the call reached the transport yet; the terminator is its first frame
    pub first_pending: bool,
}

pub struct LduAssembler<V: Vocoder> {
    codec: CodewordCodec<V>,
    /// Missing key already reported for this PTT press
    missing_key_logged: bool,
}

impl<V: Vocoder> LduAssembler<V> {
    pub fn new(vocoder: V) -> Self {
        Self {
            codec: CodewordCodec::new(vocoder),
            missing_key_logged: false,
        }
    }

    /// Encode a PCM chunk and push the codeword. A chunk of the wrong length is
    /// dropped without touching the frame counter.
    pub fn push_pcm<C: CipherEngine, T: VoiceTransport + ?Sized>(
        &mut self,
        ch: &mut ChannelCallState<C>,
        pcm: &[i16],
        transport: &mut T,
    ) -> Option<TransmitEvent> {
        let codeword = match self.codec.encode(pcm) {
            Ok(cw) => cw,
            Err(e) => {
                tracing::warn!(ch = %ch.name, "dropping tx chunk: {}", e);
                return None;
            }
        };
        self.push_codeword(ch, codeword, transport)
    }

    /// Place one codeword at position `tx_frame_counter` of the superframe.
    /// Returns a transmit event when the codeword completes an LDU.
    pub fn push_codeword<C: CipherEngine, T: VoiceTransport + ?Sized>(
        &mut self,
        ch: &mut ChannelCallState<C>,
        mut codeword: Codeword,
        transport: &mut T,
    ) -> Option<TransmitEvent> {
        let n = ch.tx_frame_counter;
        let binding = ch.binding;
        let encrypted = binding.is_encrypted();

        // Never fall back to clear on a keyed channel
        if encrypted && !ch.tx_crypto.has_key(binding.key_id) {
            if !self.missing_key_logged {
                tracing::warn!(ch = %ch.name, "no key loaded for {}, dropping tx audio until PTT release", binding);
                self.missing_key_logged = true;
            }
            return None;
        }

        if !ch.tx_active() {
            ch.tx_stream_id = transport.new_stream_id();
            ch.tx_first_pending = true;
            tracing::debug!(ch = %ch.name, "-> tx call start stream={} ({})", ch.tx_stream_id, binding);
        }

        if n == 0 {
            ch.ldu1 = [0u8; LDU_BUFFER_LEN];
        } else if n == VOICE_PER_LDU {
            ch.ldu2 = [0u8; LDU_BUFFER_LEN];
        }

        let frame_type = FrameType::from_superframe_pos(n);
        let voice_index = n % VOICE_PER_LDU;
        if encrypted {
            if n == 0 {
                ch.tx_crypto.tx_begin_superframe(binding);
            }
            ch.tx_crypto.apply_keystream(&mut codeword, frame_type, voice_index);
        }

        match frame_type {
            FrameType::Ldu1 => write_codeword(&mut ch.ldu1, voice_index, &codeword),
            FrameType::Ldu2 => write_codeword(&mut ch.ldu2, voice_index, &codeword),
        }

        let event = if n == VOICE_PER_LDU - 1 {
            let hdu = (encrypted && ch.tx_first_pending).then(|| *ch.tx_crypto.params());
            let link = ch.tx_link;
            Some(self.emit(ch, Duid::Ldu1, Some(link), hdu, transport))
        } else if n == VOICE_PER_SUPERFRAME - 1 {
            // The codeword above was ciphered with the current MI; the sync carried
            // in this LDU2 is the MI of the next superframe
            let es = if encrypted {
                ch.tx_crypto.tx_end_superframe();
                *ch.tx_crypto.params()
            } else {
                CryptoParams::clear()
            };
            Some(self.emit(ch, Duid::Ldu2, None, Some(es), transport))
        } else {
            None
        };

        ch.tx_frame_counter = (n + 1) % VOICE_PER_SUPERFRAME;
        event
    }

    fn emit<C: CipherEngine, T: VoiceTransport + ?Sized>(
        &self,
        ch: &mut ChannelCallState<C>,
        duid: Duid,
        link: Option<LinkControl>,
        crypto: Option<CryptoParams>,
        transport: &mut T,
    ) -> TransmitEvent {
        let first_of_call = ch.tx_first_pending;
        ch.tx_first_pending = false;
        let sequence = transport.next_sequence(first_of_call);
        tracing::trace!(ch = %ch.name, "-> {} stream={} seq={}", duid, ch.tx_stream_id, sequence);
        TransmitEvent {
            duid,
            buffer: match duid {
                Duid::Ldu1 => ch.ldu1,
                _ => ch.ldu2,
            },
            stream_id: ch.tx_stream_id,
            sequence,
            first_of_call,
            link,
            crypto,
        }
    }

    /// Abort transmission. Any partial LDU is discarded, never emitted.
    /// Returns the call that was active, if any.
    pub fn end_call<C: CipherEngine>(&mut self, ch: &mut ChannelCallState<C>) -> Option<EndedCall> {
        self.missing_key_logged = false;
        let ended = ch.tx_active().then_some(EndedCall {
            stream_id: ch.tx_stream_id,
            first_pending: ch.tx_first_pending,
        });
        if let Some(call) = &ended {
            tracing::debug!(ch = %ch.name, "-> tx call end stream={} at n={}", call.stream_id, ch.tx_frame_counter);
        }
        ch.reset_tx();
        ended
    }
}
