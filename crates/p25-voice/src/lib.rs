//! P25 digital-voice framing and encryption-synchronization engine
//!
//! Transmit: PCM chunk -> codec adapter -> crypto sync (cipher) -> LDU assembler -> transport.
//! Receive: transport -> LDU disassembler -> crypto sync (decipher) -> codec adapter -> PCM.
//!
//! All per-call state lives in a `ChannelCallState`. It is not internally synchronized;
//! `channel::ChannelHandle` runs one worker thread per channel that serializes access.

pub mod channel;
pub mod codec;
pub mod crypto;
pub mod framing;
pub mod network;

// Re-export commonly used items
pub use channel::call_state::{ChannelCallState, RxSlot};
pub use channel::handle::ChannelHandle;
pub use channel::hold_timer::CallHoldTimer;
pub use channel::worker::{ChannelCommand, ChannelEvent, ChannelWorker};
pub use codec::{CodecErr, CodewordCodec, Vocoder};
pub use crypto::cipher::{CipherEngine, CryptoProtocol, FrameType};
pub use crypto::crypto_sync::CryptoSync;
pub use framing::assembler::{EndedCall, LduAssembler, TransmitEvent};
pub use framing::disassembler::{DecodedAudio, LduDisassembler, RxCallEnd, RxCallStart, RxEvent};
pub use framing::records::{EncryptionSync, ParsedLdu, decode_records, encode_ldu1, encode_ldu2};
pub use network::{NET_FUNC_PROTOCOL, NetworkError, VoiceTransport};
