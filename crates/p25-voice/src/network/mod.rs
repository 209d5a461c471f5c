//! Seam towards the peer/FNE network client. The envelope format is owned by the
//! transport; this engine only hands over function code, payload, sequence and stream id.

use p25_core::StreamId;

/// Function code for P25 protocol traffic
pub const NET_FUNC_PROTOCOL: u8 = 0x00;

/// Network transport used by a channel for voice traffic
pub trait VoiceTransport: Send {
    /// Allocate a new non-zero stream id, unique per call
    fn new_stream_id(&mut self) -> StreamId;

    /// Next 16-bit wrapping packet sequence. `reset` marks the first frame of a call
    fn next_sequence(&mut self, reset: bool) -> u16;

    /// Fire-and-forget send of one frame
    fn send(&mut self, function_code: u8, payload: &[u8], sequence: u16, stream_id: StreamId) -> Result<(), NetworkError>;
}

/// Network-related errors
#[derive(Debug, Clone)]
pub enum NetworkError {
    NotConnected,
    SendFailed(String),
}

impl std::fmt::Display for NetworkError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NetworkError::NotConnected => write!(f, "Transport not connected"),
            NetworkError::SendFailed(msg) => write!(f, "Send failed: {}", msg),
        }
    }
}

impl std::error::Error for NetworkError {}
