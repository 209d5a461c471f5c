use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use p25_core::{Duid, StreamId};
use p25_voice::{NetworkError, VoiceTransport};

#[derive(Debug, Clone)]
pub struct SentFrame {
    pub function_code: u8,
    pub payload: Vec<u8>,
    pub sequence: u16,
    pub stream_id: StreamId,
}

impl SentFrame {
    pub fn duid(&self) -> Option<Duid> {
        self.payload.first().and_then(|b| Duid::from_raw(*b))
    }
}

/// Transport that records every frame. Clones share the log, so a test can keep one
/// clone while the worker thread owns another.
#[derive(Debug, Clone, Default)]
pub struct RecordingTransport {
    sent: Arc<Mutex<Vec<SentFrame>>>,
    offline: Arc<AtomicBool>,
    next_stream: StreamId,
    sequence: u16,
}

impl RecordingTransport {
    pub fn sent(&self) -> Vec<SentFrame> {
        self.sent.lock().unwrap().clone()
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }
}

impl VoiceTransport for RecordingTransport {
    fn new_stream_id(&mut self) -> StreamId {
        self.next_stream += 1;
        0xC0DE_0000 + self.next_stream
    }

    fn next_sequence(&mut self, reset: bool) -> u16 {
        if reset {
            self.sequence = 0;
        } else {
            self.sequence = self.sequence.wrapping_add(1);
        }
        self.sequence
    }

    fn send(&mut self, function_code: u8, payload: &[u8], sequence: u16, stream_id: StreamId) -> Result<(), NetworkError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(NetworkError::NotConnected);
        }
        self.sent.lock().unwrap().push(SentFrame {
            function_code,
            payload: payload.to_vec(),
            sequence,
            stream_id,
        });
        Ok(())
    }
}
