use std::time::Instant;

use p25_config::{CfgChannel, ConsoleConfig};
use p25_core::{Duid, KeyBinding, LDU_BUFFER_LEN, LduBuffer, LinkControl, RadioId, StreamId};

use crate::crypto::cipher::CipherEngine;
use crate::crypto::crypto_sync::CryptoSync;

/// Receive slot of a channel: what the last inbound call looked like
#[derive(Debug, Clone, Default)]
pub struct RxSlot {
    /// Stream id of the active inbound call, 0 = none
    pub stream_id: StreamId,
    pub start: Option<Instant>,
    pub last_duid: Option<Duid>,
    /// Last talkgroup seen in link control
    pub dst_id: RadioId,
    /// Last source seen in link control
    pub src_id: RadioId,
    pub emergency: bool,
    pub encrypted: bool,
    /// Number of LDUs accepted for this call
    pub ldu_count: u32,
}

impl RxSlot {
    /// Open a slot for a new inbound stream
    pub fn open(stream_id: StreamId, start: Instant) -> Self {
        Self {
            stream_id,
            start: Some(start),
            ..Default::default()
        }
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.stream_id != 0
    }

    pub fn reset(&mut self) {
        *self = RxSlot::default();
    }
}

/// Per-channel call context. The unit of isolation between concurrent calls.
///
/// Not internally synchronized: every mutation must be serialized by the owner
/// (see `ChannelWorker`). Transmit and receive each own a crypto sync manager so a
/// receive-side MI update can never disturb an in-progress transmit keystream.
pub struct ChannelCallState<C: CipherEngine> {
    pub name: String,
    /// Long-lived (algId, keyId) from configuration, survives call boundaries
    pub binding: KeyBinding,
    /// Link control template for transmitted LDU1s
    pub tx_link: LinkControl,

    /// Position in the transmit superframe, 0..=17
    pub tx_frame_counter: usize,
    pub ldu1: LduBuffer,
    pub ldu2: LduBuffer,
    pub tx_crypto: CryptoSync<C>,
    /// Transmit call identifier, 0 = none
    pub tx_stream_id: StreamId,
    /// Sequence of the last transmitted frame
    pub tx_sequence: u16,
    /// Next LDU1 is the first of the call (sequence reset, HDU trailer)
    pub tx_first_pending: bool,

    pub rx_slot: RxSlot,
    pub rx_crypto: CryptoSync<C>,
    pub rx_ldu1: LduBuffer,
    pub rx_ldu2: LduBuffer,
}

impl<C: CipherEngine> ChannelCallState<C> {
    pub fn new(name: &str, binding: KeyBinding, tx_link: LinkControl, tx_engine: C, rx_engine: C) -> Self {
        Self {
            name: name.to_string(),
            binding,
            tx_link,
            tx_frame_counter: 0,
            ldu1: [0u8; LDU_BUFFER_LEN],
            ldu2: [0u8; LDU_BUFFER_LEN],
            tx_crypto: CryptoSync::new(tx_engine),
            tx_stream_id: 0,
            tx_sequence: 0,
            tx_first_pending: false,
            rx_slot: RxSlot::default(),
            rx_crypto: CryptoSync::new(rx_engine),
            rx_ldu1: [0u8; LDU_BUFFER_LEN],
            rx_ldu2: [0u8; LDU_BUFFER_LEN],
        }
    }

    /// Build the state for a configured channel, provisioning key material into both
    /// cipher engines when the channel is encrypted.
    pub fn from_config(cfg: &ConsoleConfig, channel: &CfgChannel, mut tx_engine: C, mut rx_engine: C) -> Self {
        let binding = channel.key_binding();
        let mut tx_link = LinkControl::group_voice(channel.talkgroup, cfg.net.source_id);

        if binding.is_encrypted() {
            tx_link.set_encrypted(true);
            match &channel.key {
                Some(key) => {
                    tx_engine.set_key(binding.key_id, binding.alg_id, key);
                    rx_engine.set_key(binding.key_id, binding.alg_id, key);
                    tracing::debug!(ch = %channel.name, "provisioned key {}", binding);
                }
                None => tracing::warn!(ch = %channel.name, "encrypted channel without key material ({})", binding),
            }
        }

        Self::new(&channel.name, binding, tx_link, tx_engine, rx_engine)
    }

    /// Whether a transmit call is in progress
    #[inline]
    pub fn tx_active(&self) -> bool {
        self.tx_stream_id != 0
    }

    /// Return transient transmit state to Idle. The key binding is kept.
    pub fn reset_tx(&mut self) {
        self.tx_frame_counter = 0;
        self.ldu1 = [0u8; LDU_BUFFER_LEN];
        self.ldu2 = [0u8; LDU_BUFFER_LEN];
        self.tx_crypto.reset();
        self.tx_stream_id = 0;
        self.tx_first_pending = false;
    }

    /// Return transient receive state to Idle
    pub fn reset_rx(&mut self) {
        self.rx_slot.reset();
        self.rx_crypto.reset();
        self.rx_ldu1 = [0u8; LDU_BUFFER_LEN];
        self.rx_ldu2 = [0u8; LDU_BUFFER_LEN];
    }
}
