#![allow(dead_code)]

pub mod mocks;
pub mod recording_transport;

pub use mocks::{MockVocoder, XorCipher, pcm_chunk};
pub use recording_transport::{RecordingTransport, SentFrame};

use p25_core::{KeyBinding, LinkControl};
use p25_voice::ChannelCallState;

pub const TEST_ALG: u8 = 0xAA;
pub const TEST_KID: u16 = 0x0005;
pub const TEST_KEY: &[u8] = &[0x10, 0x32, 0x54, 0x76, 0x98, 0xBA, 0xDC, 0xFE];
pub const TALKGROUP: u32 = 0x00_0A01;
pub const SOURCE: u32 = 0x12_3456;

/// Clear channel with empty cipher engines
pub fn clear_channel(name: &str) -> ChannelCallState<XorCipher> {
    ChannelCallState::new(
        name,
        KeyBinding::default(),
        LinkControl::group_voice(TALKGROUP, SOURCE),
        XorCipher::default(),
        XorCipher::default(),
    )
}

/// Encrypted channel bound to (`alg_id`, `key_id`), both engines holding `key`
pub fn keyed_channel(name: &str, alg_id: u8, key_id: u16, key: &[u8]) -> ChannelCallState<XorCipher> {
    let mut lc = LinkControl::group_voice(TALKGROUP, SOURCE);
    lc.set_encrypted(true);
    ChannelCallState::new(
        name,
        KeyBinding::new(alg_id, key_id),
        lc,
        XorCipher::with_key(key_id, alg_id, key),
        XorCipher::with_key(key_id, alg_id, key),
    )
}
