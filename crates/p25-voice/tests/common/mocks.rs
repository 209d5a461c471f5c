use std::collections::HashMap;

use p25_core::{Codeword, IMBE_CODEWORD_LEN, IMBE_SAMPLES, MI_LEN, MessageIndicator};
use p25_voice::{CipherEngine, CryptoProtocol, FrameType, Vocoder};

/// Stand-in for the IMBE vocoder: the first 11 samples become the codeword bytes,
/// decoding puts them back. Decode reports a fixed error count.
#[derive(Debug, Default, Clone)]
pub struct MockVocoder {
    pub errors: u32,
}

impl MockVocoder {
    pub fn with_errors(errors: u32) -> Self {
        Self { errors }
    }
}

impl Vocoder for MockVocoder {
    fn encode(&mut self, pcm: &[i16; IMBE_SAMPLES]) -> Codeword {
        let mut cw = [0u8; IMBE_CODEWORD_LEN];
        for (b, s) in cw.iter_mut().zip(pcm.iter()) {
            *b = *s as u8;
        }
        cw
    }

    fn decode(&mut self, codeword: &Codeword) -> ([i16; IMBE_SAMPLES], u32) {
        let mut pcm = [0i16; IMBE_SAMPLES];
        for (s, b) in pcm.iter_mut().zip(codeword.iter()) {
            *s = *b as i16;
        }
        (pcm, self.errors)
    }
}

/// PCM chunk whose codeword is `[seed, seed+1, ..., seed+10]`
pub fn pcm_chunk(seed: u8) -> Vec<i16> {
    let mut pcm = vec![0i16; IMBE_SAMPLES];
    for (i, s) in pcm.iter_mut().take(IMBE_CODEWORD_LEN).enumerate() {
        *s = seed.wrapping_add(i as u8) as i16;
    }
    pcm
}

/// Keystream cipher for tests. The keystream depends on key, MI, frame type and voice
/// index, so deciphering with any other parameters yields garbage.
#[derive(Debug, Default)]
pub struct XorCipher {
    keys: HashMap<u16, (u8, Vec<u8>)>,
    active: Option<(u16, MessageIndicator)>,
    pub prepare_count: usize,
}

impl XorCipher {
    pub fn with_key(key_id: u16, alg_id: u8, key: &[u8]) -> Self {
        let mut cipher = Self::default();
        cipher.set_key(key_id, alg_id, key);
        cipher
    }
}

impl CipherEngine for XorCipher {
    fn prepare(&mut self, _alg_id: u8, key_id: u16, _protocol: CryptoProtocol, mi: &MessageIndicator) {
        self.active = Some((key_id, *mi));
        self.prepare_count += 1;
    }

    fn process(&mut self, codeword: &mut Codeword, frame_type: FrameType, voice_index: usize) {
        let Some((key_id, mi)) = self.active else {
            return;
        };
        let Some((_, key)) = self.keys.get(&key_id) else {
            return;
        };
        let position = match frame_type {
            FrameType::Ldu1 => voice_index,
            FrameType::Ldu2 => voice_index + 9,
        } as u8;
        for (i, b) in codeword.iter_mut().enumerate() {
            *b ^= key[i % key.len()] ^ mi.0[i % MI_LEN] ^ position.wrapping_mul(31) ^ (i as u8);
        }
    }

    fn has_key(&self, key_id: u16) -> bool {
        self.keys.contains_key(&key_id)
    }

    fn set_key(&mut self, key_id: u16, alg_id: u8, key: &[u8]) {
        self.keys.insert(key_id, (alg_id, key.to_vec()));
    }
}
