use p25_core::{Codeword, MessageIndicator};

/// Which LDU a codeword belongs to; selects the keystream segment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameType {
    Ldu1,
    Ldu2,
}

impl FrameType {
    /// Frame type for a position 0..18 in the superframe
    #[inline]
    pub fn from_superframe_pos(n: usize) -> Self {
        if n < p25_core::ldu_layout::VOICE_PER_LDU { FrameType::Ldu1 } else { FrameType::Ldu2 }
    }
}

/// Air interface the keystream is generated for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CryptoProtocol {
    P25,
    Dmr,
}

/// External cipher engine. Keystreams a codeword in place; applying it twice with the
/// same prepared parameters restores the original codeword.
pub trait CipherEngine: Send {
    /// Bind keystream parameters for subsequent `process` calls
    fn prepare(&mut self, alg_id: u8, key_id: u16, protocol: CryptoProtocol, mi: &MessageIndicator);

    /// Cipher or decipher one codeword in place
    fn process(&mut self, codeword: &mut Codeword, frame_type: FrameType, voice_index: usize);

    fn has_key(&self, key_id: u16) -> bool;

    fn set_key(&mut self, key_id: u16, alg_id: u8, key: &[u8]);
}
