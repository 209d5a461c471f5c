//! Crypto sync manager: owns the MI, algorithm id and key id of one direction of a channel,
//! and drives the cipher engine at the right points in the superframe cycle.

use rand::Rng;

use p25_core::{Codeword, CryptoParams, KeyBinding, MessageIndicator, cycle_mi};

use super::cipher::{CipherEngine, CryptoProtocol, FrameType};

pub struct CryptoSync<C: CipherEngine> {
    engine: C,
    params: CryptoParams,
    /// True once the engine holds a keystream for `params`
    prepared: bool,
}

impl<C: CipherEngine> CryptoSync<C> {
    pub fn new(engine: C) -> Self {
        Self {
            engine,
            params: CryptoParams::default(),
            prepared: false,
        }
    }

    pub fn engine(&self) -> &C {
        &self.engine
    }

    #[inline]
    pub fn params(&self) -> &CryptoParams {
        &self.params
    }

    #[inline]
    pub fn mi(&self) -> &MessageIndicator {
        &self.params.mi
    }

    #[inline]
    pub fn is_prepared(&self) -> bool {
        self.prepared
    }

    pub fn has_key(&self, key_id: u16) -> bool {
        self.engine.has_key(key_id)
    }

    /// Bind (algId, keyId, mi) and prepare the engine keystream
    pub fn prepare(&mut self, alg_id: u8, key_id: u16, mi: MessageIndicator) {
        self.params = CryptoParams::new(alg_id, key_id, mi);
        self.engine.prepare(alg_id, key_id, CryptoProtocol::P25, &mi);
        self.prepared = true;
        tracing::trace!("prepared keystream alg=0x{:02X} kid=0x{:04X} mi={}", alg_id, key_id, mi);
    }

    /// Cipher/decipher one codeword in place. No-op when the parameters are clear or
    /// nothing has been prepared yet. Returns whether the keystream was applied.
    pub fn apply_keystream(&mut self, codeword: &mut Codeword, frame_type: FrameType, voice_index: usize) -> bool {
        if !self.prepared || !self.params.is_encrypted() {
            return false;
        }
        self.engine.process(codeword, frame_type, voice_index);
        true
    }

    /// Advance the MI through the LFSR and re-prepare with the same algorithm and key
    pub fn cycle_mi(&mut self) {
        let next = cycle_mi(&self.params.mi);
        self.prepare(self.params.alg_id, self.params.key_id, next);
    }

    /// Transmit, first codeword of LDU1. A zero MI means a new call: generate a fresh
    /// random MI and prepare. Otherwise the MI was already cycled at the end of the
    /// previous superframe.
    pub fn tx_begin_superframe(&mut self, binding: KeyBinding) {
        if !self.params.mi.is_zero() && self.prepared {
            return;
        }
        let mi = generate_mi();
        tracing::debug!("-> new tx MI {} ({})", mi, binding);
        self.prepare(binding.alg_id, binding.key_id, mi);
    }

    /// Transmit, last codeword of LDU2, after it has been ciphered. The next superframe
    /// uses a fresh MI.
    pub fn tx_end_superframe(&mut self) {
        self.cycle_mi();
        tracing::trace!("-> tx MI cycled to {}", self.params.mi);
    }

    /// Receive, after all codewords of an LDU2 were processed. A corrupted sync candidate
    /// is worse than a predictable LFSR step: if the last codeword decoded with errors,
    /// the candidate is discarded and the current MI is cycled instead.
    ///
    /// Without any prior sync (late entry) the candidate is adopted regardless.
    pub fn rx_apply_sync(&mut self, candidate: &CryptoParams, last_errors: u32) {
        if !self.prepared || self.params.mi.is_zero() {
            tracing::debug!("<- late entry sync, adopting MI {}", candidate.mi);
            self.prepare(candidate.alg_id, candidate.key_id, candidate.mi);
        } else if last_errors > 0 {
            tracing::debug!("<- {} decode errors, cycling MI instead of adopting {}", last_errors, candidate.mi);
            self.cycle_mi();
        } else {
            self.prepare(candidate.alg_id, candidate.key_id, candidate.mi);
        }
    }

    /// Return to the "uninitialized" sentinel. Key material in the engine is kept.
    pub fn reset(&mut self) {
        self.params = CryptoParams::default();
        self.prepared = false;
    }
}

/// Fresh random MI. Never returns the all-zero sentinel.
fn generate_mi() -> MessageIndicator {
    let mut rng = rand::rng();
    loop {
        let mut bytes = [0u8; p25_core::MI_LEN];
        rng.fill(&mut bytes);
        let mi = MessageIndicator(bytes);
        if !mi.is_zero() {
            return mi;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Records prepare calls, flips every bit on process
    #[derive(Default)]
    struct Recorder {
        prepares: Vec<(u8, u16, MessageIndicator)>,
        processed: usize,
    }

    impl CipherEngine for Recorder {
        fn prepare(&mut self, alg_id: u8, key_id: u16, _protocol: CryptoProtocol, mi: &MessageIndicator) {
            self.prepares.push((alg_id, key_id, *mi));
        }
        fn process(&mut self, codeword: &mut Codeword, _frame_type: FrameType, _voice_index: usize) {
            self.processed += 1;
            codeword.iter_mut().for_each(|b| *b = !*b);
        }
        fn has_key(&self, _key_id: u16) -> bool {
            true
        }
        fn set_key(&mut self, _key_id: u16, _alg_id: u8, _key: &[u8]) {}
    }

    #[test]
    fn test_tx_begin_generates_once() {
        let mut sync = CryptoSync::new(Recorder::default());
        let binding = KeyBinding::new(0xAA, 0x10);
        sync.tx_begin_superframe(binding);
        let mi = *sync.mi();
        assert!(!mi.is_zero());
        assert_eq!(sync.params().alg_id, 0xAA);
        assert_eq!(sync.params().key_id, 0x10);

        // Second superframe keeps the (cycled) MI
        sync.tx_begin_superframe(binding);
        assert_eq!(*sync.mi(), mi);
        assert_eq!(sync.engine().prepares.len(), 1);
    }

    #[test]
    fn test_tx_end_cycles_and_reprepares() {
        let mut sync = CryptoSync::new(Recorder::default());
        let mi = MessageIndicator([1, 2, 3, 4, 5, 6, 7, 8, 9]);
        sync.prepare(0xAA, 0x10, mi);
        sync.tx_end_superframe();
        assert_eq!(*sync.mi(), cycle_mi(&mi));
        assert_eq!(sync.engine().prepares.last().unwrap().2, cycle_mi(&mi));
    }

    #[test]
    fn test_clear_params_bypass_engine() {
        let mut sync = CryptoSync::new(Recorder::default());
        let mut cw = [0x55u8; 11];
        assert!(!sync.apply_keystream(&mut cw, FrameType::Ldu1, 0));
        sync.prepare(0x80, 0, MessageIndicator::ZERO);
        assert!(!sync.apply_keystream(&mut cw, FrameType::Ldu1, 0));
        assert_eq!(cw, [0x55u8; 11]);
        assert_eq!(sync.engine().processed, 0);
    }

    #[test]
    fn test_rx_sync_adopts_candidate_without_errors() {
        let mut sync = CryptoSync::new(Recorder::default());
        let mi = MessageIndicator([1; 9]);
        sync.prepare(0xAA, 0x10, mi);
        let candidate = CryptoParams::new(0xAA, 0x10, MessageIndicator([7; 9]));
        sync.rx_apply_sync(&candidate, 0);
        assert_eq!(*sync.mi(), MessageIndicator([7; 9]));
    }

    #[test]
    fn test_rx_sync_cycles_on_errors() {
        let mut sync = CryptoSync::new(Recorder::default());
        let mi = MessageIndicator([1; 9]);
        sync.prepare(0xAA, 0x10, mi);
        let candidate = CryptoParams::new(0xAA, 0x10, MessageIndicator([7; 9]));
        sync.rx_apply_sync(&candidate, 3);
        assert_eq!(*sync.mi(), cycle_mi(&mi));
    }

    #[test]
    fn test_rx_sync_late_entry_adopts_even_with_errors() {
        let mut sync = CryptoSync::new(Recorder::default());
        let candidate = CryptoParams::new(0xAA, 0x10, MessageIndicator([7; 9]));
        sync.rx_apply_sync(&candidate, 5);
        assert!(sync.is_prepared());
        assert_eq!(*sync.mi(), MessageIndicator([7; 9]));
    }

    #[test]
    fn test_reset_returns_to_sentinel() {
        let mut sync = CryptoSync::new(Recorder::default());
        sync.tx_begin_superframe(KeyBinding::new(0xAA, 1));
        sync.reset();
        assert!(sync.mi().is_zero());
        assert!(!sync.is_prepared());
    }
}
