use core::fmt;

/// Length of the P25 message indicator
pub const MI_LEN: usize = 9;

/// Algorithm id meaning "unencrypted" as carried on air
pub const ALGO_UNENCRYPT: u8 = 0x80;

/// Algorithm id used locally (configuration) for "unencrypted"
pub const ALGO_NONE: u8 = 0x00;

/// Returns true when `alg_id` denotes clear voice
#[inline]
pub fn is_clear_algo(alg_id: u8) -> bool {
    alg_id == ALGO_NONE || alg_id == ALGO_UNENCRYPT
}

/// 9-byte synchronization vector seeding the cipher keystream.
/// The all-zero value is a sentinel meaning "uninitialized, generate new".
#[derive(Clone, Copy, PartialEq, Eq, Default)]
pub struct MessageIndicator(pub [u8; MI_LEN]);

impl MessageIndicator {
    pub const ZERO: MessageIndicator = MessageIndicator([0u8; MI_LEN]);

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|&b| b == 0)
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8; MI_LEN] {
        &self.0
    }
}

impl fmt::Debug for MessageIndicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in self.0 {
            write!(f, "{:02X}", b)?;
        }
        Ok(())
    }
}

impl fmt::Display for MessageIndicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Algorithm and key bound together with the MI whenever the cipher is (re)prepared
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CryptoParams {
    pub alg_id: u8,
    pub key_id: u16,
    pub mi: MessageIndicator,
}

impl CryptoParams {
    pub fn new(alg_id: u8, key_id: u16, mi: MessageIndicator) -> Self {
        Self { alg_id, key_id, mi }
    }

    /// Clear parameters as declared on air
    pub fn clear() -> Self {
        Self { alg_id: ALGO_UNENCRYPT, key_id: 0, mi: MessageIndicator::ZERO }
    }

    #[inline]
    pub fn is_encrypted(&self) -> bool {
        !is_clear_algo(self.alg_id)
    }
}

/// Long-lived (algId, keyId) binding of a channel, taken from configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KeyBinding {
    pub alg_id: u8,
    pub key_id: u16,
}

impl KeyBinding {
    pub fn new(alg_id: u8, key_id: u16) -> Self {
        Self { alg_id, key_id }
    }

    /// Transmit ciphering only happens when both an algorithm and a key are configured
    #[inline]
    pub fn is_encrypted(&self) -> bool {
        !is_clear_algo(self.alg_id) && self.key_id != 0
    }

    /// Whether a stream declaring `params` can be deciphered with this binding
    pub fn matches(&self, params: &CryptoParams) -> bool {
        self.is_encrypted() && self.alg_id == params.alg_id && self.key_id == params.key_id
    }
}

impl fmt::Display for KeyBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_encrypted() {
            write!(f, "alg=0x{:02X} kid=0x{:04X}", self.alg_id, self.key_id)
        } else {
            write!(f, "clear")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clear_algos() {
        assert!(is_clear_algo(0x00));
        assert!(is_clear_algo(0x80));
        assert!(!is_clear_algo(0xAA));
        assert!(!CryptoParams::clear().is_encrypted());
    }

    #[test]
    fn test_binding_needs_key_id() {
        assert!(!KeyBinding::new(0xAA, 0).is_encrypted());
        assert!(KeyBinding::new(0xAA, 1).is_encrypted());
        assert!(!KeyBinding::new(0x80, 1).is_encrypted());
    }

    #[test]
    fn test_binding_matches() {
        let binding = KeyBinding::new(0xAA, 0x10);
        let mi = MessageIndicator([1; MI_LEN]);
        assert!(binding.matches(&CryptoParams::new(0xAA, 0x10, mi)));
        assert!(!binding.matches(&CryptoParams::new(0x84, 0x10, mi)));
        assert!(!binding.matches(&CryptoParams::new(0xAA, 0x11, mi)));
        assert!(!KeyBinding::default().matches(&CryptoParams::clear()));
    }

    #[test]
    fn test_mi_display() {
        let mi = MessageIndicator([0xDE, 0xAD, 0, 0, 0, 0, 0, 0, 0x01]);
        assert_eq!(format!("{}", mi), "DEAD00000000000001");
        assert!(!mi.is_zero());
        assert!(MessageIndicator::ZERO.is_zero());
    }
}
