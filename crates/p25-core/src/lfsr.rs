//! Message indicator LFSR (TIA-102.AAAD).
//!
//! The first 64 bits of the MI are clocked 64 times through the Fibonacci LFSR with
//! characteristic polynomial C(x) = x^64 + x^62 + x^46 + x^38 + x^27 + x^15 + 1.
//! The trailing MI byte is always zero after cycling. The feedback includes the
//! x^64 term, so the step is invertible and a non-zero state never reaches zero.

use crate::crypto_params::{MessageIndicator, MI_LEN};

const LFSR_STEPS: usize = 64;

#[inline]
fn feedback(lfsr: u64) -> u64 {
    ((lfsr >> 63) ^ (lfsr >> 61) ^ (lfsr >> 45) ^ (lfsr >> 37) ^ (lfsr >> 26) ^ (lfsr >> 14)) & 1
}

/// Advance a message indicator by one superframe. Pure and deterministic.
pub fn cycle_mi(mi: &MessageIndicator) -> MessageIndicator {
    let mut lfsr = mi.0[..8].iter().fold(0u64, |acc, &b| (acc << 8) | b as u64);

    for _ in 0..LFSR_STEPS {
        lfsr = (lfsr << 1) | feedback(lfsr);
    }

    let mut out = [0u8; MI_LEN];
    out[..8].copy_from_slice(&lfsr.to_be_bytes());
    MessageIndicator(out)
}
