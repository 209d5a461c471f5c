//! Core utilities for the P25 voice engine
//!
//! This crate provides fundamental types and constants used across the console stack:
//! - Data unit identifiers (DUIDs)
//! - The fixed LDU byte layout (record offsets, markers, codeword slots)
//! - Message indicator, crypto parameters and the MI LFSR
//! - Link control fields carried in LDU1
//! - Frame parse errors, common macros and logging setup

pub mod crypto_params;
pub mod debug;
pub mod duid;
pub mod frame_parse_error;
pub mod ldu_layout;
pub mod lfsr;
pub mod link_control;

// Re-export commonly used items
pub use crypto_params::*;
pub use duid::Duid;
pub use frame_parse_error::FrameParseErr;
pub use ldu_layout::{Codeword, LduBuffer, IMBE_CODEWORD_LEN, IMBE_SAMPLES, LDU_BUFFER_LEN};
pub use lfsr::cycle_mi;
pub use link_control::LinkControl;

/// Transport-level identifier grouping all frames of one call. Zero means "no stream".
pub type StreamId = u32;

/// 24-bit radio or talkgroup identifier
pub type RadioId = u32;

/// Largest value representable in a 24-bit P25 id field
pub const MAX_RADIO_ID: RadioId = 0xFF_FFFF;
