//! Fixed byte layout of LDU1/LDU2 voice frames.
//!
//! An LDU travels as a stream of 9 DFSI-style records (154 bytes in total). Locally each
//! record is expanded into a 225-byte scratch buffer at 25-byte spacing, and the IMBE
//! codeword of every record sits at a fixed offset inside that buffer. These offsets are
//! protocol constants and must be reproduced exactly.

/// Size of a single IMBE codeword in bytes
pub const IMBE_CODEWORD_LEN: usize = 11;

/// PCM samples (8 kHz, 16 bit) represented by one codeword, i.e. 20 ms of audio
pub const IMBE_SAMPLES: usize = 160;

/// Voice codewords carried per LDU
pub const VOICE_PER_LDU: usize = 9;

/// Codewords per superframe (LDU1 + LDU2)
pub const VOICE_PER_SUPERFRAME: usize = 2 * VOICE_PER_LDU;

/// Size of the local LDU scratch buffer
pub const LDU_BUFFER_LEN: usize = 225;

/// Size of the LDU record stream on the wire
pub const RAW_LDU_LEN: usize = 154;

/// Opaque IMBE codeword
pub type Codeword = [u8; IMBE_CODEWORD_LEN];

/// Local LDU scratch buffer
pub type LduBuffer = [u8; LDU_BUFFER_LEN];

/// Offset of each codeword in the scratch buffer
pub const CODEWORD_OFFSETS: [usize; VOICE_PER_LDU] = [10, 26, 55, 80, 105, 130, 155, 180, 204];

/// Offset of each record in the raw record stream
pub const RECORD_OFFSETS_RAW: [usize; VOICE_PER_LDU] = [0, 22, 36, 53, 70, 87, 104, 121, 138];

/// Length of each record in the raw record stream
pub const RECORD_LENGTHS: [usize; VOICE_PER_LDU] = [22, 14, 17, 17, 17, 17, 17, 17, 16];

/// Offset of each record once expanded into the scratch buffer
pub const RECORD_OFFSETS_BUF: [usize; VOICE_PER_LDU] = [0, 25, 50, 75, 100, 125, 150, 175, 200];

/// Record markers (first byte of each record) for LDU1
pub const LDU1_MARKERS: [u8; VOICE_PER_LDU] = [0x62, 0x63, 0x64, 0x65, 0x66, 0x67, 0x68, 0x69, 0x6A];

/// Record markers (first byte of each record) for LDU2
pub const LDU2_MARKERS: [u8; VOICE_PER_LDU] = [0x6B, 0x6C, 0x6D, 0x6E, 0x6F, 0x70, 0x71, 0x72, 0x73];

/// LDU1 record carrying LCO, MFId and service options
pub const LDU1_REC_SERVICE: usize = 2;
/// LDU1 record carrying the 24-bit destination
pub const LDU1_REC_DST: usize = 3;
/// LDU1 record carrying the 24-bit source
pub const LDU1_REC_SRC: usize = 4;

/// Service option bit: emergency
pub const SVC_OPT_EMERGENCY: u8 = 0x80;
/// Service option bit: encrypted
pub const SVC_OPT_ENCRYPTED: u8 = 0x40;

/// First LDU2 record carrying a 3-byte encryption sync fragment
pub const LDU2_REC_ES_FIRST: usize = 2;
/// Number of 3-byte encryption sync fragments per LDU2
pub const LDU2_ES_FRAGMENTS: usize = 6;
/// LDU2 record carrying algorithm id and key id
pub const LDU2_REC_ALG_KEY: usize = 5;
/// Size of an encryption sync fragment
pub const ES_FRAGMENT_LEN: usize = 3;

/// HDU trailer appended to the first LDU1 of a call: marker, algId, keyId(2), MI(9)
pub const HDU_TRAILER_LEN: usize = 13;
/// Marker value flagging a valid HDU trailer
pub const HDU_VALID: u8 = 0x01;

/// Returns the record markers for the given LDU (true for LDU1)
#[inline]
pub fn markers_for(is_ldu1: bool) -> &'static [u8; VOICE_PER_LDU] {
    if is_ldu1 { &LDU1_MARKERS } else { &LDU2_MARKERS }
}

/// Copy the codeword for `voice_index` (0..9) out of a scratch buffer
pub fn read_codeword(buf: &LduBuffer, voice_index: usize) -> Codeword {
    let off = CODEWORD_OFFSETS[voice_index];
    let mut cw = [0u8; IMBE_CODEWORD_LEN];
    cw.copy_from_slice(&buf[off..off + IMBE_CODEWORD_LEN]);
    cw
}

/// Write the codeword for `voice_index` (0..9) into its slot in a scratch buffer
pub fn write_codeword(buf: &mut LduBuffer, voice_index: usize, cw: &Codeword) {
    let off = CODEWORD_OFFSETS[voice_index];
    buf[off..off + IMBE_CODEWORD_LEN].copy_from_slice(cw);
}
