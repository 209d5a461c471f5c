use crate::ldu_layout::{SVC_OPT_EMERGENCY, SVC_OPT_ENCRYPTED};
use crate::RadioId;

/// LCO: group voice channel user
pub const LCO_GROUP: u8 = 0x00;
/// LCO: unit-to-unit voice channel user
pub const LCO_PRIVATE: u8 = 0x03;
/// Standard manufacturer id
pub const MFID_STANDARD: u8 = 0x00;

/// Link control word carried in LDU1 records 2..=4
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LinkControl {
    pub lco: u8,
    pub mfid: u8,
    pub service_options: u8,
    /// 24-bit destination (talkgroup for group calls)
    pub dst_id: RadioId,
    /// 24-bit source radio id
    pub src_id: RadioId,
}

impl LinkControl {
    pub fn group_voice(dst_id: RadioId, src_id: RadioId) -> Self {
        Self {
            lco: LCO_GROUP,
            mfid: MFID_STANDARD,
            service_options: 0,
            dst_id,
            src_id,
        }
    }

    #[inline]
    pub fn is_emergency(&self) -> bool {
        self.service_options & SVC_OPT_EMERGENCY != 0
    }

    #[inline]
    pub fn is_encrypted(&self) -> bool {
        self.service_options & SVC_OPT_ENCRYPTED != 0
    }

    pub fn set_emergency(&mut self, emergency: bool) {
        if emergency {
            self.service_options |= SVC_OPT_EMERGENCY;
        } else {
            self.service_options &= !SVC_OPT_EMERGENCY;
        }
    }

    pub fn set_encrypted(&mut self, encrypted: bool) {
        if encrypted {
            self.service_options |= SVC_OPT_ENCRYPTED;
        } else {
            self.service_options &= !SVC_OPT_ENCRYPTED;
        }
    }
}

/// Read a 24-bit big-endian id from a byte slice
#[inline]
pub fn read_u24_be(data: &[u8], offset: usize) -> u32 {
    ((data[offset] as u32) << 16) | ((data[offset + 1] as u32) << 8) | data[offset + 2] as u32
}

/// Write a 24-bit big-endian id into a byte slice
#[inline]
pub fn write_u24_be(data: &mut [u8], offset: usize, val: u32) {
    data[offset] = (val >> 16) as u8;
    data[offset + 1] = (val >> 8) as u8;
    data[offset + 2] = val as u8;
}
