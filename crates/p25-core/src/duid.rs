/// TIA-102.BAAA data unit identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Duid {
    /// Header data unit
    Hdu = 0x0,
    /// Simple terminator
    Tdu = 0x3,
    /// Logical data unit 1, voice + link control
    Ldu1 = 0x5,
    /// Trunking signalling data unit
    Tsdu = 0x7,
    /// Logical data unit 2, voice + encryption sync
    Ldu2 = 0xA,
    /// Packet data unit
    Pdu = 0xC,
    /// Terminator with link control
    Tdulc = 0xF,
}

impl Duid {
    pub fn from_raw(raw: u8) -> Option<Self> {
        match raw {
            0x0 => Some(Duid::Hdu),
            0x3 => Some(Duid::Tdu),
            0x5 => Some(Duid::Ldu1),
            0x7 => Some(Duid::Tsdu),
            0xA => Some(Duid::Ldu2),
            0xC => Some(Duid::Pdu),
            0xF => Some(Duid::Tdulc),
            _ => None,
        }
    }

    #[inline]
    pub fn into_raw(self) -> u8 {
        self as u8
    }

    #[inline]
    pub fn is_terminator(&self) -> bool {
        matches!(self, Duid::Tdu | Duid::Tdulc)
    }

    #[inline]
    pub fn is_voice(&self) -> bool {
        matches!(self, Duid::Ldu1 | Duid::Ldu2)
    }
}

impl core::fmt::Display for Duid {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Duid::Hdu => write!(f, "HDU"),
            Duid::Tdu => write!(f, "TDU"),
            Duid::Ldu1 => write!(f, "LDU1"),
            Duid::Tsdu => write!(f, "TSDU"),
            Duid::Ldu2 => write!(f, "LDU2"),
            Duid::Pdu => write!(f, "PDU"),
            Duid::Tdulc => write!(f, "TDULC"),
        }
    }
}
