use crate::duid::Duid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameParseErr {
    /// Record stream shorter than the fixed LDU layout
    TooShort { expected: usize, found: usize },
    /// A record marker byte did not match the layout for this DUID
    InvalidMarker { record: usize, expected: u8, found: u8 },
    /// DUID does not carry voice records
    NotVoice { duid: Duid },
    /// Raw DUID value is not defined
    UnknownDuid { found: u8 },
}

impl std::fmt::Display for FrameParseErr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TooShort { expected, found } => write!(f, "frame too short: {} bytes, expected {}", found, expected),
            Self::InvalidMarker { record, expected, found } => {
                write!(f, "record {} marker 0x{:02X}, expected 0x{:02X}", record, found, expected)
            }
            Self::NotVoice { duid } => write!(f, "{} carries no voice records", duid),
            Self::UnknownDuid { found } => write!(f, "unknown DUID 0x{:X}", found),
        }
    }
}

impl std::error::Error for FrameParseErr {}

/// Checks a record marker. If it does not match, returns FrameParseErr::InvalidMarker
#[macro_export]
macro_rules! expect_marker {
    ($data:expr, $offset:expr, $record:expr, $expected:expr) => {{
        let found = $data[$offset];
        if found == $expected {
            Ok(())
        } else {
            Err($crate::FrameParseErr::InvalidMarker {
                record: $record,
                expected: $expected,
                found,
            })
        }
    }};
}
