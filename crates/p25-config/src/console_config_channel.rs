use std::collections::HashMap;

use serde::Deserialize;
use toml::Value;

use p25_core::{ALGO_NONE, KeyBinding, RadioId};

/// One logical radio channel as selected on the console
#[derive(Debug, Clone)]
pub struct CfgChannel {
    /// Display name, unique across the console
    pub name: String,
    /// 24-bit destination talkgroup
    pub talkgroup: RadioId,
    /// Cipher algorithm id. 0x00 or 0x80 for clear
    pub alg_id: u8,
    /// Key id used with `alg_id`
    pub key_id: u16,
    /// Raw key material, present for encrypted channels
    pub key: Option<Vec<u8>>,
}

impl CfgChannel {
    pub fn clear(name: &str, talkgroup: RadioId) -> Self {
        Self {
            name: name.to_string(),
            talkgroup,
            alg_id: ALGO_NONE,
            key_id: 0,
            key: None,
        }
    }

    #[inline]
    pub fn key_binding(&self) -> KeyBinding {
        KeyBinding::new(self.alg_id, self.key_id)
    }
}

#[derive(Default, Deserialize)]
pub struct CfgChannelDto {
    pub name: String,
    pub talkgroup: u32,
    #[serde(default)]
    pub alg_id: u8,
    #[serde(default)]
    pub key_id: u16,
    /// Hex-encoded key material
    pub key: Option<String>,

    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

/// Decode a hex string (whitespace and ':' separators allowed) into bytes
pub fn parse_hex_key(s: &str) -> Result<Vec<u8>, String> {
    let digits: Vec<u8> = s.bytes().filter(|b| !b.is_ascii_whitespace() && *b != b':').collect();
    if digits.len() % 2 != 0 {
        return Err(format!("odd number of hex digits ({})", digits.len()));
    }
    digits
        .chunks(2)
        .map(|pair| {
            let hi = (pair[0] as char).to_digit(16);
            let lo = (pair[1] as char).to_digit(16);
            match (hi, lo) {
                (Some(hi), Some(lo)) => Ok((hi << 4 | lo) as u8),
                _ => Err(format!("invalid hex digit in '{}{}'", pair[0] as char, pair[1] as char)),
            }
        })
        .collect()
}

/// Convert a CfgChannelDto (from TOML) into a CfgChannel
pub fn apply_channel_patch(src: CfgChannelDto) -> Result<CfgChannel, String> {
    let key = match src.key {
        Some(hex) => Some(parse_hex_key(&hex).map_err(|e| format!("channel '{}' key: {}", src.name, e))?),
        None => None,
    };
    Ok(CfgChannel {
        name: src.name,
        talkgroup: src.talkgroup,
        alg_id: src.alg_id,
        key_id: src.key_id,
        key,
    })
}
