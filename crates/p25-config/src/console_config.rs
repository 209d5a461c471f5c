use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use p25_core::{MAX_RADIO_ID, RadioId};

use crate::console_config_channel::CfgChannel;

#[inline]
pub fn default_tx_hold_limit_secs() -> u64 {
    120
}

/// Network identity of this console
#[derive(Debug, Clone)]
pub struct CfgNetwork {
    /// 24-bit radio id placed in the LC source field of our transmissions
    pub source_id: RadioId,
    /// Upper bound on a single transmission before a terminator is forced
    pub tx_hold_limit: Duration,
}

impl Default for CfgNetwork {
    fn default() -> Self {
        Self {
            source_id: 0,
            tx_hold_limit: Duration::from_secs(default_tx_hold_limit_secs()),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ConsoleConfig {
    pub debug_log: Option<String>,
    pub net: CfgNetwork,
    pub channels: Vec<CfgChannel>,
}

impl ConsoleConfig {
    pub fn new(source_id: RadioId) -> Self {
        ConsoleConfig {
            debug_log: None,
            net: CfgNetwork {
                source_id,
                ..Default::default()
            },
            channels: Vec::new(),
        }
    }

    pub fn channel(&self, name: &str) -> Option<&CfgChannel> {
        self.channels.iter().find(|c| c.name == name)
    }

    /// Validate that all required configuration fields are properly set.
    pub fn validate(&self) -> Result<(), String> {
        if self.net.source_id == 0 || self.net.source_id > MAX_RADIO_ID {
            return Err(format!("network source_id {} outside 1..=0xFFFFFF", self.net.source_id));
        }
        if self.net.tx_hold_limit.is_zero() {
            return Err("network tx_hold_limit_secs must be non-zero".to_string());
        }

        let mut names = HashSet::new();
        for ch in &self.channels {
            if ch.name.is_empty() {
                return Err("channel name must not be empty".to_string());
            }
            if !names.insert(ch.name.as_str()) {
                return Err(format!("duplicate channel name '{}'", ch.name));
            }
            if ch.talkgroup == 0 || ch.talkgroup > MAX_RADIO_ID {
                return Err(format!("channel '{}' talkgroup {} outside 1..=0xFFFFFF", ch.name, ch.talkgroup));
            }

            let binding = ch.key_binding();
            if !p25_core::is_clear_algo(ch.alg_id) {
                if ch.key_id == 0 {
                    return Err(format!("channel '{}' has alg_id 0x{:02X} but no key_id", ch.name, ch.alg_id));
                }
                match &ch.key {
                    Some(k) if !k.is_empty() => {}
                    _ => return Err(format!("channel '{}' ({}) has no key material", ch.name, binding)),
                }
            }
        }

        Ok(())
    }
}

/// Immutable console configuration shared between channel workers.
#[derive(Clone)]
pub struct SharedConfig {
    cfg: Arc<ConsoleConfig>,
}

impl SharedConfig {
    pub fn from_config(cfg: ConsoleConfig) -> Result<Self, String> {
        // Check config for validity before returning the SharedConfig object
        cfg.validate()?;
        Ok(Self { cfg: Arc::new(cfg) })
    }

    /// Access immutable config.
    pub fn config(&self) -> Arc<ConsoleConfig> {
        Arc::clone(&self.cfg)
    }
}
