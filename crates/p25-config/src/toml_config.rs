use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use toml::Value;

use super::console_config::{CfgNetwork, ConsoleConfig, SharedConfig, default_tx_hold_limit_secs};
use super::console_config_channel::{CfgChannelDto, apply_channel_patch};

/// Build `SharedConfig` from a TOML configuration string
pub fn from_toml_str(toml_str: &str) -> Result<SharedConfig, Box<dyn std::error::Error>> {
    let root: TomlConfigRoot = toml::from_str(toml_str)?;

    // Various sanity checks
    let expected_config_version = "0.1";
    if !root.config_version.eq(expected_config_version) {
        return Err(format!(
            "Unrecognized config_version: {}, expect {}",
            root.config_version, expected_config_version
        )
        .into());
    }
    if !root.extra.is_empty() {
        return Err(format!("Unrecognized top-level fields: {:?}", sorted_keys(&root.extra)).into());
    }
    if !root.network.extra.is_empty() {
        return Err(format!("Unrecognized fields in network: {:?}", sorted_keys(&root.network.extra)).into());
    }
    for ch in &root.channel {
        if !ch.extra.is_empty() {
            return Err(format!("Unrecognized fields in channel '{}': {:?}", ch.name, sorted_keys(&ch.extra)).into());
        }
    }

    let mut cfg = ConsoleConfig {
        debug_log: root.debug_log,
        net: CfgNetwork::default(),
        channels: Vec::with_capacity(root.channel.len()),
    };

    apply_network_patch(&mut cfg.net, root.network);

    for ch in root.channel {
        cfg.channels.push(apply_channel_patch(ch)?);
    }

    Ok(SharedConfig::from_config(cfg)?)
}

/// Build `SharedConfig` from any reader.
pub fn from_reader<R: Read>(reader: R) -> Result<SharedConfig, Box<dyn std::error::Error>> {
    let mut contents = String::new();
    let mut reader = BufReader::new(reader);
    reader.read_to_string(&mut contents)?;
    from_toml_str(&contents)
}

/// Build `SharedConfig` from a file path.
pub fn from_file<P: AsRef<Path>>(path: P) -> Result<SharedConfig, Box<dyn std::error::Error>> {
    let f = File::open(path)?;
    let r = BufReader::new(f);
    let cfg = from_reader(r)?;
    Ok(cfg)
}

fn apply_network_patch(dst: &mut CfgNetwork, src: NetworkDto) {
    dst.source_id = src.source_id;
    dst.tx_hold_limit = Duration::from_secs(src.tx_hold_limit_secs);
}

fn sorted_keys(map: &HashMap<String, Value>) -> Vec<&str> {
    let mut v: Vec<&str> = map.keys().map(|s| s.as_str()).collect();
    v.sort_unstable();
    v
}

/// ----------------------- DTOs for input shape -----------------------

#[derive(Deserialize)]
struct TomlConfigRoot {
    config_version: String,
    debug_log: Option<String>,

    network: NetworkDto,

    #[serde(default)]
    channel: Vec<CfgChannelDto>,

    #[serde(flatten)]
    extra: HashMap<String, Value>,
}

#[derive(Deserialize)]
struct NetworkDto {
    pub source_id: u32,
    #[serde(default = "default_tx_hold_limit_secs")]
    pub tx_hold_limit_secs: u64,

    #[serde(flatten)]
    extra: HashMap<String, Value>,
}
