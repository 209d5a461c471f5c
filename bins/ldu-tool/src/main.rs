use clap::Parser;

use p25_config::console_config_channel::parse_hex_key;
use p25_core::{CryptoParams, Duid, debug};
use p25_voice::decode_records;

mod dump;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "P25 LDU record stream decoder",
    long_about = "Decodes a raw LDU1/LDU2 record stream (hex) and prints markers, link control, encryption sync and codewords"
)]
struct Args {
    #[arg(help = "Data unit: [ ldu1 | ldu2 ]")]
    duid: String,

    #[arg(help = "Record stream as hex (154 bytes, plus 13-byte HDU trailer for an LDU1). Whitespace and ':' are ignored")]
    hex: String,

    #[arg(long, help = "Console config file, used with --channel to check the key binding")]
    config: Option<String>,

    #[arg(long, requires = "config", help = "Channel name in the config to check the declared algorithm/key against")]
    channel: Option<String>,
}

fn main() {
    eprintln!("[+] P25 LDU decoding tool");

    let args = Args::parse();
    let _log_guard = debug::setup_logging_default(None);

    let duid = match args.duid.to_lowercase().as_str() {
        "ldu1" | "5" => Duid::Ldu1,
        "ldu2" | "a" | "10" => Duid::Ldu2,
        _ => {
            eprintln!("Error: Unsupported data unit '{}'. Use: ldu1, ldu2", args.duid);
            std::process::exit(1);
        }
    };

    let raw = match parse_hex_key(&args.hex) {
        Ok(raw) => raw,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    tracing::debug!("decoding {} from {} bytes", duid, raw.len());
    let parsed = match decode_records(duid, &raw) {
        Ok(parsed) => parsed,
        Err(e) => {
            tracing::warn!("decode failed: {}", e);
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    dump::print_ldu(&raw, &parsed);

    if let (Some(config_path), Some(channel_name)) = (args.config, args.channel) {
        let config = match p25_config::from_file(&config_path) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("Error: failed to load {}: {}", config_path, e);
                std::process::exit(1);
            }
        };
        let cfg = config.config();
        let Some(channel) = cfg.channel(&channel_name) else {
            eprintln!("Error: no channel '{}' in {}", channel_name, config_path);
            std::process::exit(1);
        };

        let declared: Option<CryptoParams> = parsed.hdu.or(parsed.es.as_ref().map(|es| es.params));
        let binding = channel.key_binding();
        match declared {
            Some(params) if !params.is_encrypted() => println!("binding  : stream is clear, decodable on '{}'", channel.name),
            Some(params) if binding.matches(&params) => println!("binding  : matches '{}' ({})", channel.name, binding),
            Some(params) => println!(
                "binding  : MISMATCH, stream alg=0x{:02X} kid=0x{:04X}, '{}' is {}",
                params.alg_id, params.key_id, channel.name, binding
            ),
            None => println!("binding  : no crypto parameters in this LDU1 (no HDU trailer)"),
        }
    }
}
