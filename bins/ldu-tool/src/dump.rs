use p25_core::ldu_layout::{RECORD_LENGTHS, RECORD_OFFSETS_RAW, VOICE_PER_LDU, read_codeword};
use p25_core::link_control::{LCO_GROUP, LCO_PRIVATE};
use p25_voice::ParsedLdu;

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02X}", b)).collect::<Vec<_>>().join(" ")
}

pub fn print_ldu(raw: &[u8], parsed: &ParsedLdu) {
    println!("duid     : {} (0x{:X})", parsed.duid, parsed.duid.into_raw());
    println!("length   : {} bytes", raw.len());

    for i in 0..VOICE_PER_LDU {
        let off = RECORD_OFFSETS_RAW[i];
        println!(
            "record {} : @{:<3} len {:<2} marker 0x{:02X}  imbe {}",
            i,
            off,
            RECORD_LENGTHS[i],
            raw[off],
            hex(&read_codeword(&parsed.buffer, i))
        );
    }

    if let Some(lc) = &parsed.link {
        let lco = match lc.lco {
            LCO_GROUP => "group voice",
            LCO_PRIVATE => "unit to unit",
            _ => "other",
        };
        println!("lc       : lco 0x{:02X} ({}) mfid 0x{:02X} svc 0x{:02X}", lc.lco, lco, lc.mfid, lc.service_options);
        println!("           dst {} src {}", lc.dst_id, lc.src_id);
        println!("           emergency {} encrypted {}", lc.is_emergency(), lc.is_encrypted());
    }

    if let Some(hdu) = &parsed.hdu {
        println!("hdu      : alg 0x{:02X} kid 0x{:04X} mi {}", hdu.alg_id, hdu.key_id, hdu.mi);
    }

    if let Some(es) = &parsed.es {
        println!("es       : alg 0x{:02X} kid 0x{:04X} mi {}", es.params.alg_id, es.params.key_id, es.params.mi);
        for (k, frag) in es.fragments.iter().enumerate() {
            println!("           fragment {} : {}", k, hex(frag));
        }
    }
}
