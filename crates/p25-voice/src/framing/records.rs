//! LDU record stream parsing and serialization.
//!
//! Wire form: 9 records, 154 bytes, each record opening with its marker byte
//! (0x62..0x6A for LDU1, 0x6B..0x73 for LDU2). The first LDU1 of an encrypted call
//! additionally carries a 13-byte HDU trailer.

use p25_core::expect_marker;
use p25_core::ldu_layout::*;
use p25_core::link_control::{read_u24_be, write_u24_be};
use p25_core::{CryptoParams, Duid, FrameParseErr, LduBuffer, LinkControl, MI_LEN, MessageIndicator};

/// Encryption sync carried by one LDU2
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptionSync {
    /// Candidate (algId, keyId, MI) for the next superframe
    pub params: CryptoParams,
    /// Raw 3-byte fragments from records 2..=7, parity included
    pub fragments: [[u8; ES_FRAGMENT_LEN]; LDU2_ES_FRAGMENTS],
}

/// Result of parsing one LDU record stream
#[derive(Debug, Clone)]
pub struct ParsedLdu {
    pub duid: Duid,
    /// Records expanded into the local scratch layout
    pub buffer: LduBuffer,
    /// LDU1 only
    pub link: Option<LinkControl>,
    /// LDU1 only, when a valid HDU trailer is present
    pub hdu: Option<CryptoParams>,
    /// LDU2 only
    pub es: Option<EncryptionSync>,
}

/// Verify length and every record marker without touching anything else
pub fn validate_records(duid: Duid, raw: &[u8]) -> Result<(), FrameParseErr> {
    if !duid.is_voice() {
        return Err(FrameParseErr::NotVoice { duid });
    }
    let markers = markers_for(duid == Duid::Ldu1);
    if raw.len() < RAW_LDU_LEN {
        return Err(FrameParseErr::TooShort {
            expected: RAW_LDU_LEN,
            found: raw.len(),
        });
    }
    for (record, (&offset, &marker)) in RECORD_OFFSETS_RAW.iter().zip(markers.iter()).enumerate() {
        expect_marker!(raw, offset, record, marker)?;
    }
    Ok(())
}

/// Parse a raw LDU record stream
pub fn decode_records(duid: Duid, raw: &[u8]) -> Result<ParsedLdu, FrameParseErr> {
    validate_records(duid, raw)?;
    p25_core::assert_warn!(
        raw.len() <= RAW_LDU_LEN + HDU_TRAILER_LEN,
        "{} with {} trailing bytes",
        duid,
        raw.len() - RAW_LDU_LEN
    );

    let mut buffer = [0u8; LDU_BUFFER_LEN];
    for i in 0..VOICE_PER_LDU {
        let src = RECORD_OFFSETS_RAW[i];
        let dst = RECORD_OFFSETS_BUF[i];
        let len = RECORD_LENGTHS[i];
        buffer[dst..dst + len].copy_from_slice(&raw[src..src + len]);
    }

    let mut parsed = ParsedLdu {
        duid,
        buffer,
        link: None,
        hdu: None,
        es: None,
    };

    match duid {
        Duid::Ldu1 => {
            parsed.link = Some(read_link_control(&parsed.buffer));
            parsed.hdu = read_hdu_trailer(&raw[RAW_LDU_LEN..]);
        }
        Duid::Ldu2 => {
            parsed.es = Some(read_encryption_sync(&parsed.buffer));
        }
        _ => {}
    }

    Ok(parsed)
}

fn read_link_control(buf: &LduBuffer) -> LinkControl {
    let svc = RECORD_OFFSETS_BUF[LDU1_REC_SERVICE];
    LinkControl {
        lco: buf[svc + 1],
        mfid: buf[svc + 2],
        service_options: buf[svc + 3],
        dst_id: read_u24_be(buf, RECORD_OFFSETS_BUF[LDU1_REC_DST] + 1),
        src_id: read_u24_be(buf, RECORD_OFFSETS_BUF[LDU1_REC_SRC] + 1),
    }
}

fn read_hdu_trailer(trailer: &[u8]) -> Option<CryptoParams> {
    if trailer.len() < HDU_TRAILER_LEN {
        return None;
    }
    if trailer[0] != HDU_VALID {
        tracing::trace!("HDU trailer present with marker 0x{:02X}, ignoring", trailer[0]);
        return None;
    }
    let mut mi = [0u8; MI_LEN];
    mi.copy_from_slice(&trailer[4..4 + MI_LEN]);
    Some(CryptoParams::new(
        trailer[1],
        u16::from_be_bytes([trailer[2], trailer[3]]),
        MessageIndicator(mi),
    ))
}

fn read_encryption_sync(buf: &LduBuffer) -> EncryptionSync {
    let mut fragments = [[0u8; ES_FRAGMENT_LEN]; LDU2_ES_FRAGMENTS];
    for (k, frag) in fragments.iter_mut().enumerate() {
        let off = RECORD_OFFSETS_BUF[LDU2_REC_ES_FIRST + k] + 1;
        frag.copy_from_slice(&buf[off..off + ES_FRAGMENT_LEN]);
    }

    // Fragments 0..3 assemble the MI, fragment 3 is algId + keyId
    let mut mi = [0u8; MI_LEN];
    for k in 0..3 {
        mi[k * ES_FRAGMENT_LEN..(k + 1) * ES_FRAGMENT_LEN].copy_from_slice(&fragments[k]);
    }
    let alg_key = &fragments[LDU2_REC_ALG_KEY - LDU2_REC_ES_FIRST];
    let params = CryptoParams::new(alg_key[0], u16::from_be_bytes([alg_key[1], alg_key[2]]), MessageIndicator(mi));

    EncryptionSync { params, fragments }
}

/// Lay out the 9 records of `buf` into a wire record stream with the given markers
fn pack_records(buf: &LduBuffer, markers: &[u8; VOICE_PER_LDU], extra: usize) -> Vec<u8> {
    let mut raw = Vec::with_capacity(RAW_LDU_LEN + extra);
    for i in 0..VOICE_PER_LDU {
        let start = RECORD_OFFSETS_BUF[i];
        raw.push(markers[i]);
        raw.extend_from_slice(&buf[start + 1..start + RECORD_LENGTHS[i]]);
    }
    debug_assert_eq!(raw.len(), RAW_LDU_LEN);
    raw
}

/// Build an LDU1 record stream from a scratch buffer. `hdu` appends the HDU trailer.
pub fn encode_ldu1(buf: &LduBuffer, lc: &LinkControl, hdu: Option<&CryptoParams>) -> Vec<u8> {
    let mut work = *buf;

    let svc = RECORD_OFFSETS_BUF[LDU1_REC_SERVICE];
    work[svc + 1] = lc.lco;
    work[svc + 2] = lc.mfid;
    work[svc + 3] = lc.service_options;
    write_u24_be(&mut work, RECORD_OFFSETS_BUF[LDU1_REC_DST] + 1, lc.dst_id);
    write_u24_be(&mut work, RECORD_OFFSETS_BUF[LDU1_REC_SRC] + 1, lc.src_id);

    let extra = if hdu.is_some() { HDU_TRAILER_LEN } else { 0 };
    let mut raw = pack_records(&work, &LDU1_MARKERS, extra);

    if let Some(params) = hdu {
        raw.push(HDU_VALID);
        raw.push(params.alg_id);
        raw.extend_from_slice(&params.key_id.to_be_bytes());
        raw.extend_from_slice(params.mi.as_bytes());
    }
    raw
}

/// Build an LDU2 record stream from a scratch buffer, embedding `es` as encryption sync
pub fn encode_ldu2(buf: &LduBuffer, es: &CryptoParams) -> Vec<u8> {
    let mut work = *buf;

    for k in 0..3 {
        let off = RECORD_OFFSETS_BUF[LDU2_REC_ES_FIRST + k] + 1;
        work[off..off + ES_FRAGMENT_LEN].copy_from_slice(&es.mi.0[k * ES_FRAGMENT_LEN..(k + 1) * ES_FRAGMENT_LEN]);
    }
    let off = RECORD_OFFSETS_BUF[LDU2_REC_ALG_KEY] + 1;
    work[off] = es.alg_id;
    work[off + 1..off + 3].copy_from_slice(&es.key_id.to_be_bytes());

    pack_records(&work, &LDU2_MARKERS, 0)
}
