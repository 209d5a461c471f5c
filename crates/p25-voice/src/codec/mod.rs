//! Codeword codec adapter: presents the external IMBE vocoder as a typed, length-checked
//! PCM <-> codeword conversion. Owns no protocol state.

use p25_core::{Codeword, IMBE_SAMPLES};

/// External IMBE vocoder
pub trait Vocoder: Send {
    /// Encode exactly one codeword worth of PCM
    fn encode(&mut self, pcm: &[i16; IMBE_SAMPLES]) -> Codeword;

    /// Decode a codeword, returning the samples and the number of bit errors corrected/detected
    fn decode(&mut self, codeword: &Codeword) -> ([i16; IMBE_SAMPLES], u32);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodecErr {
    SampleLength { expected: usize, found: usize },
}

impl std::fmt::Display for CodecErr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SampleLength { expected, found } => write!(f, "PCM chunk of {} samples, expected {}", found, expected),
        }
    }
}

impl std::error::Error for CodecErr {}

/// Samples recovered from one codeword
#[derive(Debug, Clone)]
pub struct DecodedCodeword {
    pub samples: [i16; IMBE_SAMPLES],
    pub errors: u32,
}

pub struct CodewordCodec<V: Vocoder> {
    vocoder: V,
}

impl<V: Vocoder> CodewordCodec<V> {
    pub fn new(vocoder: V) -> Self {
        Self { vocoder }
    }

    /// Encode a PCM chunk. The chunk must hold exactly `IMBE_SAMPLES` samples.
    pub fn encode(&mut self, pcm: &[i16]) -> Result<Codeword, CodecErr> {
        let chunk: &[i16; IMBE_SAMPLES] = pcm.try_into().map_err(|_| CodecErr::SampleLength {
            expected: IMBE_SAMPLES,
            found: pcm.len(),
        })?;
        Ok(self.vocoder.encode(chunk))
    }

    pub fn decode(&mut self, codeword: &Codeword) -> DecodedCodeword {
        let (samples, errors) = self.vocoder.decode(codeword);
        DecodedCodeword { samples, errors }
    }
}
