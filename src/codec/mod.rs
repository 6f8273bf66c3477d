//! Codec layer: base64 <-> Latin-1 text view.
//!
//! Один и тот же `Codec` используется на обоих уровнях вложенности:
//! outer block (строки base64 в пресете) -> текст -> inner token -> текст -> путь.

pub mod latin1;
pub mod wrap;

use anyhow::{anyhow, Result};
use base64::alphabet;
use base64::engine::{GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;

pub use wrap::{format_block, LineLayout};

/// Decode/encode capability for one nesting level.
pub trait Codec {
    /// Encoded form -> byte-preserving text view.
    fn decode(&self, encoded: &str) -> Result<String>;
    /// Text view -> encoded form (single line, no wrapping).
    fn encode(&self, text: &str) -> String;
}

/// Standard-alphabet base64 over the Latin-1 view.
///
/// Decoding tolerates non-zero trailing bits (older writers emit them); encoding
/// is always canonical with `=` padding.
#[derive(Clone, Debug)]
pub struct Base64View {
    engine: GeneralPurpose,
}

impl Base64View {
    pub fn new() -> Self {
        let cfg = GeneralPurposeConfig::new().with_decode_allow_trailing_bits(true);
        Self {
            engine: GeneralPurpose::new(&alphabet::STANDARD, cfg),
        }
    }

    /// Raw bytes, без текстового view.
    pub fn decode_bytes(&self, encoded: &str) -> Result<Vec<u8>> {
        self.engine
            .decode(encoded.as_bytes())
            .map_err(|e| anyhow!("base64 decode: {}", e))
    }

    pub fn encode_bytes(&self, bytes: &[u8]) -> String {
        self.engine.encode(bytes)
    }
}

impl Default for Base64View {
    fn default() -> Self {
        Self::new()
    }
}

impl Codec for Base64View {
    fn decode(&self, encoded: &str) -> Result<String> {
        Ok(latin1::decode(&self.decode_bytes(encoded)?))
    }

    fn encode(&self, text: &str) -> String {
        self.encode_bytes(&latin1::encode(text))
    }
}
