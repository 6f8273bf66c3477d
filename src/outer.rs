//! Outer blocks: декодирование группы base64-строк и запись обратно.
//!
//! Инвариант: блок, в котором ничего не поменялось, в файл не пишется вовсе:
//! перекодирование происходит только после изменения inner-токена.

use anyhow::Result;
use log::debug;

use crate::codec::{format_block, Codec, LineLayout};
use crate::config::RelinkConfig;
use crate::locate::{is_b64_line, joined_b64};

/// Decoded outer block text and the number of block lines it was decoded from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodedOuter {
    pub text: String,
    /// Может быть на одну строку меньше длины группы, если хвост оказался не данными.
    pub used: usize,
}

/// Декодировать группу строк; при ошибке и коротком хвосте: повтор без хвоста.
pub fn decode_outer<C: Codec>(codec: &C, lines: &[&str]) -> Result<DecodedOuter> {
    match codec.decode(&joined_b64(lines)) {
        Ok(text) => Ok(DecodedOuter {
            text,
            used: lines.len(),
        }),
        Err(e) => {
            let n = lines.len();
            if n > 1 && !is_b64_line(lines[n - 1]) {
                debug!("outer: retry without short tail line ({})", e);
                let text = codec.decode(&joined_b64(&lines[..n - 1]))?;
                return Ok(DecodedOuter { text, used: n - 1 });
            }
            Err(e)
        }
    }
}

/// Закодировать текст блока и разложить по строкам с layout исходных строк.
pub fn encode_outer<C: Codec>(
    codec: &C,
    text: &str,
    original_lines: &[&str],
    cfg: &RelinkConfig,
) -> String {
    let layout = LineLayout::from_original(original_lines, cfg);
    format_block(&codec.encode(text), &layout)
}
