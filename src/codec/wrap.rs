//! Форматирование перекодированного внешнего блока: фиксированная ширина,
//! исходный отступ и исходный перевод строки.

use crate::config::RelinkConfig;
use crate::consts::MIN_B64_LEN;

/// Как раскладывать base64 по строкам при записи блока обратно.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LineLayout {
    pub indent: String,
    pub width: usize,
    /// `"\n"` или `"\r\n"`: берётся с первой строки исходного блока.
    pub line_ending: String,
    /// Была ли последняя строка исходного блока завершена переводом строки.
    pub trailing_newline: bool,
}

impl LineLayout {
    /// Layout recovered from the original block lines (terminators included).
    pub fn from_original(lines: &[&str], cfg: &RelinkConfig) -> Self {
        let first = lines.first().copied().unwrap_or("");
        let indent = match lines.first() {
            Some(l) => l
                .chars()
                .take_while(|c| c.is_ascii_whitespace() && *c != '\n' && *c != '\r')
                .collect(),
            None => cfg.default_indent.clone(),
        };
        let line_ending = if first.ends_with("\r\n") {
            "\r\n".to_string()
        } else {
            "\n".to_string()
        };
        let trailing_newline = lines.last().map(|l| l.ends_with('\n')).unwrap_or(true);

        let width = if cfg.line_width > 0 {
            cfg.line_width
        } else {
            // 0 = сохранить ширину первой строки исходного блока
            let w = first.trim_matches(|c: char| c.is_ascii_whitespace()).len();
            if w >= MIN_B64_LEN {
                w
            } else {
                crate::consts::DEFAULT_LINE_WIDTH
            }
        };

        Self {
            indent,
            width,
            line_ending,
            trailing_newline,
        }
    }
}

/// Разбить base64 на строки `layout.width`, каждая с отступом и переводом строки.
pub fn format_block(b64: &str, layout: &LineLayout) -> String {
    if b64.is_empty() {
        return String::new();
    }
    let width = layout.width.max(1);
    let per_line = layout.indent.len() + 2;
    let mut out = String::with_capacity(b64.len() + b64.len() / width * per_line + 8);
    let bytes = b64.as_bytes();
    let chunks = bytes.len().div_ceil(width);
    for (i, chunk) in bytes.chunks(width).enumerate() {
        out.push_str(&layout.indent);
        // base64: чистый ASCII, границы чанков всегда на границах char
        out.push_str(std::str::from_utf8(chunk).unwrap_or_default());
        if i + 1 < chunks || layout.trailing_newline {
            out.push_str(&layout.line_ending);
        }
    }
    out
}
