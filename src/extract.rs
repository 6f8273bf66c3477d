//! Path Extractor: outer block -> fragments -> inner tokens -> absolute sample paths.
//!
//! Политика выбора (см. [`MatchPolicy`]):
//! - `FirstPerFragment`: первый inner token, в котором нашёлся путь, и первое совпадение
//!   в нём; остальные токены фрагмента не декодируются.
//! - `AllMatches`: все совпадения всех токенов фрагмента.

use std::sync::OnceLock;

use log::debug;
use regex::{Match, Regex};
use serde::{Deserialize, Serialize};

use crate::codec::{latin1, Base64View, Codec};
use crate::config::{MatchPolicy, RelinkConfig};
use crate::consts::{AUDIO_EXTENSIONS, MIN_B64_LEN};
use crate::document::RplDocument;
use crate::fragment::split_fragments;
use crate::locate::PresetSpan;
use crate::metrics::{
    record_inner_token, record_outer_block, record_path_found, record_preset_scanned,
};
use crate::outer::decode_outer;

/// One row of the extraction table.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathRecord {
    #[serde(default)]
    pub preset: String,
    #[serde(default)]
    pub container: String,
    #[serde(default)]
    pub note: String,
    #[serde(default)]
    pub path: String,
}

/// Base64 run of length ≥ 20 inside decoded outer text.
pub fn inner_token_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(&format!("[A-Za-z0-9+/=]{{{},}}", MIN_B64_LEN)).expect("valid inner token regex")
    })
}

/// Абсолютный путь: корень (`/` или `X:\`, `X:/`), символы пути, `.ext`.
/// Байты 0x80..0xFF допускаются: так в view выглядят не-ASCII символы UTF-8.
pub fn path_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        let pattern = format!(
            r"(?i)(?:/|[a-z]:[\\/])[\w\- .,/\\()\[\]':&+#!~\x{{80}}-\x{{FF}}]+\.(?:{})",
            AUDIO_EXTENSIONS.join("|")
        );
        Regex::new(&pattern).expect("valid path regex")
    })
}

pub fn inner_tokens(fragment_text: &str) -> impl Iterator<Item = Match<'_>> {
    inner_token_re().find_iter(fragment_text)
}

/// NUL-терминатор обрезает путь.
fn clean_path(view: &str) -> String {
    let head = view.split('\0').next().unwrap_or_default();
    latin1::to_text(head)
}

/// Пути внутри декодированной полезной нагрузки (view), в читаемом виде.
pub fn paths_in_payload(payload: &str, policy: MatchPolicy) -> Vec<String> {
    match policy {
        MatchPolicy::FirstPerFragment => path_re()
            .find(payload)
            .map(|m| vec![clean_path(m.as_str())])
            .unwrap_or_default(),
        MatchPolicy::AllMatches => path_re()
            .find_iter(payload)
            .map(|m| clean_path(m.as_str()))
            .collect(),
    }
}

/// Пути одного фрагмента. Нераскодированные токены пропускаются.
pub fn find_paths<C: Codec>(fragment_text: &str, codec: &C, policy: MatchPolicy) -> Vec<String> {
    let mut out = Vec::new();
    for tok in inner_tokens(fragment_text) {
        let payload = match codec.decode(tok.as_str()) {
            Ok(p) => {
                record_inner_token(true);
                p
            }
            Err(e) => {
                record_inner_token(false);
                debug!("extract: skip inner token at {}: {}", tok.start(), e);
                continue;
            }
        };
        let found = paths_in_payload(&payload, policy);
        if found.is_empty() {
            continue;
        }
        out.extend(found);
        if policy == MatchPolicy::FirstPerFragment {
            break;
        }
    }
    out
}

/// Записи для одного внешнего блока (строки блока с терминаторами).
pub fn extract_outer_block<C: Codec>(
    preset: &str,
    block_lines: &[&str],
    codec: &C,
    cfg: &RelinkConfig,
) -> Vec<PathRecord> {
    let outer = match decode_outer(codec, block_lines) {
        Ok(d) => {
            record_outer_block(true);
            d.text
        }
        Err(e) => {
            record_outer_block(false);
            debug!(
                "extract: preset `{}`: outer candidate is not base64 ({}), treated as text",
                preset, e
            );
            return Vec::new();
        }
    };

    let mut records = Vec::new();
    for frag in split_fragments(&outer) {
        for path in find_paths(frag.text, codec, cfg.match_policy) {
            record_path_found();
            records.push(PathRecord {
                preset: preset.to_string(),
                container: frag.container.clone(),
                note: frag.note.clone(),
                path,
            });
        }
    }
    records
}

pub fn extract_span<C: Codec>(
    span: &PresetSpan,
    lines: &[&str],
    codec: &C,
    cfg: &RelinkConfig,
) -> Vec<PathRecord> {
    record_preset_scanned();
    span.blocks
        .iter()
        .flat_map(|b| extract_outer_block(&span.name, &lines[b.clone()], codec, cfg))
        .collect()
}

/// Все пути документа в порядке следования пресетов/блоков/фрагментов.
pub fn extract_document(doc: &RplDocument, cfg: &RelinkConfig) -> Vec<PathRecord> {
    let codec = Base64View::new();
    let lines = doc.lines();
    let records: Vec<PathRecord> = doc
        .presets()
        .iter()
        .flat_map(|span| extract_span(span, &lines, &codec, cfg))
        .collect();
    debug!("extract: {} path record(s)", records.len());
    records
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enc(bytes: &[u8]) -> String {
        Base64View::new().encode_bytes(bytes)
    }

    #[test]
    fn path_pattern_basics() {
        let p = MatchPolicy::FirstPerFragment;
        assert_eq!(
            paths_in_payload("\x01\x02/Users/a/Kick 01.WAV\0junk", p),
            vec!["/Users/a/Kick 01.WAV"]
        );
        assert_eq!(paths_in_payload("FILE /s/loop.aiff", p), vec!["/s/loop.aiff"]);
        assert_eq!(
            paths_in_payload(r"C:\Samples\(808)\hat.flac", p),
            vec![r"C:\Samples\(808)\hat.flac"]
        );
        assert!(paths_in_payload("/Users/a/readme.txt", p).is_empty());
        assert!(paths_in_payload("no path at all", p).is_empty());
    }

    #[test]
    fn non_ascii_path_is_reported_as_utf8() {
        let payload = latin1::from_utf8_text("\u{1}/Users/José/snare.wav\u{0}");
        assert_eq!(
            paths_in_payload(&payload, MatchPolicy::FirstPerFragment),
            vec!["/Users/José/snare.wav"]
        );
    }

    #[test]
    fn first_token_with_path_wins() {
        let codec = Base64View::new();
        let t0 = enc(b"no path in this token at all....");
        let t1 = enc(b"\x00\x00/kits/a/first.wav\x00");
        let t2 = enc(b"\x00\x00/kits/a/second.wav\x00");
        let frag = format!(" Container \"36: Kick\" {t0} FILE {t1} FILE {t2}");

        assert_eq!(
            find_paths(&frag, &codec, MatchPolicy::FirstPerFragment),
            vec!["/kits/a/first.wav"]
        );
        assert_eq!(
            find_paths(&frag, &codec, MatchPolicy::AllMatches),
            vec!["/kits/a/first.wav", "/kits/a/second.wav"]
        );
    }

    #[test]
    fn undecodable_tokens_are_skipped() {
        let codec = Base64View::new();
        let good = enc(b"....../x/y/z.ogg");
        let frag = format!("AAAAAAAAAAAAAAAAAAAAA {good}");
        assert_eq!(find_paths(&frag, &codec, MatchPolicy::FirstPerFragment), vec!["/x/y/z.ogg"]);
    }
}
