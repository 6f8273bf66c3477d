//! Fragment Splitter: декодированный внешний блок -> фрагменты контейнеров.
//!
//! Разделитель: литерал `<CONTAINER`. Метки берутся из заголовка
//! `Container "<note>: <name>"` (или `Container "<name>"`) во всех фрагментах,
//! кроме первого (он предшествует первому контейнеру).

use std::sync::OnceLock;

use regex::Regex;

use crate::codec::latin1;
use crate::consts::{CONTAINER_DELIM, CONTAINER_HEADER_WORD};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Fragment<'a> {
    pub index: usize,
    /// Текст фрагмента в байтовом view, без разделителя.
    pub text: &'a str,
    /// Полная метка из кавычек, например `36: Kick`; пусто, если заголовка нет.
    pub container: String,
    /// Часть метки до первого `:` (trimmed); пусто, если двоеточия нет.
    pub note: String,
}

fn header_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        let pattern = format!(r#"{} "([^"]+)""#, CONTAINER_HEADER_WORD);
        Regex::new(&pattern).expect("valid container header regex")
    })
}

/// `"36: Kick"` -> `"36"`; без двоеточия -> `""`.
pub fn note_of(container: &str) -> String {
    match container.split_once(':') {
        Some((note, _)) => note.trim().to_string(),
        None => String::new(),
    }
}

/// Метка контейнера из текста фрагмента (см. [`latin1::to_text`]).
pub fn container_label(fragment_text: &str) -> String {
    header_re()
        .captures(fragment_text)
        .map(|c| latin1::to_text(&c[1]))
        .unwrap_or_default()
}

pub fn split_fragments(outer_text: &str) -> Vec<Fragment<'_>> {
    outer_text
        .split(CONTAINER_DELIM)
        .enumerate()
        .map(|(index, text)| {
            let container = if index == 0 {
                String::new()
            } else {
                container_label(text)
            };
            let note = note_of(&container);
            Fragment {
                index,
                text,
                container,
                note,
            }
        })
        .collect()
}

/// Обратная операция к `split_fragments` (точная: split/join по одному литералу).
pub fn join_fragments<S: AsRef<str>>(parts: &[S]) -> String {
    let mut out = String::new();
    for (i, p) in parts.iter().enumerate() {
        if i > 0 {
            out.push_str(CONTAINER_DELIM);
        }
        out.push_str(p.as_ref());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_and_labels() {
        let outer = concat!(
            "HEAD Container \"ignored\"",
            "<CONTAINER Container \"36: Kick\" X",
            "<CONTAINER Container \"Snare\" Y",
            "<CONTAINER bare",
        );
        let frags = split_fragments(outer);
        assert_eq!(frags.len(), 4);

        assert_eq!(frags[0].container, "");
        assert_eq!(frags[0].note, "");

        assert_eq!(frags[1].container, "36: Kick");
        assert_eq!(frags[1].note, "36");

        assert_eq!(frags[2].container, "Snare");
        assert_eq!(frags[2].note, "");

        assert_eq!(frags[3].container, "");
        assert_eq!(frags[3].text, " bare");
    }

    #[test]
    fn join_is_exact_inverse() {
        let outer = "<CONTAINER a<CONTAINER<CONTAINER b<CONTAINER";
        let parts: Vec<&str> = split_fragments(outer).iter().map(|f| f.text).collect();
        assert_eq!(join_fragments(&parts), outer);
    }

    #[test]
    fn note_uses_first_colon() {
        assert_eq!(note_of(" 38 : Snare: Rim"), "38");
        assert_eq!(note_of("Hat"), "");
    }
}
