//! RplDocument: файл .RPL целиком в байтовом (Latin-1) view.
//!
//! Чтение/запись идут через view, поэтому любые байты (в т.ч. не-UTF-8)
//! переживают перезапись без изменений. Правки: это замены диапазонов строк.

use std::fs;
use std::ops::Range;
use std::path::Path;

use anyhow::{Context, Result};

use crate::codec::latin1;
use crate::locate::{locate_presets, split_lines, PresetSpan};

#[derive(Clone, Debug)]
pub struct RplDocument {
    text: String,
}

/// Замена строк `lines` новым текстом.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LineEdit {
    pub lines: Range<usize>,
    pub replacement: String,
}

impl RplDocument {
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            text: latin1::decode(bytes),
        }
    }

    /// Для тестов и текстовых фикстур (ASCII/UTF-8 → байты → view).
    pub fn from_text(text: &str) -> Self {
        Self::from_bytes(text.as_bytes())
    }

    pub fn read(path: &Path) -> Result<Self> {
        let bytes = fs::read(path).with_context(|| format!("read {}", path.display()))?;
        Ok(Self::from_bytes(&bytes))
    }

    pub fn lines(&self) -> Vec<&str> {
        split_lines(&self.text)
    }

    pub fn presets(&self) -> Vec<PresetSpan> {
        locate_presets(&self.lines())
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        latin1::encode(&self.text)
    }

    /// Новый документ с применёнными правками (правки не должны пересекаться).
    pub fn with_edits(&self, edits: &[LineEdit]) -> Self {
        Self {
            text: splice(&self.lines(), edits),
        }
    }
}

/// Собрать текст из строк, подставив `edits` вместо соответствующих диапазонов.
pub fn splice(lines: &[&str], edits: &[LineEdit]) -> String {
    let mut sorted: Vec<&LineEdit> = edits.iter().collect();
    sorted.sort_by_key(|e| e.lines.start);

    let mut out = String::with_capacity(lines.iter().map(|l| l.len()).sum::<usize>() + 64);
    let mut pos = 0usize;
    for e in sorted {
        if e.lines.start < pos {
            // пересечение пропускаем; блоки не пересекаются
            continue;
        }
        for l in &lines[pos..e.lines.start] {
            out.push_str(l);
        }
        out.push_str(&e.replacement);
        pos = e.lines.end;
    }
    for l in &lines[pos.min(lines.len())..] {
        out.push_str(l);
    }
    out
}
