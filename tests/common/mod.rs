//! Общие фикстуры для интеграционных тестов: сборка .RPL из пресетов,
//! контейнеров и inner-токенов.

#![allow(dead_code)] // не каждый тест использует все хелперы

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

pub fn unique_root(prefix: &str) -> PathBuf {
    let pid = std::process::id();
    let t = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let id = NEXT_ID.fetch_add(1, Ordering::Relaxed);
    let base = std::env::temp_dir();
    base.join(format!("rpltest-{prefix}-{pid}-{t}-{id}"))
}

/// Inner token: бинарный префикс + путь + NUL, как в состоянии плагина.
pub fn sample_token(path: &str) -> String {
    sample_token_bytes(path.as_bytes())
}

/// То же для путей, сохранённых не в UTF-8 (например Latin-1).
pub fn sample_token_bytes(path: &[u8]) -> String {
    let mut payload = vec![0x02, 0x00, 0x00, 0x00];
    payload.extend_from_slice(path);
    payload.push(0);
    STANDARD.encode(payload)
}

/// Фрагмент контейнера с заголовком и набором FILE-строк.
pub fn container(label: &str, tokens: &[String]) -> String {
    let mut s = format!(" Container \"{label}\" 1 0\nPARAMS 0.5 0.25\n");
    for t in tokens {
        s.push_str("FILE ");
        s.push_str(t);
        s.push('\n');
    }
    s.push_str(">\n");
    s
}

/// Декодированный текст outer-блока: заголовок + `<CONTAINER`-фрагменты.
pub fn outer_text(containers: &[String]) -> String {
    let mut s = String::from("RDM_STATE v2 kit\n");
    for c in containers {
        s.push_str("<CONTAINER");
        s.push_str(c);
    }
    s
}

/// Строки outer-блока: base64 с отступом, шириной и переводом строки.
pub fn outer_lines(outer: &str, indent: &str, width: usize, eol: &str) -> String {
    let enc = STANDARD.encode(outer.as_bytes());
    let mut out = String::new();
    for chunk in enc.as_bytes().chunks(width) {
        out.push_str(indent);
        out.push_str(std::str::from_utf8(chunk).unwrap());
        out.push_str(eol);
    }
    out
}

pub fn preset(name: &str, body: &str, eol: &str) -> String {
    format!("  <PRESET `{name}`{eol}    PRESET_META 1 0{eol}{body}  >{eol}")
}

pub fn library(presets: &[String], eol: &str) -> String {
    let mut s = format!("<REAPER_PRESET_LIBRARY `JS: ReaDrum Machine`{eol}");
    for p in presets {
        s.push_str(p);
    }
    s.push('>');
    s.push_str(eol);
    s
}

/// Типовой файл из двух пресетов: в `Kit2` лежит `kit2_path`.
pub fn two_kit_library(kit1_path: &str, kit2_path: &str) -> String {
    let k1 = outer_text(&[
        container("36: Kick", &[sample_token(kit1_path)]),
        container("38: Snare", &[sample_token("/Users/a/Samples/snare.aif")]),
    ]);
    let k2 = outer_text(&[container("42: Hat", &[sample_token(kit2_path)])]);
    library(
        &[
            preset("Kit1", &outer_lines(&k1, "    ", 128, "\n"), "\n"),
            preset("Kit2", &outer_lines(&k2, "    ", 128, "\n"), "\n"),
        ],
        "\n",
    )
}
