//! Block Locator: разбивка файла на пресеты и группировка base64-строк во внешние блоки.
//!
//! Явный конечный автомат по курсору строк:
//!
//! ```text
//!   Outside --<PRESET `x`--> InPreset --b64 line--> InOuterBlock
//!      ^                       |   ^                    |
//!      +-------- `>` ----------+   +---- other line ----+
//! ```
//!
//! `>` внутри InOuterBlock сначала закрывает блок, затем пресет. EOF закрывает всё
//! открытое (незакрытый пресет: не ошибка).
//!
//! Хвост блока: base64 переносится по фиксированной ширине, поэтому последняя строка
//! бывает короче 20 символов. Такая строка сразу после блока одинаковой ширины
//! включается в блок как хвост (см. [`crate::outer::decode_outer`]: откат без хвоста).

use std::ops::Range;
use std::sync::OnceLock;

use log::debug;
use regex::Regex;

use crate::consts::{is_b64_char, MIN_B64_LEN, PRESET_CLOSE, PRESET_OPEN_TAG};
use crate::codec::latin1;

/// One named top-level block of the backup file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PresetSpan {
    /// Имя пресета (UTF-8, либо Latin-1 символы, если байты не UTF-8).
    pub name: String,
    /// Индекс строки `<PRESET ...`.
    pub header: usize,
    /// Строки тела `(header, end)`, где `end` это строка `>` или конец файла.
    pub body: Range<usize>,
    /// Был ли найден закрывающий `>`.
    pub closed: bool,
    /// Кандидаты во внешние блоки (абсолютные индексы строк).
    pub blocks: Vec<Range<usize>>,
}

impl PresetSpan {
    /// Half-open `[start, end)`: от заголовка до закрывающей строки (не включая).
    pub fn start(&self) -> usize {
        self.header
    }

    pub fn end(&self) -> usize {
        self.body.end
    }

    /// Сырой текст тела пресета.
    pub fn text(&self, lines: &[&str]) -> String {
        lines[self.body.clone()].concat()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum State {
    Outside,
    InPreset,
    InOuterBlock {
        start: usize,
        /// Ширина первой строки блока.
        width: usize,
        /// Все строки блока пока одной ширины.
        uniform: bool,
    },
}

fn preset_open_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        let pattern = format!(r"^[ \t\x0B\x0C\r]*{} `([^`]+)`", regex::escape(PRESET_OPEN_TAG));
        Regex::new(&pattern).expect("valid preset marker regex")
    })
}

fn trim_ascii(line: &str) -> &str {
    line.trim_matches(|c: char| c.is_ascii_whitespace())
}

/// Имя пресета, если строка открывает пресет.
pub fn preset_open_name(line: &str) -> Option<String> {
    preset_open_re()
        .captures(line)
        .map(|c| latin1::to_text(&c[1]))
}

/// Строка состоит только из `>` (пробелы допускаются).
pub fn is_preset_close(line: &str) -> bool {
    trim_ascii(line) == PRESET_CLOSE
}

/// Trimmed length ≥ 20 and only `[A-Za-z0-9+/=]`.
pub fn is_b64_line(line: &str) -> bool {
    let t = trim_ascii(line);
    t.len() >= MIN_B64_LEN && t.chars().all(is_b64_char)
}

/// Короткая (1..20) строка только из base64-алфавита: кандидат в хвост блока.
pub fn is_b64_tail(line: &str) -> bool {
    let t = trim_ascii(line);
    !t.is_empty() && t.len() < MIN_B64_LEN && t.chars().all(is_b64_char)
}

fn leading_ws(line: &str) -> &str {
    let t = line.trim_start_matches(|c: char| c.is_ascii_whitespace() && c != '\n' && c != '\r');
    &line[..line.len() - t.len()]
}

fn b64_width(line: &str) -> usize {
    trim_ascii(line).len()
}

/// Строки с сохранением терминаторов (`\n` / `\r\n` остаются в строке).
pub fn split_lines(text: &str) -> Vec<&str> {
    text.split_inclusive('\n').collect()
}

/// Склеить trimmed-содержимое строк блока (вход для декодера).
pub fn joined_b64(lines: &[&str]) -> String {
    lines.iter().map(|l| trim_ascii(l)).collect()
}

struct Scanner {
    state: State,
    current: Option<PresetSpan>,
    spans: Vec<PresetSpan>,
    /// Режим "только тело": стартуем в InPreset и никогда не выходим наружу.
    body_only: bool,
    /// Отступ первой строки текущего блока.
    block_indent: String,
}

impl Scanner {
    fn new() -> Self {
        Self {
            state: State::Outside,
            current: None,
            spans: Vec::new(),
            body_only: false,
            block_indent: String::new(),
        }
    }

    fn body_only() -> Self {
        Self {
            state: State::InPreset,
            current: Some(PresetSpan {
                name: String::new(),
                header: 0,
                body: 0..0,
                closed: false,
                blocks: Vec::new(),
            }),
            spans: Vec::new(),
            body_only: true,
            block_indent: String::new(),
        }
    }

    fn close_block(&mut self, end: usize) {
        if let State::InOuterBlock { start, .. } = self.state {
            if let Some(span) = self.current.as_mut() {
                span.blocks.push(start..end);
            }
            self.state = State::InPreset;
        }
    }

    fn close_preset(&mut self, end: usize, closed: bool) {
        if let Some(mut span) = self.current.take() {
            span.body.end = end;
            span.closed = closed;
            self.spans.push(span);
        }
        self.state = State::Outside;
    }

    fn step(&mut self, idx: usize, line: &str) {
        match self.state {
            State::Outside => {
                if let Some(name) = preset_open_name(line) {
                    self.current = Some(PresetSpan {
                        name,
                        header: idx,
                        body: idx + 1..idx + 1,
                        closed: false,
                        blocks: Vec::new(),
                    });
                    self.state = State::InPreset;
                }
            }
            State::InPreset => {
                if !self.body_only && is_preset_close(line) {
                    self.close_preset(idx, true);
                } else if is_b64_line(line) {
                    self.block_indent = leading_ws(line).to_string();
                    self.state = State::InOuterBlock {
                        start: idx,
                        width: b64_width(line),
                        uniform: true,
                    };
                }
            }
            State::InOuterBlock { start, width, uniform } => {
                if is_b64_line(line) {
                    self.state = State::InOuterBlock {
                        start,
                        width,
                        uniform: uniform && b64_width(line) == width,
                    };
                    return;
                }
                // Хвост принимается только с отступом блока. Короткая base64-строка с
                // тем же отступом после полного блока неотличима от данных: она
                // декодируется вместе с блоком и при перезаписи перекодируется с ним.
                if uniform
                    && is_b64_tail(line)
                    && b64_width(line) < width
                    && leading_ws(line) == self.block_indent
                {
                    self.close_block(idx + 1);
                    return;
                }
                self.close_block(idx);
                if !self.body_only && is_preset_close(line) {
                    self.close_preset(idx, true);
                }
            }
        }
    }

    fn finish(mut self, n_lines: usize) -> Vec<PresetSpan> {
        self.close_block(n_lines);
        if self.current.is_some() {
            self.close_preset(n_lines, false);
        }
        self.spans
    }
}

/// Найти все пресеты файла по порядку.
pub fn locate_presets(lines: &[&str]) -> Vec<PresetSpan> {
    let mut sc = Scanner::new();
    for (i, line) in lines.iter().enumerate() {
        sc.step(i, line);
    }
    let spans = sc.finish(lines.len());
    for s in spans.iter().filter(|s| !s.closed) {
        debug!(
            "locate: preset `{}` at line {} has no closing marker, ends at EOF",
            s.name,
            s.header + 1
        );
    }
    spans
}

/// Группы base64-строк в произвольном тексте тела пресета (индексы относительно `lines`).
pub fn locate_outer_blocks(lines: &[&str]) -> Vec<Range<usize>> {
    let mut sc = Scanner::body_only();
    for (i, line) in lines.iter().enumerate() {
        sc.step(i, line);
    }
    sc.finish(lines.len())
        .into_iter()
        .next()
        .map(|s| s.blocks)
        .unwrap_or_default()
}
