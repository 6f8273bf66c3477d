//! Replacement Engine: переписывание путей внутри inner-токенов с точным
//! сохранением всего остального текста пресета.
//!
//! Порядок работы для одного внешнего блока:
//! 1. decode outer -> split на фрагменты;
//! 2. для каждого фрагмента: правила по области контейнера, decode каждого
//!    inner token, замена всех вхождений `old_path`;
//! 3. изменённый токен кодируется заново и подставляется на место каждого
//!    *целого* вхождения того же токена во фрагменте;
//! 4. если хоть что-то изменилось: outer кодируется заново и форматируется
//!    по [`LineLayout`] исходного блока. Неизменённые блоки не трогаются вовсе.

use std::collections::HashMap;
use std::ops::Range;

use log::{debug, info};
use regex::Captures;
use serde::{Deserialize, Serialize};

use crate::codec::{latin1, Base64View, Codec};
use crate::config::{ContainerScope, RelinkConfig};
use crate::consts::TOKEN_PREFIX_LEN;
use crate::document::LineEdit;
use crate::extract::inner_token_re;
use crate::fragment::{join_fragments, split_fragments, Fragment};
use crate::locate::{locate_outer_blocks, split_lines, PresetSpan};
use crate::metrics::{
    record_block_reencoded, record_inner_token, record_outer_block, record_token_rewritten,
};
use crate::outer::{decode_outer, encode_outer};

/// One row of the replacement table. Empty `preset` / `container` match anything.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReplacementRule {
    #[serde(default)]
    pub preset: String,
    #[serde(default)]
    pub container: String,
    #[serde(default)]
    pub old_path: String,
    #[serde(default)]
    pub new_path: String,
}

impl ReplacementRule {
    pub fn new(preset: &str, container: &str, old_path: &str, new_path: &str) -> Self {
        Self {
            preset: preset.to_string(),
            container: container.to_string(),
            old_path: old_path.to_string(),
            new_path: new_path.to_string(),
        }
    }

    pub fn applies_to_preset(&self, preset: &str) -> bool {
        self.preset.is_empty() || self.preset == preset
    }

    pub fn applies_to_container(&self, container: &str, scope: ContainerScope) -> bool {
        match scope {
            ContainerScope::AnyContainer => true,
            ContainerScope::Strict => self.container.is_empty() || self.container == container,
        }
    }
}

/// Что и где заменено.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ReportEntry {
    pub preset: String,
    pub container: String,
    pub old_path: String,
    pub new_path: String,
    pub occurrences: usize,
    /// Начало исходного inner token (для диагностики).
    pub token_prefix: String,
}

/// Результат переписывания тела одного пресета.
#[derive(Clone, Debug)]
pub struct SpanRewrite {
    pub text: String,
    pub changed: bool,
    pub report: Vec<ReportEntry>,
}

/// Правило, заранее переведённое в байтовый view.
struct PreparedRule<'a> {
    rule: &'a ReplacementRule,
    /// `(old, new)` в view: UTF-8 форма и, если отличается, Latin-1 форма.
    forms: Vec<(String, String)>,
}

/// Новый путь в той же форме, в которой нашёлся старый. Символы вне
/// Latin-1 пишутся как UTF-8 байты.
fn new_form(new_path: &str, latin1_form: bool) -> String {
    if latin1_form && new_path.chars().all(|c| (c as u32) <= 0xFF) {
        new_path.to_string()
    } else {
        latin1::from_utf8_text(new_path)
    }
}

fn prepare<'a>(rules: &[&'a ReplacementRule]) -> Vec<PreparedRule<'a>> {
    rules
        .iter()
        .filter(|r| !r.old_path.is_empty() && r.old_path != r.new_path)
        .map(|r| PreparedRule {
            rule: r,
            forms: latin1::match_forms(&r.old_path)
                .into_iter()
                .enumerate()
                .map(|(i, old)| (old, new_form(&r.new_path, i > 0)))
                .collect(),
        })
        .collect()
}

/// Rules whose `preset` is empty or equals `preset`.
pub fn rules_for_preset<'a>(
    rules: &'a [ReplacementRule],
    preset: &str,
) -> Vec<&'a ReplacementRule> {
    rules.iter().filter(|r| r.applies_to_preset(preset)).collect()
}

fn token_prefix(token: &str) -> String {
    token.chars().take(TOKEN_PREFIX_LEN).collect()
}

/// Decode one inner token and apply rules; `Some(new_token)` when anything changed.
fn rewrite_token<C: Codec>(
    token: &str,
    rules: &[&PreparedRule<'_>],
    codec: &C,
    preset: &str,
    container: &str,
    report: &mut Vec<ReportEntry>,
) -> Option<String> {
    let mut payload = match codec.decode(token) {
        Ok(p) => {
            record_inner_token(true);
            p
        }
        Err(e) => {
            record_inner_token(false);
            debug!("replace: skip inner token {}…: {}", token_prefix(token), e);
            return None;
        }
    };

    let mut total = 0usize;
    for pr in rules {
        let mut n = 0usize;
        for (old, new) in &pr.forms {
            let k = payload.matches(old.as_str()).count();
            if k > 0 {
                payload = payload.replace(old.as_str(), new);
                n += k;
            }
        }
        if n == 0 {
            continue;
        }
        total += n;
        report.push(ReportEntry {
            preset: preset.to_string(),
            container: container.to_string(),
            old_path: pr.rule.old_path.clone(),
            new_path: pr.rule.new_path.clone(),
            occurrences: n,
            token_prefix: token_prefix(token),
        });
    }

    if total == 0 {
        return None;
    }
    record_token_rewritten(total);
    Some(codec.encode(&payload))
}

/// Переписать один фрагмент. Все целые вхождения одного и того же токена
/// получают одну и ту же новую строку (токен декодируется один раз).
fn rewrite_fragment<C: Codec>(
    preset: &str,
    frag: &Fragment<'_>,
    rules: &[&PreparedRule<'_>],
    codec: &C,
    report: &mut Vec<ReportEntry>,
) -> Option<String> {
    let mut done: HashMap<String, Option<String>> = HashMap::new();
    let mut changed = false;

    let text = inner_token_re().replace_all(frag.text, |caps: &Captures<'_>| {
        let tok = &caps[0];
        if let Some(prev) = done.get(tok) {
            return prev.clone().unwrap_or_else(|| tok.to_string());
        }
        let res = rewrite_token(tok, rules, codec, preset, &frag.container, report);
        changed |= res.is_some();
        let out = res.clone().unwrap_or_else(|| tok.to_string());
        done.insert(tok.to_string(), res);
        out
    });

    if changed {
        Some(text.into_owned())
    } else {
        None
    }
}

/// Переписать один внешний блок; `None`: блок не изменился (или не декодируется).
/// `Some((used, text))`: `text` заменяет первые `used` строк блока.
fn rewrite_outer_block<C: Codec>(
    preset: &str,
    block_lines: &[&str],
    rules: &[PreparedRule<'_>],
    codec: &C,
    cfg: &RelinkConfig,
    report: &mut Vec<ReportEntry>,
) -> Option<(usize, String)> {
    let (outer, used) = match decode_outer(codec, block_lines) {
        Ok(d) => {
            record_outer_block(true);
            (d.text, d.used)
        }
        Err(e) => {
            record_outer_block(false);
            debug!("replace: preset `{}`: outer candidate skipped ({})", preset, e);
            return None;
        }
    };

    let frags = split_fragments(&outer);
    let mut parts: Vec<String> = Vec::with_capacity(frags.len());
    let mut changed = false;
    for frag in &frags {
        let scoped: Vec<&PreparedRule<'_>> = rules
            .iter()
            .filter(|pr| pr.rule.applies_to_container(&frag.container, cfg.container_scope))
            .collect();
        let rewritten = if scoped.is_empty() {
            None
        } else {
            rewrite_fragment(preset, frag, &scoped, codec, report)
        };
        match rewritten {
            Some(t) => {
                changed = true;
                parts.push(t);
            }
            None => parts.push(frag.text.to_string()),
        }
    }

    if !changed {
        return None;
    }

    record_block_reencoded();
    Some((used, encode_outer(codec, &join_fragments(&parts), &block_lines[..used], cfg)))
}

/// Правки строк для набора внешних блоков (индексы: в `lines`).
pub fn rewrite_blocks<C: Codec>(
    preset: &str,
    lines: &[&str],
    blocks: &[Range<usize>],
    rules: &[&ReplacementRule],
    codec: &C,
    cfg: &RelinkConfig,
) -> (Vec<LineEdit>, Vec<ReportEntry>) {
    let prepared = prepare(rules);
    let mut edits = Vec::new();
    let mut report = Vec::new();
    if prepared.is_empty() {
        return (edits, report);
    }
    for b in blocks {
        if let Some((used, text)) =
            rewrite_outer_block(preset, &lines[b.clone()], &prepared, codec, cfg, &mut report)
        {
            edits.push(LineEdit {
                lines: b.start..b.start + used,
                replacement: text,
            });
        }
    }
    (edits, report)
}

/// Переписать пресет документа (правила уже отфильтрованы по пресету).
pub fn rewrite_span<C: Codec>(
    span: &PresetSpan,
    lines: &[&str],
    rules: &[&ReplacementRule],
    codec: &C,
    cfg: &RelinkConfig,
) -> (Vec<LineEdit>, Vec<ReportEntry>) {
    let (edits, report) = rewrite_blocks(&span.name, lines, &span.blocks, rules, codec, cfg);
    if !edits.is_empty() {
        info!(
            "replace: preset `{}`: {} block(s) rewritten, {} replacement(s)",
            span.name,
            edits.len(),
            report.len()
        );
    }
    (edits, report)
}

/// Text-level entry point: тело пресета (как текст) -> новый текст.
pub fn rewrite_span_text(
    preset: &str,
    span_text: &str,
    rules: &[&ReplacementRule],
    cfg: &RelinkConfig,
) -> SpanRewrite {
    let codec = Base64View::new();
    let lines = split_lines(span_text);
    let blocks = locate_outer_blocks(&lines);
    let (edits, report) = rewrite_blocks(preset, &lines, &blocks, rules, &codec, cfg);
    if edits.is_empty() {
        return SpanRewrite {
            text: span_text.to_string(),
            changed: false,
            report,
        };
    }
    SpanRewrite {
        text: crate::document::splice(&lines, &edits),
        changed: true,
        report,
    }
}
