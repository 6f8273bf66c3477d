//! Inject pipeline: правила -> переписанный документ -> backup + запись.
//!
//! Источник правил выбирается до любого доступа к .RPL:
//! - таблица замен (`preset,container,old_path,new_path`), либо
//! - ревизия путей (`preset,container,note,path`) против исходного снапшота
//!   (CSV или свежее извлечение из самого файла).

use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use log::{info, warn};
use serde::Serialize;

use crate::backup::commit_with_backup;
use crate::codec::Base64View;
use crate::config::RelinkConfig;
use crate::diff::{build_rules_with_fallback, Snapshot};
use crate::document::RplDocument;
use crate::extract::extract_document;
use crate::replace::{rewrite_span, rules_for_preset, ReplacementRule, ReportEntry};
use crate::tables;

/// Where replacement rules come from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RuleSource {
    Table(PathBuf),
    Revised {
        revised: PathBuf,
        original: Option<PathBuf>,
    },
}

impl RuleSource {
    /// Mode selection. No source at all is the one fatal configuration error.
    pub fn select(
        replacements: Option<PathBuf>,
        revised: Option<PathBuf>,
        original: Option<PathBuf>,
    ) -> Result<Self> {
        match (replacements, revised) {
            (Some(table), rev) => {
                if rev.is_some() || original.is_some() {
                    warn!("inject: --replacements given, ignoring --revised/--original");
                }
                Ok(RuleSource::Table(table))
            }
            (None, Some(revised)) => Ok(RuleSource::Revised { revised, original }),
            (None, None) => bail!(
                "no replacement source: pass --replacements <csv> \
                 or --revised <csv> [--original <csv>]"
            ),
        }
    }

    /// Загрузить правила; `input` нужен только для fallback-извлечения.
    pub fn load(&self, input: &Path, cfg: &RelinkConfig) -> Result<Vec<ReplacementRule>> {
        match self {
            RuleSource::Table(p) => tables::read_rules(p),
            RuleSource::Revised { revised, original } => {
                let policy = cfg.duplicate_policy;
                let revised = Snapshot::from_records(&tables::read_records(revised)?, policy);
                let original = match original {
                    Some(p) => Some(Snapshot::from_records(&tables::read_records(p)?, policy)),
                    None => None,
                };
                build_rules_with_fallback(original, &revised, || {
                    let doc = RplDocument::read(input)?;
                    Ok(Snapshot::from_records(&extract_document(&doc, cfg), cfg.duplicate_policy))
                })
            }
        }
    }
}

/// Результат применения правил к документу в памяти.
#[derive(Clone, Debug)]
pub struct InjectOutcome {
    /// `None`: ничего не изменилось.
    pub document: Option<RplDocument>,
    pub presets_changed: Vec<String>,
    pub report: Vec<ReportEntry>,
}

#[derive(Clone, Debug, Serialize)]
pub struct InjectSummary {
    pub input: PathBuf,
    pub changed: bool,
    pub dry_run: bool,
    pub backup: Option<PathBuf>,
    pub presets_changed: Vec<String>,
    pub replacements: Vec<ReportEntry>,
}

/// Apply rules preset by preset; only changed outer blocks are re-emitted.
pub fn apply_rules(
    doc: &RplDocument,
    rules: &[ReplacementRule],
    cfg: &RelinkConfig,
) -> InjectOutcome {
    let codec = Base64View::new();
    let lines = doc.lines();
    let mut edits = Vec::new();
    let mut report = Vec::new();
    let mut presets_changed = Vec::new();

    for span in doc.presets() {
        let scoped = rules_for_preset(rules, &span.name);
        if scoped.is_empty() {
            continue;
        }
        let (e, r) = rewrite_span(&span, &lines, &scoped, &codec, cfg);
        if !e.is_empty() {
            presets_changed.push(span.name.clone());
            edits.extend(e);
        }
        report.extend(r);
    }

    let document = if edits.is_empty() {
        None
    } else {
        Some(doc.with_edits(&edits))
    };
    InjectOutcome {
        document,
        presets_changed,
        report,
    }
}

/// Прочитать файл, применить правила, при изменениях: backup + запись.
/// Без изменений (или в dry-run) файл не трогается.
pub fn inject_file(
    input: &Path,
    rules: &[ReplacementRule],
    cfg: &RelinkConfig,
    dry_run: bool,
) -> Result<InjectSummary> {
    let doc = RplDocument::read(input)?;
    let outcome = apply_rules(&doc, rules, cfg);

    let changed = outcome.document.is_some();
    let backup = match (&outcome.document, dry_run) {
        (Some(new_doc), false) => Some(commit_with_backup(
            input,
            &new_doc.to_bytes(),
            &cfg.backup_suffix,
        )?),
        (Some(_), true) => {
            info!("inject: dry run, {} not modified", input.display());
            None
        }
        (None, _) => {
            info!("inject: no changes applied to {}", input.display());
            None
        }
    };

    Ok(InjectSummary {
        input: input.to_path_buf(),
        changed,
        dry_run,
        backup,
        presets_changed: outcome.presets_changed,
        replacements: outcome.report,
    })
}
