use anyhow::Result;
use log::debug;
use serde::Serialize;
use std::path::PathBuf;

use RplRelink::config::MatchPolicy;
use RplRelink::extract::{extract_document, PathRecord};
use RplRelink::metrics::MetricsSnapshot;
use RplRelink::tables;
use RplRelink::RplDocument;

use super::util::{base_config, counters, print_json};

#[derive(Serialize)]
struct ExtractJson<'a> {
    input: &'a PathBuf,
    out: Option<&'a PathBuf>,
    records: &'a [PathRecord],
    metrics: MetricsSnapshot,
}

pub fn exec(input: PathBuf, out: Option<PathBuf>, all_matches: bool, json: bool) -> Result<()> {
    let mut cfg = base_config();
    if all_matches {
        cfg = cfg.with_match_policy(MatchPolicy::AllMatches);
    }
    debug!("extract: {}", cfg);

    let doc = RplDocument::read(&input)?;
    let records = extract_document(&doc, &cfg);

    if let Some(out_path) = &out {
        tables::write_records(out_path, &records)?;
    }

    if json {
        return print_json(&ExtractJson {
            input: &input,
            out: out.as_ref(),
            records: &records,
            metrics: counters(),
        });
    }

    match &out {
        Some(out_path) => println!("wrote {} rows to {}", records.len(), out_path.display()),
        None => tables::write_records_to(std::io::stdout().lock(), &records)?,
    }
    Ok(())
}
