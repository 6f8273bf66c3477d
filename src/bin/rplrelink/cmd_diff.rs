use anyhow::Result;
use serde::Serialize;
use std::path::PathBuf;

use RplRelink::config::DuplicatePolicy;
use RplRelink::diff::{build_rules, compare, DiffReport, Snapshot};
use RplRelink::replace::ReplacementRule;
use RplRelink::tables;

use super::util::{base_config, ellipsize, print_json};

#[derive(Serialize)]
struct DiffJson<'a> {
    out: &'a PathBuf,
    rules: &'a [ReplacementRule],
    report: Option<DiffReport>,
}

pub fn exec(
    original: PathBuf,
    revised: PathBuf,
    out: PathBuf,
    report: bool,
    keep_last: bool,
    json: bool,
) -> Result<()> {
    let mut cfg = base_config();
    if keep_last {
        cfg = cfg.with_duplicate_policy(DuplicatePolicy::KeepLast);
    }
    let orig = Snapshot::from_records(&tables::read_records(&original)?, cfg.duplicate_policy);
    let rev = Snapshot::from_records(&tables::read_records(&revised)?, cfg.duplicate_policy);

    let rules = build_rules(&orig, &rev);
    tables::write_rules(&out, &rules)?;

    let rep = if report { Some(compare(&orig, &rev)) } else { None };

    if json {
        return print_json(&DiffJson {
            out: &out,
            rules: &rules,
            report: rep,
        });
    }

    if rules.is_empty() {
        println!("No differing paths found between the tables");
    } else {
        println!("Wrote {} replacements to {}", rules.len(), out.display());
    }

    if let Some(rep) = rep {
        println!(
            "changed={} unchanged={} only_original={} only_revised={}",
            rep.changed.len(),
            rep.unchanged,
            rep.only_original.len(),
            rep.only_revised.len()
        );
        for c in &rep.changed {
            println!(
                "  ~ [{} | {}] {} -> {}",
                c.key.preset,
                c.key.container,
                ellipsize(&c.old_path, 60),
                ellipsize(&c.new_path, 60)
            );
        }
        for k in &rep.only_original {
            println!("  - [{} | {}]", k.preset, k.container);
        }
        for k in &rep.only_revised {
            println!("  + [{} | {}]", k.preset, k.container);
        }
    }
    Ok(())
}
