use anyhow::Result;
use log::debug;
use std::path::PathBuf;

use RplRelink::config::{ContainerScope, DuplicatePolicy};
use RplRelink::inject::{inject_file, RuleSource};

use super::util::{base_config, ellipsize, print_json};

pub struct InjectArgs {
    pub input: PathBuf,
    pub replacements: Option<PathBuf>,
    pub revised: Option<PathBuf>,
    pub original: Option<PathBuf>,
    pub dry_run: bool,
    pub strict_container: bool,
    pub line_width: Option<usize>,
    pub keep_last: bool,
    pub json: bool,
}

pub fn exec(args: InjectArgs) -> Result<()> {
    // Источник правил проверяется до любого доступа к файлам.
    let source = RuleSource::select(args.replacements, args.revised, args.original)?;

    let mut cfg = base_config();
    if args.strict_container {
        cfg = cfg.with_container_scope(ContainerScope::Strict);
    }
    if let Some(w) = args.line_width {
        cfg = cfg.with_line_width(w);
    }
    if args.keep_last {
        cfg = cfg.with_duplicate_policy(DuplicatePolicy::KeepLast);
    }
    debug!("inject: {}", cfg);

    let rules = source.load(&args.input, &cfg)?;
    let summary = inject_file(&args.input, &rules, &cfg, args.dry_run)?;

    if args.json {
        return print_json(&summary);
    }

    for r in &summary.replacements {
        println!(
            "[{}] {} -> {} (x{}, token {}…)",
            r.preset,
            ellipsize(&r.old_path, 60),
            ellipsize(&r.new_path, 60),
            r.occurrences,
            r.token_prefix
        );
    }

    match (&summary.backup, summary.changed) {
        (Some(bak), _) => println!(
            "Applied replacements in {} preset(s); original backed up to {}",
            summary.presets_changed.len(),
            bak.display()
        ),
        (None, true) => println!(
            "Dry run: {} preset(s) would change, file not modified",
            summary.presets_changed.len()
        ),
        (None, false) => println!("No changes applied"),
    }
    Ok(())
}
