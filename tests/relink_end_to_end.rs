// tests/relink_end_to_end.rs
//
// Запуск только этого файла:
//   cargo test --test relink_end_to_end -- --nocapture
//
// Покрываем:
// 1) Два пресета, старый путь только в Kit2: Kit1 байт-в-байт не меняется,
//    блок Kit2 переписан и перенесён по 76 символов, бэкап = исходный файл.
// 2) Повторный прогон той же таблицы: "no changes", файл не трогается.
// 3) Dry run и "нет совпадений": файл и бэкап не создаются/не меняются.
// 4) Путь в Latin-1 (байт 0xE9) проходит extract -> CSV -> inject.
// 5) Ошибка при переименовании в бэкап фатальна, исходник остаётся на месте.

mod common;

use std::fs;

use anyhow::Result;

use RplRelink::tables::{read_records, write_records};
use RplRelink::{
    extract_document, inject_file, RelinkConfig, ReplacementRule, RplDocument, RuleSource,
};

use common::{
    container, library, outer_lines, outer_text, preset, sample_token_bytes, two_kit_library,
    unique_root,
};

const OLD: &str = "/Users/a/Samples/hat.wav";
const NEW: &str = "/Volumes/Lib/Samples/hat.wav";

#[test]
fn only_matching_preset_is_rewritten() -> Result<()> {
    let root = unique_root("e2e");
    fs::create_dir_all(&root)?;
    let rpl = root.join("20251207.RPL");
    let original = two_kit_library("/Users/a/Samples/kick.wav", OLD);
    fs::write(&rpl, &original)?;

    let cfg = RelinkConfig::default();
    let rules = vec![ReplacementRule::new("", "", OLD, NEW)];
    let summary = inject_file(&rpl, &rules, &cfg, false)?;

    assert!(summary.changed);
    assert_eq!(summary.presets_changed, vec!["Kit2".to_string()]);
    assert_eq!(summary.replacements.len(), 1);
    assert_eq!(summary.replacements[0].occurrences, 1);
    assert_eq!(summary.replacements[0].container, "42: Hat");

    // бэкап: точная копия исходника
    let bak = summary.backup.clone().expect("backup path");
    assert_eq!(bak, root.join("20251207.RPL.bak"));
    assert_eq!(fs::read(&bak)?, original.as_bytes());

    let before = RplDocument::from_text(&original);
    let after = RplDocument::read(&rpl)?;
    let (lb, la) = (before.lines(), after.lines());
    let (pb, pa) = (before.presets(), after.presets());
    assert_eq!(pb.len(), 2);
    assert_eq!(pa.len(), 2);

    // Kit1 не тронут
    assert_eq!(pb[0].text(&lb), pa[0].text(&la));
    // всё до блока Kit2: тоже
    let k2_block_before = pb[1].blocks[0].clone();
    let k2_block_after = pa[1].blocks[0].clone();
    assert_eq!(k2_block_before.start, k2_block_after.start);
    assert_eq!(lb[..k2_block_before.start], la[..k2_block_after.start]);
    // и всё после
    assert_eq!(lb[k2_block_before.end..], la[k2_block_after.end..]);

    // блок Kit2 перенесён по 76 с исходным отступом
    let block = &la[k2_block_after.clone()];
    assert!(block.len() >= 2);
    for l in &block[..block.len() - 1] {
        assert_eq!(l.len(), 4 + 76 + 1, "line {:?}", l);
        assert!(l.starts_with("    "));
        assert!(l.ends_with('\n'));
    }
    let last = block[block.len() - 1];
    assert!(last.starts_with("    ") && last.len() <= 4 + 76 + 1);

    // извлечение видит новый путь в Kit2 и старые в Kit1
    let recs = extract_document(&after, &cfg);
    let paths: Vec<(&str, &str)> = recs
        .iter()
        .map(|r| (r.preset.as_str(), r.path.as_str()))
        .collect();
    assert_eq!(
        paths,
        vec![
            ("Kit1", "/Users/a/Samples/kick.wav"),
            ("Kit1", "/Users/a/Samples/snare.aif"),
            ("Kit2", NEW),
        ]
    );
    Ok(())
}

#[test]
fn second_run_reports_no_changes() -> Result<()> {
    let root = unique_root("idem");
    fs::create_dir_all(&root)?;
    let rpl = root.join("kit.RPL");
    fs::write(&rpl, two_kit_library("/k.wav", OLD))?;

    let cfg = RelinkConfig::default();
    let rules = vec![ReplacementRule::new("Kit2", "42: Hat", OLD, NEW)];
    assert!(inject_file(&rpl, &rules, &cfg, false)?.changed);

    let rewritten = fs::read(&rpl)?;
    let bak_bytes = fs::read(root.join("kit.RPL.bak"))?;

    let again = inject_file(&rpl, &rules, &cfg, false)?;
    assert!(!again.changed);
    assert!(again.backup.is_none());
    assert!(again.replacements.is_empty());
    assert_eq!(fs::read(&rpl)?, rewritten);
    // бэкап первого прогона не перезаписан
    assert_eq!(fs::read(root.join("kit.RPL.bak"))?, bak_bytes);
    Ok(())
}

#[test]
fn dry_run_and_no_match_leave_file_alone() -> Result<()> {
    let root = unique_root("dry");
    fs::create_dir_all(&root)?;
    let rpl = root.join("kit.RPL");
    let original = two_kit_library("/k.wav", OLD);
    fs::write(&rpl, &original)?;
    let cfg = RelinkConfig::default();

    let dry = inject_file(&rpl, &[ReplacementRule::new("", "", OLD, NEW)], &cfg, true)?;
    assert!(dry.changed);
    assert!(dry.dry_run);
    assert!(dry.backup.is_none());
    assert_eq!(fs::read(&rpl)?, original.as_bytes());

    let none = inject_file(&rpl, &[ReplacementRule::new("", "", "/absent.wav", NEW)], &cfg, false)?;
    assert!(!none.changed);
    assert_eq!(fs::read(&rpl)?, original.as_bytes());
    assert!(!root.join("kit.RPL.bak").exists());
    Ok(())
}

#[test]
fn preset_scoped_rule_skips_other_presets() -> Result<()> {
    let root = unique_root("scoped");
    fs::create_dir_all(&root)?;
    let rpl = root.join("kit.RPL");
    // один и тот же путь в обоих пресетах
    let original = two_kit_library(OLD, OLD);
    fs::write(&rpl, &original)?;

    let cfg = RelinkConfig::default();
    let summary = inject_file(&rpl, &[ReplacementRule::new("Kit1", "", OLD, NEW)], &cfg, false)?;
    assert_eq!(summary.presets_changed, vec!["Kit1".to_string()]);

    let after = RplDocument::read(&rpl)?;
    let recs = extract_document(&after, &cfg);
    let kit1_hat: Vec<&str> = recs
        .iter()
        .filter(|r| r.container == "36: Kick")
        .map(|r| r.path.as_str())
        .collect();
    assert_eq!(kit1_hat, vec![NEW]);
    let kit2: Vec<&str> = recs
        .iter()
        .filter(|r| r.preset == "Kit2")
        .map(|r| r.path.as_str())
        .collect();
    assert_eq!(kit2, vec![OLD]);
    Ok(())
}

#[test]
fn latin1_path_relinks_through_table() -> Result<()> {
    let root = unique_root("latin1");
    fs::create_dir_all(&root)?;
    let rpl = root.join("kit.RPL");
    let token = sample_token_bytes(b"/Users/a/Caf\xe9/kick.wav");
    let outer = outer_text(&[container("36: Kick", &[token])]);
    let body = outer_lines(&outer, "    ", 128, "\n");
    fs::write(&rpl, library(&[preset("Kit", &body, "\n")], "\n"))?;
    let cfg = RelinkConfig::default();

    let recs = extract_document(&RplDocument::read(&rpl)?, &cfg);
    assert_eq!(recs.len(), 1);
    assert_eq!(recs[0].path, "/Users/a/Caf\u{e9}/kick.wav");
    assert!(!recs[0].path.contains('\u{FFFD}'));

    // через CSV и обратно, как при ручной правке таблицы
    let orig_csv = root.join("orig.csv");
    let rev_csv = root.join("rev.csv");
    write_records(&orig_csv, &recs)?;
    let mut revised = read_records(&orig_csv)?;
    revised[0].path = revised[0].path.replace("/Users/a/", "/Volumes/Lib/");
    write_records(&rev_csv, &revised)?;

    let rules = RuleSource::select(None, Some(rev_csv), Some(orig_csv))?.load(&rpl, &cfg)?;
    assert_eq!(rules.len(), 1);
    let summary = inject_file(&rpl, &rules, &cfg, false)?;
    assert!(summary.changed);

    let after = extract_document(&RplDocument::read(&rpl)?, &cfg);
    assert_eq!(after[0].path, "/Volumes/Lib/Caf\u{e9}/kick.wav");
    Ok(())
}

#[test]
fn failed_backup_rename_is_fatal_and_keeps_original() -> Result<()> {
    let root = unique_root("bakfail");
    fs::create_dir_all(&root)?;
    let rpl = root.join("kit.RPL");
    let original = two_kit_library("/k.wav", OLD);
    fs::write(&rpl, &original)?;
    // на месте бэкапа непустой каталог: rename файла поверх него не пройдёт
    let bak_dir = root.join("kit.RPL.bak");
    fs::create_dir_all(&bak_dir)?;
    fs::write(bak_dir.join("keep"), b"x")?;

    let cfg = RelinkConfig::default();
    let res = inject_file(&rpl, &[ReplacementRule::new("", "", OLD, NEW)], &cfg, false);
    assert!(res.is_err());
    assert!(format!("{:#}", res.unwrap_err()).contains("rename"));
    assert_eq!(fs::read(&rpl)?, original.as_bytes());
    assert!(bak_dir.join("keep").exists());
    Ok(())
}
