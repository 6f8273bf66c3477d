//! CSV-таблицы: извлечённые пути (`preset,container,note,path`) и правила
//! замены (`preset,container,old_path,new_path`).
//!
//! Отсутствующие колонки читаются как пустые строки; пустой файл: пустая таблица.

use std::fs::{self, File, OpenOptions};
use std::io::{Read, Write};
use std::path::Path;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::extract::PathRecord;
use crate::replace::ReplacementRule;

fn read_rows<T: DeserializeOwned, R: Read>(reader: R) -> Result<Vec<T>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);
    let mut out = Vec::new();
    for (i, row) in rdr.deserialize().enumerate() {
        // i + 2: строка файла с учётом заголовка
        let row: T = row.with_context(|| format!("csv row {}", i + 2))?;
        out.push(row);
    }
    Ok(out)
}

fn write_rows<T: Serialize, W: Write>(writer: W, rows: &[T]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    Ok(())
}

fn open_out(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("create dir {}", parent.display()))?;
        }
    }
    OpenOptions::new()
        .create(true)
        .truncate(true)
        .write(true)
        .open(path)
        .with_context(|| format!("open {}", path.display()))
}

// ----- Extraction table -----

pub fn read_records_from<R: Read>(reader: R) -> Result<Vec<PathRecord>> {
    read_rows(reader)
}

pub fn read_records(path: &Path) -> Result<Vec<PathRecord>> {
    let f = File::open(path).with_context(|| format!("open {}", path.display()))?;
    read_records_from(f).with_context(|| format!("read paths table {}", path.display()))
}

pub fn write_records_to<W: Write>(writer: W, records: &[PathRecord]) -> Result<()> {
    if records.is_empty() {
        // заголовок всё равно нужен, чтобы таблицу можно было прочитать обратно
        let mut wtr = csv::Writer::from_writer(writer);
        wtr.write_record(crate::consts::EXTRACT_COLUMNS)?;
        wtr.flush()?;
        return Ok(());
    }
    write_rows(writer, records)
}

pub fn write_records(path: &Path, records: &[PathRecord]) -> Result<()> {
    let mut f = open_out(path)?;
    write_records_to(&mut f, records)?;
    f.sync_all()?;
    Ok(())
}

// ----- Replacement table -----

pub fn read_rules_from<R: Read>(reader: R) -> Result<Vec<ReplacementRule>> {
    read_rows(reader)
}

pub fn read_rules(path: &Path) -> Result<Vec<ReplacementRule>> {
    let f = File::open(path).with_context(|| format!("open {}", path.display()))?;
    read_rules_from(f).with_context(|| format!("read replacements table {}", path.display()))
}

/// Пустой набор правил пишется пустым файлом.
pub fn write_rules_to<W: Write>(writer: W, rules: &[ReplacementRule]) -> Result<()> {
    if rules.is_empty() {
        return Ok(());
    }
    write_rows(writer, rules)
}

pub fn write_rules(path: &Path, rules: &[ReplacementRule]) -> Result<()> {
    let mut f = open_out(path)?;
    write_rules_to(&mut f, rules)?;
    f.sync_all()?;
    Ok(())
}
