use anyhow::Result;
use serde::Serialize;

use RplRelink::config::RelinkConfig;
use RplRelink::metrics::{self, MetricsSnapshot};

/// Конфиг из ENV (CLI-флаги накладываются поверх в командах).
pub fn base_config() -> RelinkConfig {
    RelinkConfig::from_env()
}

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn counters() -> MetricsSnapshot {
    metrics::snapshot()
}

/// Укоротить строку для табличного вывода.
pub fn ellipsize(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let head: String = s.chars().take(max.saturating_sub(1)).collect();
    format!("{head}…")
}
