//! Lightweight global metrics for RplRelink.
//!
//! Атомарные счётчики по уровням вложенности:
//! - presets / outer blocks
//! - inner tokens
//! - paths / replacements / re-encoded blocks

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

// ----- Presets / outer blocks -----
static PRESETS_SCANNED: AtomicU64 = AtomicU64::new(0);
static OUTER_BLOCKS_DECODED: AtomicU64 = AtomicU64::new(0);
static OUTER_BLOCKS_SKIPPED: AtomicU64 = AtomicU64::new(0);

// ----- Inner tokens -----
static INNER_TOKENS_DECODED: AtomicU64 = AtomicU64::new(0);
static INNER_TOKENS_SKIPPED: AtomicU64 = AtomicU64::new(0);

// ----- Paths / rewrite -----
static PATHS_FOUND: AtomicU64 = AtomicU64::new(0);
static TOKENS_REWRITTEN: AtomicU64 = AtomicU64::new(0);
static PATH_OCCURRENCES_REPLACED: AtomicU64 = AtomicU64::new(0);
static BLOCKS_REENCODED: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Clone, Default, Serialize)]
pub struct MetricsSnapshot {
    pub presets_scanned: u64,
    pub outer_blocks_decoded: u64,
    pub outer_blocks_skipped: u64,

    pub inner_tokens_decoded: u64,
    pub inner_tokens_skipped: u64,

    pub paths_found: u64,
    pub tokens_rewritten: u64,
    pub path_occurrences_replaced: u64,
    pub blocks_reencoded: u64,
}

impl MetricsSnapshot {
    /// Доля внутренних токенов, которые удалось декодировать.
    pub fn token_decode_ratio(&self) -> f64 {
        let total = self.inner_tokens_decoded + self.inner_tokens_skipped;
        if total == 0 {
            0.0
        } else {
            self.inner_tokens_decoded as f64 / total as f64
        }
    }
}

// ----- Recorders (presets / outer) -----
pub fn record_preset_scanned() {
    PRESETS_SCANNED.fetch_add(1, Ordering::Relaxed);
}

pub fn record_outer_block(decoded: bool) {
    if decoded {
        OUTER_BLOCKS_DECODED.fetch_add(1, Ordering::Relaxed);
    } else {
        OUTER_BLOCKS_SKIPPED.fetch_add(1, Ordering::Relaxed);
    }
}

// ----- Recorders (inner) -----
pub fn record_inner_token(decoded: bool) {
    if decoded {
        INNER_TOKENS_DECODED.fetch_add(1, Ordering::Relaxed);
    } else {
        INNER_TOKENS_SKIPPED.fetch_add(1, Ordering::Relaxed);
    }
}

// ----- Recorders (paths / rewrite) -----
pub fn record_path_found() {
    PATHS_FOUND.fetch_add(1, Ordering::Relaxed);
}

pub fn record_token_rewritten(occurrences: usize) {
    TOKENS_REWRITTEN.fetch_add(1, Ordering::Relaxed);
    PATH_OCCURRENCES_REPLACED.fetch_add(occurrences as u64, Ordering::Relaxed);
}

pub fn record_block_reencoded() {
    BLOCKS_REENCODED.fetch_add(1, Ordering::Relaxed);
}

// ----- Snapshot -----
pub fn snapshot() -> MetricsSnapshot {
    MetricsSnapshot {
        presets_scanned: PRESETS_SCANNED.load(Ordering::Relaxed),
        outer_blocks_decoded: OUTER_BLOCKS_DECODED.load(Ordering::Relaxed),
        outer_blocks_skipped: OUTER_BLOCKS_SKIPPED.load(Ordering::Relaxed),

        inner_tokens_decoded: INNER_TOKENS_DECODED.load(Ordering::Relaxed),
        inner_tokens_skipped: INNER_TOKENS_SKIPPED.load(Ordering::Relaxed),

        paths_found: PATHS_FOUND.load(Ordering::Relaxed),
        tokens_rewritten: TOKENS_REWRITTEN.load(Ordering::Relaxed),
        path_occurrences_replaced: PATH_OCCURRENCES_REPLACED.load(Ordering::Relaxed),
        blocks_reencoded: BLOCKS_REENCODED.load(Ordering::Relaxed),
    }
}
