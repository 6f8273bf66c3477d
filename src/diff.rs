//! Diff Builder: два снапшота (identity tuple -> path) -> правила замены.
//!
//! Ключ: `(preset, container, note)`. Правило создаётся только для ключей,
//! присутствующих в обоих снапшотах с разными путями.

use std::collections::HashMap;

use anyhow::Result;
use log::{info, warn};
use serde::Serialize;

use crate::config::DuplicatePolicy;
use crate::extract::PathRecord;
use crate::replace::ReplacementRule;

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct IdentityKey {
    pub preset: String,
    pub container: String,
    pub note: String,
}

impl IdentityKey {
    pub fn new(preset: &str, container: &str, note: &str) -> Self {
        Self {
            preset: preset.to_string(),
            container: container.to_string(),
            note: note.to_string(),
        }
    }

    pub fn of(rec: &PathRecord) -> Self {
        Self::new(&rec.preset, &rec.container, &rec.note)
    }
}

/// Identity tuple -> path, в порядке первого появления ключа.
#[derive(Clone, Debug, Default)]
pub struct Snapshot {
    entries: Vec<(IdentityKey, String)>,
    index: HashMap<IdentityKey, usize>,
}

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: &[PathRecord], policy: DuplicatePolicy) -> Self {
        let mut s = Self::new();
        for r in records {
            s.insert(IdentityKey::of(r), r.path.clone(), policy);
        }
        s
    }

    /// Повтор ключа разрешается политикой; позиция ключа не меняется.
    pub fn insert(&mut self, key: IdentityKey, path: String, policy: DuplicatePolicy) {
        match self.index.get(&key) {
            Some(&i) => {
                if policy == DuplicatePolicy::KeepLast {
                    self.entries[i].1 = path;
                }
            }
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, path));
            }
        }
    }

    pub fn get(&self, key: &IdentityKey) -> Option<&str> {
        self.index.get(key).map(|&i| self.entries[i].1.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&IdentityKey, &str)> {
        self.entries.iter().map(|(k, p)| (k, p.as_str()))
    }

    /// Сколько ключей есть в обоих снапшотах.
    pub fn overlap(&self, other: &Snapshot) -> usize {
        self.entries
            .iter()
            .filter(|(k, _)| other.index.contains_key(k))
            .count()
    }
}

/// Правила для ключей с изменившимся путём (в порядке `original`).
pub fn build_rules(original: &Snapshot, revised: &Snapshot) -> Vec<ReplacementRule> {
    original
        .iter()
        .filter_map(|(key, old_path)| {
            let new_path = revised.get(key)?;
            if new_path == old_path {
                return None;
            }
            Some(ReplacementRule::new(&key.preset, &key.container, old_path, new_path))
        })
        .collect()
}

/// Как [`build_rules`], но если исходный снапшот не задан или не пересекается с
/// ревизией ни по одному ключу, он пересобирается через `regenerate` (свежее
/// извлечение из .RPL) и сравнение повторяется.
pub fn build_rules_with_fallback<F>(
    original: Option<Snapshot>,
    revised: &Snapshot,
    regenerate: F,
) -> Result<Vec<ReplacementRule>>
where
    F: FnOnce() -> Result<Snapshot>,
{
    let original = match original {
        Some(orig) if orig.overlap(revised) > 0 || revised.is_empty() => orig,
        Some(orig) => {
            warn!(
                "diff: original snapshot ({} key(s)) shares no identity tuple \
                 with revised ({} key(s)); re-extracting",
                orig.len(),
                revised.len()
            );
            regenerate()?
        }
        None => {
            info!("diff: no original snapshot given, extracting from input");
            regenerate()?
        }
    };
    let rules = build_rules(&original, revised);
    info!("diff: {} replacement rule(s)", rules.len());
    Ok(rules)
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PathChange {
    pub key: IdentityKey,
    pub old_path: String,
    pub new_path: String,
}

/// Path-identity report between two snapshots.
#[derive(Clone, Debug, Default, Serialize)]
pub struct DiffReport {
    pub changed: Vec<PathChange>,
    pub only_original: Vec<IdentityKey>,
    pub only_revised: Vec<IdentityKey>,
    pub unchanged: usize,
}

pub fn compare(original: &Snapshot, revised: &Snapshot) -> DiffReport {
    let mut rep = DiffReport::default();
    for (key, old_path) in original.iter() {
        match revised.get(key) {
            Some(new_path) if new_path == old_path => rep.unchanged += 1,
            Some(new_path) => rep.changed.push(PathChange {
                key: key.clone(),
                old_path: old_path.to_string(),
                new_path: new_path.to_string(),
            }),
            None => rep.only_original.push(key.clone()),
        }
    }
    rep.only_revised = revised
        .iter()
        .filter(|(k, _)| original.get(k).is_none())
        .map(|(k, _)| k.clone())
        .collect();
    rep
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snap(rows: &[(&str, &str, &str, &str)]) -> Snapshot {
        let recs: Vec<PathRecord> = rows
            .iter()
            .map(|(p, c, n, path)| PathRecord {
                preset: p.to_string(),
                container: c.to_string(),
                note: n.to_string(),
                path: path.to_string(),
            })
            .collect();
        Snapshot::from_records(&recs, DuplicatePolicy::KeepFirst)
    }

    #[test]
    fn changed_path_yields_rule() {
        let a = snap(&[("p1", "c1", "n1", "/old/x.wav")]);
        let b = snap(&[("p1", "c1", "n1", "/new/x.wav")]);
        assert_eq!(
            build_rules(&a, &b),
            vec![ReplacementRule::new("p1", "c1", "/old/x.wav", "/new/x.wav")]
        );
    }

    #[test]
    fn identical_or_one_sided_keys_yield_nothing() {
        let a = snap(&[("p1", "c1", "n1", "/x.wav"), ("p1", "c2", "", "/only/a.wav")]);
        let b = snap(&[("p1", "c1", "n1", "/x.wav"), ("p2", "c9", "", "/only/b.wav")]);
        assert!(build_rules(&a, &b).is_empty());

        let rep = compare(&a, &b);
        assert_eq!(rep.unchanged, 1);
        assert!(rep.changed.is_empty());
        assert_eq!(rep.only_original, vec![IdentityKey::new("p1", "c2", "")]);
        assert_eq!(rep.only_revised, vec![IdentityKey::new("p2", "c9", "")]);
    }

    #[test]
    fn duplicate_policy() {
        let recs = vec![
            PathRecord {
                preset: "p".into(),
                container: "c".into(),
                note: "".into(),
                path: "/1.wav".into(),
            },
            PathRecord {
                preset: "p".into(),
                container: "c".into(),
                note: "".into(),
                path: "/2.wav".into(),
            },
        ];
        let first = Snapshot::from_records(&recs, DuplicatePolicy::KeepFirst);
        let last = Snapshot::from_records(&recs, DuplicatePolicy::KeepLast);
        let k = IdentityKey::new("p", "c", "");
        assert_eq!(first.len(), 1);
        assert_eq!(first.get(&k), Some("/1.wav"));
        assert_eq!(last.get(&k), Some("/2.wav"));
    }

    #[test]
    fn fallback_regenerates_on_zero_overlap() -> Result<()> {
        let stale = snap(&[("p1", "old-label", "", "/old/x.wav")]);
        let revised = snap(&[("p1", "c1", "n1", "/new/x.wav")]);
        let mut called = false;
        let rules = build_rules_with_fallback(Some(stale), &revised, || {
            called = true;
            Ok(snap(&[("p1", "c1", "n1", "/old/x.wav")]))
        })?;
        assert!(called);
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].old_path, "/old/x.wav");
        Ok(())
    }

    #[test]
    fn fallback_not_used_when_overlapping() -> Result<()> {
        let a = snap(&[("p1", "c1", "n1", "/old/x.wav")]);
        let b = snap(&[("p1", "c1", "n1", "/new/x.wav")]);
        let rules = build_rules_with_fallback(Some(a), &b, || panic!("must not regenerate"))?;
        assert_eq!(rules.len(), 1);
        Ok(())
    }
}
