//! Centralized configuration for RplRelink.
//!
//! Goals:
//! - Single place to collect tunables instead of scattering env lookups.
//! - `RelinkConfig::from_env()` reads `RPL_*` variables; CLI flags override on top.
//! - "First match wins" shortcuts are explicit named policies, not iteration order.
//!
//! Env:
//! - RPL_LINE_WIDTH       : ширина строки при перекодировании (default 76; 0 = как в исходном блоке)
//! - RPL_DEFAULT_INDENT   : отступ, если исходный не восстановился (default 4 пробела)
//! - RPL_ALL_MATCHES      : 1|true|on|yes => все пути во фрагменте, а не только первый
//! - RPL_STRICT_CONTAINER : 1|true|on|yes => правило с container применяется только к своему контейнеру
//! - RPL_DUPLICATE_POLICY : first|last => какая строка таблицы побеждает при повторе ключа (default first)
//! - RPL_BACKUP_SUFFIX    : суффикс резервной копии (default "bak")

use std::fmt;

use crate::consts::{BACKUP_SUFFIX, DEFAULT_INDENT, DEFAULT_LINE_WIDTH};

/// Сколько путей брать из одного контейнерного фрагмента.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MatchPolicy {
    /// Первый inner token, давший совпадение, и только первое совпадение в нём.
    FirstPerFragment,
    /// Все совпадения во всех токенах фрагмента.
    AllMatches,
}

/// Гейтинг правил замены по метке контейнера.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContainerScope {
    /// `container` правила не проверяется: правило действует на весь пресет.
    AnyContainer,
    /// Непустой `container` правила должен совпасть с меткой фрагмента.
    Strict,
}

/// Что делать с повтором identity tuple внутри одного снапшота.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DuplicatePolicy {
    KeepFirst,
    KeepLast,
}

impl DuplicatePolicy {
    /// `first` / `last` (регистр не важен).
    pub fn parse(v: &str) -> Option<Self> {
        match v.trim().to_ascii_lowercase().as_str() {
            "first" => Some(DuplicatePolicy::KeepFirst),
            "last" => Some(DuplicatePolicy::KeepLast),
            _ => None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct RelinkConfig {
    /// Line width for re-encoded outer blocks; 0 keeps the original block's width.
    /// Env: RPL_LINE_WIDTH (default 76)
    pub line_width: usize,

    /// Indentation used when a block's own indentation cannot be recovered.
    /// Env: RPL_DEFAULT_INDENT (default four spaces)
    pub default_indent: String,

    /// Env: RPL_ALL_MATCHES (default FirstPerFragment)
    pub match_policy: MatchPolicy,

    /// Env: RPL_STRICT_CONTAINER (default AnyContainer)
    pub container_scope: ContainerScope,

    /// Env: RPL_DUPLICATE_POLICY (default KeepFirst)
    pub duplicate_policy: DuplicatePolicy,

    /// Backup file is `<name>.<backup_suffix>`.
    /// Env: RPL_BACKUP_SUFFIX (default "bak")
    pub backup_suffix: String,
}

impl Default for RelinkConfig {
    fn default() -> Self {
        Self {
            line_width: DEFAULT_LINE_WIDTH,
            default_indent: DEFAULT_INDENT.to_string(),
            match_policy: MatchPolicy::FirstPerFragment,
            container_scope: ContainerScope::AnyContainer,
            duplicate_policy: DuplicatePolicy::KeepFirst,
            backup_suffix: BACKUP_SUFFIX.to_string(),
        }
    }
}

fn parse_flag(v: &str) -> bool {
    let s = v.trim().to_ascii_lowercase();
    s == "1" || s == "true" || s == "on" || s == "yes"
}

impl RelinkConfig {
    /// Load configuration from environment variables on top of defaults.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        if let Ok(v) = std::env::var("RPL_LINE_WIDTH") {
            if let Ok(n) = v.trim().parse::<usize>() {
                cfg.line_width = n;
            }
        }

        if let Ok(v) = std::env::var("RPL_DEFAULT_INDENT") {
            // пробелы/табы значимы: не трогаем trim()
            if v.chars().all(|c| c == ' ' || c == '\t') {
                cfg.default_indent = v;
            }
        }

        if let Ok(v) = std::env::var("RPL_ALL_MATCHES") {
            if parse_flag(&v) {
                cfg.match_policy = MatchPolicy::AllMatches;
            }
        }

        if let Ok(v) = std::env::var("RPL_STRICT_CONTAINER") {
            if parse_flag(&v) {
                cfg.container_scope = ContainerScope::Strict;
            }
        }

        if let Ok(v) = std::env::var("RPL_DUPLICATE_POLICY") {
            if let Some(p) = DuplicatePolicy::parse(&v) {
                cfg.duplicate_policy = p;
            }
        }
        if let Ok(v) = std::env::var("RPL_BACKUP_SUFFIX") {
            let s = v.trim().trim_start_matches('.');
            if !s.is_empty() {
                cfg.backup_suffix = s.to_string();
            }
        }

        cfg
    }

    /// Fluent setters (builder-style) to override specific fields.

    pub fn with_line_width(mut self, width: usize) -> Self {
        self.line_width = width;
        self
    }

    pub fn with_default_indent<S: Into<String>>(mut self, indent: S) -> Self {
        self.default_indent = indent.into();
        self
    }

    pub fn with_match_policy(mut self, policy: MatchPolicy) -> Self {
        self.match_policy = policy;
        self
    }

    pub fn with_container_scope(mut self, scope: ContainerScope) -> Self {
        self.container_scope = scope;
        self
    }

    pub fn with_duplicate_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.duplicate_policy = policy;
        self
    }

    pub fn with_backup_suffix<S: Into<String>>(mut self, suffix: S) -> Self {
        self.backup_suffix = suffix.into();
        self
    }
}

impl fmt::Display for RelinkConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "RelinkConfig {{ \
             line_width: {}, \
             default_indent: {:?}, \
             match_policy: {:?}, \
             container_scope: {:?}, \
             duplicate_policy: {:?}, \
             backup_suffix: {} \
             }}",
            if self.line_width == 0 {
                "original".to_string()
            } else {
                self.line_width.to_string()
            },
            self.default_indent,
            self.match_policy,
            self.container_scope,
            self.duplicate_policy,
            self.backup_suffix,
        )
    }
}
