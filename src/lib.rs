#![allow(non_snake_case)]

// Базовые модули
pub mod consts;
pub mod config;
pub mod metrics;

// Кодеки и разметка
pub mod codec;    // src/codec/{mod,latin1,wrap}.rs
pub mod locate;   // пресеты + группы base64-строк
pub mod outer;    // outer block decode/encode
pub mod fragment; // <CONTAINER фрагменты

// Извлечение / замена / сравнение
pub mod extract;
pub mod replace;
pub mod diff;

// Файл целиком, таблицы, backup
pub mod document;
pub mod tables;
pub mod backup;
pub mod inject;

// Удобные реэкспорты
pub use codec::{Base64View, Codec};
pub use config::{ContainerScope, DuplicatePolicy, MatchPolicy, RelinkConfig};
pub use diff::{build_rules, compare, DiffReport, IdentityKey, Snapshot};
pub use document::RplDocument;
pub use extract::{extract_document, PathRecord};
pub use inject::{apply_rules, inject_file, InjectSummary, RuleSource};
pub use replace::{rewrite_span_text, ReplacementRule, ReportEntry, SpanRewrite};
