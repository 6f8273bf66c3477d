//! Общие константы формата .RPL (маркеры пресетов, контейнеры, base64, пути).

// -------- Preset blocks --------
// Открывающая строка: `<PRESET `Name``; закрывающая: одиночный `>`.
pub const PRESET_OPEN_TAG: &str = "<PRESET";
pub const PRESET_CLOSE: &str = ">";

// -------- Outer/inner base64 --------
/// Минимальная длина base64-строки (и внешнего блока, и внутреннего токена).
pub const MIN_B64_LEN: usize = 20;
/// Ширина строки при перекодировании внешнего блока.
pub const DEFAULT_LINE_WIDTH: usize = 76;
/// Отступ, если его не удалось восстановить из исходного блока.
pub const DEFAULT_INDENT: &str = "    ";

// -------- Containers --------
pub const CONTAINER_DELIM: &str = "<CONTAINER";
pub const CONTAINER_HEADER_WORD: &str = "Container";

// -------- Paths --------
// Порядок важен: длинные расширения раньше коротких (aiff до aif).
pub const AUDIO_EXTENSIONS: &[&str] = &["aiff", "aifc", "aif", "wav", "flac", "ogg", "mp3", "sfz"];

// -------- Tables --------
pub const EXTRACT_COLUMNS: [&str; 4] = ["preset", "container", "note", "path"];

// -------- Backup --------
pub const BACKUP_SUFFIX: &str = "bak";

/// Длина префикса inner-токена в отчёте замен.
pub const TOKEN_PREFIX_LEN: usize = 24;

/// Символ алфавита base64 (включая паддинг `=`).
#[inline]
pub fn is_b64_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '+' || c == '/' || c == '='
}
