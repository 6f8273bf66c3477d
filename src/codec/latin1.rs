//! Байто-сохраняющее текстовое представление (Latin-1 view).
//!
//! Каждый байт отображается ровно в один char (U+0000..U+00FF) и обратно.
//! Полезная нагрузка внутри .RPL не обязана быть валидным UTF-8, поэтому
//! и файл целиком, и декодированные блоки обрабатываются через этот view.

/// bytes -> text, 1:1.
pub fn decode(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}

/// text -> bytes, 1:1. Символы вне U+00FF заменяются на `?`.
///
/// В нормальном потоке такие символы не появляются: всё, что попадает в view,
/// либо пришло из `decode`, либо прошло через [`from_utf8_text`].
pub fn encode(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| {
            let cp = c as u32;
            if cp <= 0xFF {
                cp as u8
            } else {
                b'?'
            }
        })
        .collect()
}

/// Обычная (UTF-8) строка -> view её UTF-8 байт. Нужно, чтобы пути из таблиц
/// совпадали с тем, как они лежат внутри декодированных токенов.
pub fn from_utf8_text(text: &str) -> String {
    decode(text.as_bytes())
}

/// View -> читаемая строка: байты как UTF-8, а если это не UTF-8,
/// то сами Latin-1 символы view (так путь можно вернуть через [`match_forms`]).
pub fn to_text(view: &str) -> String {
    match String::from_utf8(encode(view)) {
        Ok(s) => s,
        Err(_) => view.to_string(),
    }
}

/// Как текст из таблицы может лежать в view: его UTF-8 байты, и (если все
/// символы ≤ U+00FF и это другая строка) сами символы как сырые байты.
pub fn match_forms(text: &str) -> Vec<String> {
    let utf8 = from_utf8_text(text);
    let mut forms = vec![utf8];
    if text.chars().all(|c| (c as u32) <= 0xFF) && forms[0] != text {
        forms.push(text.to_string());
    }
    forms
}
