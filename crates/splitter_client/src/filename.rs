const FALLBACK_NAME: &str = "artifact";
const MAX_NAME_LEN: usize = 120;
const MAX_EXTENSION_LEN: usize = 16;
const TRIMMED: &[char] = &['_', ' ', '.'];

/// File name safe to create on any desktop OS, derived from a server-supplied name.
///
/// Path separators and control characters become `_`, runs of `_` collapse,
/// and reserved device names get a trailing `_`.
pub fn safe_file_name(name: &str) -> String {
    let mut cleaned = String::with_capacity(name.len());
    for c in name.chars() {
        let c = if is_forbidden(c) { '_' } else { c };
        if c == '_' && cleaned.ends_with('_') {
            continue;
        }
        cleaned.push(c);
    }

    let mut cleaned = cleaned.trim_matches(TRIMMED).to_string();
    if cleaned.is_empty() {
        return FALLBACK_NAME.to_string();
    }
    if cleaned.len() > MAX_NAME_LEN {
        cleaned = shorten(&cleaned);
    }
    let stem = cleaned.split('.').next().unwrap_or_default();
    if is_reserved_device_name(stem) {
        cleaned.push('_');
    }
    cleaned
}

/// Cut the stem so the whole name fits, keeping a short extension intact.
fn shorten(name: &str) -> String {
    let (stem, extension) = match name.rfind('.') {
        Some(dot) if dot > 0 && name.len() - dot <= MAX_EXTENSION_LEN => name.split_at(dot),
        _ => (name, ""),
    };
    let mut end = MAX_NAME_LEN - extension.len();
    while !stem.is_char_boundary(end) {
        end -= 1;
    }
    let stem = stem[..end].trim_end_matches(TRIMMED);
    if stem.is_empty() {
        return FALLBACK_NAME.to_string();
    }
    format!("{stem}{extension}")
}

fn is_forbidden(c: char) -> bool {
    matches!(c, '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '\0'..='\u{1F}')
}

fn is_reserved_device_name(stem: &str) -> bool {
    const RESERVED: &[&str] = &["CON", "PRN", "AUX", "NUL"];
    if RESERVED.iter().any(|r| r.eq_ignore_ascii_case(stem)) {
        return true;
    }
    let upper = stem.to_ascii_uppercase();
    ["COM", "LPT"].iter().any(|prefix| {
        upper
            .strip_prefix(prefix)
            .is_some_and(|digit| digit.len() == 1 && matches!(digit.as_bytes()[0], b'1'..=b'9'))
    })
}
