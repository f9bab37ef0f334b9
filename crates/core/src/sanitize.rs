use unicode_normalization::UnicodeNormalization;

const WINDOWS_RESERVED_NAMES: &[&str] = &[
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
    "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

const POSIX_BLACKLIST: &[char] = &['/', '\0'];
const WINDOWS_BLACKLIST: &[char] = &['\\', '/', ':', '*', '?', '"', '<', '>', '|', '\0'];

/// Longest filename (in chars) a sanitized value may have, extension included.
pub const MAX_FILENAME_LEN: usize = 254;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SanitizeOptions {
    pub normalize_unicode: bool,
    pub windows_safe: bool,
    pub custom_blacklist: String,
    pub replace_with: String,
}

impl Default for SanitizeOptions {
    fn default() -> Self {
        Self {
            normalize_unicode: false,
            windows_safe: cfg!(windows),
            custom_blacklist: String::new(),
            replace_with: "_".to_string(),
        }
    }
}

/// Turns an arbitrary string into something usable as a single path
/// component.
pub trait FilenameSanitizer {
    fn sanitize(&self, value: &str, options: &SanitizeOptions) -> String;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultSanitizer;

impl FilenameSanitizer for DefaultSanitizer {
    fn sanitize(&self, value: &str, options: &SanitizeOptions) -> String {
        make_valid_filename(value, options)
    }
}

pub fn make_valid_filename(value: &str, options: &SanitizeOptions) -> String {
    let blacklist = if options.windows_safe {
        WINDOWS_BLACKLIST
    } else {
        POSIX_BLACKLIST
    };

    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        if blacklist.contains(&ch) || options.custom_blacklist.contains(ch) || ch.is_control() {
            out.push_str(&options.replace_with);
        } else {
            out.push(ch);
        }
    }

    if options.windows_safe {
        out = out.trim_end_matches([' ', '.']).to_string();
        if is_windows_reserved(&out) {
            out.push('_');
        }
    }

    if out.starts_with('.') {
        out.insert(0, '_');
    }

    if options.normalize_unicode {
        out = fold_to_ascii(&out);
    }

    truncate_preserving_extension(&out, MAX_FILENAME_LEN)
}

/// Decomposes to NFKD and drops whatever is still not ASCII, so "Amélie"
/// becomes "Amelie".
pub fn fold_to_ascii(value: &str) -> String {
    value.nfkd().filter(char::is_ascii).collect()
}

pub fn truncate_preserving_extension(value: &str, limit: usize) -> String {
    if value.chars().count() <= limit {
        return value.to_string();
    }

    let (stem, ext) = match value.rfind('.') {
        Some(idx) if idx > 0 => value.split_at(idx),
        _ => (value, ""),
    };
    let ext_len = ext.chars().count();
    if ext_len >= limit {
        return value.chars().take(limit).collect();
    }

    let mut out: String = stem.chars().take(limit - ext_len).collect();
    out.push_str(ext);
    out
}

fn is_windows_reserved(value: &str) -> bool {
    let stem = value
        .split('.')
        .next()
        .unwrap_or(value)
        .to_ascii_uppercase();
    WINDOWS_RESERVED_NAMES
        .iter()
        .any(|reserved| reserved == &stem)
}
