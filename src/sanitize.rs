//! Filesystem-safe names for artists and titles.

/// Placeholder used by [`sanitize`] when nothing usable is left.
pub const DEFAULT_PLACEHOLDER: &str = "sin_nombre";

/// Placeholder directory name for items without an artist.
pub const ARTIST_PLACEHOLDER: &str = "sin_artista";

/// Placeholder file stem for items without a title.
pub const TITLE_PLACEHOLDER: &str = "sin_titulo";

/// Maximum length of a sanitized name, in characters.
pub const MAX_NAME_CHARS: usize = 200;

/// Maximum length of a sanitized name, in UTF-8 bytes.
///
/// Path components are limited to 255 bytes on common filesystems; this
/// leaves room for the extension and the `.part` suffix.
pub const MAX_NAME_BYTES: usize = 200;

const FORBIDDEN: &[char] = &['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// Sanitize a string for use as a single path segment.
///
/// Forbidden and control characters become `_`, whitespace runs collapse to
/// one space, leading/trailing whitespace and dots are dropped and the result
/// is capped at [`MAX_NAME_CHARS`] characters and [`MAX_NAME_BYTES`] bytes,
/// cutting only between characters. Falls back to [`DEFAULT_PLACEHOLDER`].
pub fn sanitize(name: &str) -> String {
    sanitize_or(name, DEFAULT_PLACEHOLDER)
}

/// Same as [`sanitize`] with a caller-chosen placeholder.
///
/// The placeholder is returned as-is, so it should already be a valid name.
pub fn sanitize_or(name: &str, placeholder: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut in_space = false;

    for c in name.chars() {
        if c.is_whitespace() {
            if !in_space {
                out.push(' ');
                in_space = true;
            }
            continue;
        }
        in_space = false;
        if FORBIDDEN.contains(&c) || c.is_control() {
            out.push('_');
        } else {
            out.push(c);
        }
    }

    let trimmed = trim_name(&out);
    let cut = trimmed
        .char_indices()
        .enumerate()
        .find(|&(count, (idx, c))| {
            count == MAX_NAME_CHARS || idx + c.len_utf8() > MAX_NAME_BYTES
        })
        .map(|(_, (idx, _))| idx);
    let truncated = match cut {
        Some(idx) => trim_name(&trimmed[..idx]),
        None => trimmed,
    };

    if truncated.is_empty() {
        placeholder.to_string()
    } else {
        truncated.to_string()
    }
}

fn trim_name(s: &str) -> &str {
    s.trim_matches(|c: char| c.is_whitespace() || c == '.')
}
