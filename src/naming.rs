//! Centralized handling of the sheet-name convention.
//!
//! The sheet name column doubles as the grouping key, the printed title and,
//! through embedded marker characters, as a carrier for group flags:
//!
//! - `ADM-TARDE*` → title "ADM-TARDE", flags {administrative}
//! - `PORTARIA!` → title "PORTARIA", flags {daily}
//! - `obras/turno.b` → file `TURNOB.XLSX`
//!
//! Everything that reads or strips those markers goes through this module so
//! the convention lives in exactly one place.

use crate::types::{FLAG_ADMINISTRATIVE, FLAG_DAILY, Flags};

/// Marker characters embedded in raw sheet names and the flag each one sets.
pub const FLAG_MARKERS: [(char, &str); 2] = [('*', FLAG_ADMINISTRATIVE), ('!', FLAG_DAILY)];

/// Extension of every rendered document, already canonicalized.
pub const DOCUMENT_EXTENSION: &str = "XLSX";

/// Excel sheet name maximum length.
pub const WORKSHEET_NAME_MAX: usize = 31;

/// Characters Excel refuses in worksheet names.
const WORKSHEET_ILLEGAL: [char; 7] = ['*', ':', '?', '/', '\\', '[', ']'];

/// Stem used when sanitization leaves nothing behind.
const FALLBACK_STEM: &str = "SHEET";

fn is_marker(c: char) -> bool {
    FLAG_MARKERS.iter().any(|(m, _)| *m == c)
}

/// Strip flag markers from a raw sheet name, giving the display title.
///
/// Idempotent: a sanitized title contains no markers and no surrounding
/// whitespace, so sanitizing it again is a no-op.
pub fn sanitize_title(raw: &str) -> String {
    raw.chars()
        .filter(|c| !is_marker(*c))
        .collect::<String>()
        .trim()
        .to_string()
}

/// Flags encoded by marker characters in a raw sheet name.
pub fn key_flags(raw: &str) -> Flags {
    FLAG_MARKERS
        .iter()
        .filter(|(marker, _)| raw.contains(*marker))
        .map(|(_, flag)| (*flag).to_string())
        .collect()
}

/// Output file name for a raw sheet name: `SANITIZED_TITLE.XLSX`.
///
/// Only the last `/`- or `\`-separated segment is kept, dots are removed so
/// the name carries a single extension, markers are stripped and the result
/// is upper-cased. Distinct keys may map to the same name; callers detect
/// that as a collision.
pub fn output_file_name(raw: &str) -> String {
    let segment = raw.rsplit(['/', '\\']).next().unwrap_or(raw);
    let stem = sanitize_title(&segment.replace('.', "")).to_uppercase();
    let stem = if stem.is_empty() {
        FALLBACK_STEM.to_string()
    } else {
        stem
    };
    format!("{stem}.{DOCUMENT_EXTENSION}")
}

/// Clamp a title into something Excel accepts as a worksheet name.
pub fn worksheet_name(title: &str) -> String {
    let replaced: String = title
        .chars()
        .map(|c| if WORKSHEET_ILLEGAL.contains(&c) { '_' } else { c })
        .collect();
    let trimmed = replaced.trim().trim_matches('\'').trim();
    if trimmed.is_empty() {
        return "Sheet".to_string();
    }
    trimmed.chars().take(WORKSHEET_NAME_MAX).collect()
}
