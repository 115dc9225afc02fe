//! Token substitution for layout cells.
//!
//! - A cell whose whole text is one numeric-valued token becomes a number.
//! - Otherwise every token is replaced textually.
//! - Known slots without a value (member positions past the count) become
//!   empty text; unknown tokens are left as written.

use crate::placeholder::{PlaceholderMap, PlaceholderValue, Slot};

/// Value written into one spreadsheet cell.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Blank,
    Text(String),
    Number(f64),
}

pub fn fill_cell(text: &str, map: &PlaceholderMap) -> CellValue {
    if let Some(slot) = whole_token(text).and_then(Slot::from_token) {
        return match map.get(slot) {
            Some(PlaceholderValue::Number(n)) => CellValue::Number(*n as f64),
            Some(PlaceholderValue::Text(s)) if !s.is_empty() => CellValue::Text(s.clone()),
            _ => CellValue::Blank,
        };
    }

    let filled = substitute(text, map);
    if filled.is_empty() {
        CellValue::Blank
    } else {
        CellValue::Text(filled)
    }
}

/// Token name when `text` is exactly `##NAME##`.
fn whole_token(text: &str) -> Option<&str> {
    let inner = text.strip_prefix("##")?.strip_suffix("##")?;
    if inner.is_empty() || inner.contains("##") {
        None
    } else {
        Some(inner)
    }
}

fn substitute(text: &str, map: &PlaceholderMap) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find("##") {
        let after = &rest[start + 2..];
        let Some(end) = after.find("##") else {
            break;
        };
        out.push_str(&rest[..start]);
        let name = &after[..end];
        match Slot::from_token(name) {
            Some(slot) => {
                if let Some(value) = map.get(slot) {
                    out.push_str(&value.to_string());
                }
            }
            None => {
                out.push_str("##");
                out.push_str(name);
                out.push_str("##");
            }
        }
        rest = &after[end + 2..];
    }
    out.push_str(rest);
    out
}
