//! Placeholder vocabulary and the per-group mapping builder.
//!
//! Templates reference values through `##NAME##` tokens:
//!
//! | Token | Value |
//! |---|---|
//! | `##SECTOR##` | sector of the group |
//! | `##SHEET##` | sanitized sheet name |
//! | `##APPROVER_NAME##`, `##APPROVER_ID##` | approver of the group |
//! | `##MEMBER_COUNT##` | number of members (numeric) |
//! | `##NAME<i>##`, `##ID<i>##` | member at 1-based position `i` |
//!
//! A [`PlaceholderMap`] is built fresh for every group and handed straight to
//! the renderer.

use crate::dataset::Group;
use crate::naming;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum PlaceholderError {
    #[error("Group {0:?} has no members")]
    EmptyGroup(String),
}

/// A named slot a template can reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Slot {
    Sector,
    SheetTitle,
    ApproverName,
    ApproverId,
    MemberCount,
    MemberName(usize),
    MemberId(usize),
}

impl Slot {
    /// Token name without the `##` fences.
    pub fn name(&self) -> String {
        match self {
            Slot::Sector => "SECTOR".to_string(),
            Slot::SheetTitle => "SHEET".to_string(),
            Slot::ApproverName => "APPROVER_NAME".to_string(),
            Slot::ApproverId => "APPROVER_ID".to_string(),
            Slot::MemberCount => "MEMBER_COUNT".to_string(),
            Slot::MemberName(i) => format!("NAME{i}"),
            Slot::MemberId(i) => format!("ID{i}"),
        }
    }

    /// Parse a token name (without fences). Positions start at 1.
    pub fn from_token(name: &str) -> Option<Slot> {
        match name {
            "SECTOR" => return Some(Slot::Sector),
            "SHEET" => return Some(Slot::SheetTitle),
            "APPROVER_NAME" => return Some(Slot::ApproverName),
            "APPROVER_ID" => return Some(Slot::ApproverId),
            "MEMBER_COUNT" => return Some(Slot::MemberCount),
            _ => {}
        }
        let position = |digits: &str| -> Option<usize> {
            if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            digits.parse::<usize>().ok().filter(|&i| i >= 1)
        };
        if let Some(digits) = name.strip_prefix("NAME") {
            return position(digits).map(Slot::MemberName);
        }
        if let Some(digits) = name.strip_prefix("ID") {
            return position(digits).map(Slot::MemberId);
        }
        None
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "##{}##", self.name())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PlaceholderValue {
    Text(String),
    Number(i64),
}

impl fmt::Display for PlaceholderValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlaceholderValue::Text(s) => f.write_str(s),
            PlaceholderValue::Number(n) => write!(f, "{n}"),
        }
    }
}

/// Filled slots for one group.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlaceholderMap {
    values: BTreeMap<Slot, PlaceholderValue>,
}

impl PlaceholderMap {
    pub fn insert_text(&mut self, slot: Slot, value: impl Into<String>) {
        self.values.insert(slot, PlaceholderValue::Text(value.into()));
    }

    pub fn insert_number(&mut self, slot: Slot, value: i64) {
        self.values.insert(slot, PlaceholderValue::Number(value));
    }

    pub fn get(&self, slot: Slot) -> Option<&PlaceholderValue> {
        self.values.get(&slot)
    }

    /// Member count as recorded in the map, `0` when absent.
    pub fn member_count(&self) -> usize {
        match self.get(Slot::MemberCount) {
            Some(PlaceholderValue::Number(n)) => usize::try_from(*n).unwrap_or(0),
            _ => 0,
        }
    }
}

/// Build the placeholder mapping for a group.
///
/// Header slots come from the group's first row; the title is the sanitized
/// raw key. Fails on a group without members instead of producing an empty
/// document.
pub fn build(group: &Group<'_>) -> Result<PlaceholderMap, PlaceholderError> {
    let header = group
        .header()
        .ok_or_else(|| PlaceholderError::EmptyGroup(group.key.to_string()))?;

    let mut map = PlaceholderMap::default();
    map.insert_text(Slot::Sector, header.sector_name.clone());
    map.insert_text(Slot::SheetTitle, naming::sanitize_title(group.key));
    map.insert_text(Slot::ApproverName, header.approver_name.clone());
    map.insert_text(Slot::ApproverId, header.approver_id.clone());
    map.insert_number(
        Slot::MemberCount,
        i64::try_from(group.len()).unwrap_or(i64::MAX),
    );

    for (idx, row) in group.rows.iter().enumerate() {
        let position = idx + 1;
        map.insert_text(Slot::MemberName(position), row.display_name());
        map.insert_text(Slot::MemberId(position), row.employee_id.clone());
    }
    Ok(map)
}
