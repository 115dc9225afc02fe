//! Shared types used across all pipeline stages.
//!
//! A [`Row`] is one employee assignment as it comes out of the row source,
//! already split into named fields. Every later stage (grouping, template
//! selection, placeholder filling, audit) reads rows but never mutates them.

use std::collections::BTreeSet;

/// One line of the input file, as an ordered sequence of text cells.
pub type RawRow = Vec<String>;

/// Group-level tag: render the group with a daily template regardless of size.
pub const FLAG_DAILY: &str = "daily";

/// Group-level tag: large groups use the administrative daily template.
pub const FLAG_ADMINISTRATIVE: &str = "administrative";

/// Tags that describe a whole sheet rather than a single employee.
pub const GROUP_FLAGS: [&str; 2] = [FLAG_DAILY, FLAG_ADMINISTRATIVE];

/// Free-form tags, lower-cased and ordered for deterministic output.
pub type Flags = BTreeSet<String>;

/// One employee-assignment record.
///
/// `sheet_name` is the grouping key and is kept raw: flag markers such as
/// `*` are still embedded in it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    pub employee_id: String,
    pub employee_name: String,
    pub employee_nickname: String,
    pub approver_name: String,
    pub approver_id: String,
    pub sector_name: String,
    pub sheet_name: String,
    pub shift: String,
    /// Substitute identifiers, in source order.
    pub substitutes: Vec<String>,
    pub flags: Flags,
}

impl Row {
    /// Name printed on the timesheet: nickname when set, legal name otherwise.
    pub fn display_name(&self) -> &str {
        if self.employee_nickname.trim().is_empty() {
            &self.employee_name
        } else {
            &self.employee_nickname
        }
    }
}
