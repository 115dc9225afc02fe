//! Template kinds, the selection policy, and the sheet layout of each kind.
//!
//! ## Selection Policy
//!
//! Evaluated top to bottom, first match wins:
//!
//! | Condition | Template |
//! |---|---|
//! | flags contain `daily` | [`TemplateKind::Daily`] |
//! | more than 6 members and `administrative` | [`TemplateKind::DailyAdministrative`] |
//! | more than 6 members | [`TemplateKind::Daily`] |
//! | otherwise | [`TemplateKind::Weekly`] |
//!
//! ## Layouts
//!
//! A [`Layout`] is a fixed grid of cells whose text may contain `##SLOT##`
//! tokens (see [`crate::placeholder::Slot`]). Member rows are laid out up to
//! the layout's capacity; tokens for positions past the member count are
//! left unfilled and render blank.

use crate::placeholder::Slot;
use crate::types::{FLAG_ADMINISTRATIVE, FLAG_DAILY, Flags};
use std::fmt;

/// Largest group the weekly template holds.
pub const WEEKLY_MAX_MEMBERS: usize = 6;

/// Member rows available on the daily templates.
pub const DAILY_MAX_MEMBERS: usize = 40;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemplateKind {
    Weekly,
    Daily,
    DailyAdministrative,
}

impl TemplateKind {
    pub const ALL: [TemplateKind; 3] = [
        TemplateKind::Weekly,
        TemplateKind::Daily,
        TemplateKind::DailyAdministrative,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TemplateKind::Weekly => "weekly",
            TemplateKind::Daily => "daily",
            TemplateKind::DailyAdministrative => "daily-administrative",
        }
    }

    /// Member rows the layout provides.
    pub fn capacity(self) -> usize {
        match self {
            TemplateKind::Weekly => WEEKLY_MAX_MEMBERS,
            TemplateKind::Daily | TemplateKind::DailyAdministrative => DAILY_MAX_MEMBERS,
        }
    }

    pub fn layout(self) -> Layout {
        match self {
            TemplateKind::Weekly => weekly_layout(),
            TemplateKind::Daily => daily_layout(),
            TemplateKind::DailyAdministrative => daily_administrative_layout(),
        }
    }
}

impl fmt::Display for TemplateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pick the template for a group. Total and side-effect free.
pub fn select_template(member_count: usize, flags: &Flags) -> TemplateKind {
    if flags.contains(FLAG_DAILY) {
        return TemplateKind::Daily;
    }
    if member_count > WEEKLY_MAX_MEMBERS {
        if flags.contains(FLAG_ADMINISTRATIVE) {
            return TemplateKind::DailyAdministrative;
        }
        return TemplateKind::Daily;
    }
    TemplateKind::Weekly
}

// ============================================================================
// Layouts
// ============================================================================

/// Visual role of a layout cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellStyle {
    Title,
    Label,
    Header,
    /// Bordered cell holding a member value or left empty for handwriting.
    Field,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TemplateCell {
    pub row: u32,
    pub col: u16,
    /// Text with `##SLOT##` tokens; empty for a blank bordered cell.
    pub text: String,
    pub style: CellStyle,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    pub cells: Vec<TemplateCell>,
    pub column_widths: Vec<(u16, f64)>,
    pub landscape: bool,
}

impl Layout {
    fn new(landscape: bool) -> Self {
        Self {
            cells: Vec::new(),
            column_widths: Vec::new(),
            landscape,
        }
    }

    fn put(&mut self, row: u32, col: u16, text: impl Into<String>, style: CellStyle) {
        self.cells.push(TemplateCell {
            row,
            col,
            text: text.into(),
            style,
        });
    }

    /// Every distinct token text used by the layout.
    pub fn tokens(&self) -> Vec<String> {
        let mut out: Vec<String> = self
            .cells
            .iter()
            .flat_map(|c| find_tokens(&c.text))
            .map(str::to_string)
            .collect();
        out.sort();
        out.dedup();
        out
    }
}

/// Token names (without the `##` fences) in order of appearance.
pub fn find_tokens(text: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut rest = text;
    while let Some(start) = rest.find("##") {
        let after = &rest[start + 2..];
        match after.find("##") {
            Some(end) => {
                tokens.push(&after[..end]);
                rest = &after[end + 2..];
            }
            None => break,
        }
    }
    tokens
}

/// Title block shared by every layout. Returns the first free row.
fn header_block(layout: &mut Layout, title: &str) -> u32 {
    layout.put(0, 0, format!("{title} - {}", Slot::SheetTitle), CellStyle::Title);
    layout.put(1, 0, "Sector:", CellStyle::Label);
    layout.put(1, 1, Slot::Sector.to_string(), CellStyle::Label);
    layout.put(2, 0, "Approver:", CellStyle::Label);
    layout.put(
        2,
        1,
        format!("{} ({})", Slot::ApproverName, Slot::ApproverId),
        CellStyle::Label,
    );
    layout.put(3, 0, "Members:", CellStyle::Label);
    layout.put(3, 1, Slot::MemberCount.to_string(), CellStyle::Label);
    5
}

/// Member table: id and name columns followed by blank columns to fill by hand.
fn member_table(layout: &mut Layout, first_row: u32, columns: &[String], capacity: usize) -> u32 {
    layout.put(first_row, 0, "ID", CellStyle::Header);
    layout.put(first_row, 1, "Name", CellStyle::Header);
    for (i, label) in columns.iter().enumerate() {
        layout.put(first_row, 2 + i as u16, label.clone(), CellStyle::Header);
    }
    let mut row = first_row + 1;
    for position in 1..=capacity {
        layout.put(row, 0, Slot::MemberId(position).to_string(), CellStyle::Field);
        layout.put(row, 1, Slot::MemberName(position).to_string(), CellStyle::Field);
        for i in 0..columns.len() {
            layout.put(row, 2 + i as u16, "", CellStyle::Field);
        }
        row += 1;
    }
    row
}

fn signature_block(layout: &mut Layout, row: u32) {
    layout.put(row + 1, 0, "Approved by:", CellStyle::Label);
    layout.put(row + 1, 1, Slot::ApproverName.to_string(), CellStyle::Label);
    layout.put(row + 2, 0, "Signature:", CellStyle::Label);
}

fn weekly_layout() -> Layout {
    let mut layout = Layout::new(true);
    let first = header_block(&mut layout, "Weekly timesheet");
    let days: Vec<String> = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"]
        .iter()
        .map(|d| d.to_string())
        .collect();
    let end = member_table(&mut layout, first, &days, WEEKLY_MAX_MEMBERS);
    signature_block(&mut layout, end);
    layout.column_widths = vec![(0, 12.0), (1, 32.0)];
    layout
        .column_widths
        .extend((2..2 + days.len() as u16).map(|c| (c, 14.0)));
    layout
}

fn daily_layout() -> Layout {
    let mut layout = Layout::new(true);
    let first = header_block(&mut layout, "Daily timesheet");
    let days: Vec<String> = (1..=31).map(|d| d.to_string()).collect();
    let end = member_table(&mut layout, first, &days, DAILY_MAX_MEMBERS);
    signature_block(&mut layout, end);
    layout.column_widths = vec![(0, 10.0), (1, 28.0)];
    layout
        .column_widths
        .extend((2..2 + days.len() as u16).map(|c| (c, 4.0)));
    layout
}

fn daily_administrative_layout() -> Layout {
    let mut layout = Layout::new(false);
    let first = header_block(&mut layout, "Daily timesheet (administrative)");
    let columns: Vec<String> = ["Entry", "Lunch out", "Lunch in", "Exit", "Overtime", "Signature"]
        .iter()
        .map(|c| c.to_string())
        .collect();
    let end = member_table(&mut layout, first, &columns, DAILY_MAX_MEMBERS);
    signature_block(&mut layout, end);
    layout.column_widths = vec![(0, 10.0), (1, 30.0), (7, 24.0)];
    layout.column_widths.extend((2..7).map(|c| (c, 11.0)));
    layout
}
