//! CLI output formatting for `check` and `render`.
//!
//! # Information-First Display
//!
//! Every sheet is shown by its positional index and sanitized title, with
//! the raw key, template and output file as indented context lines, so the
//! output reads as an inventory of the roster rather than a file listing.
//!
//! # Output Format
//!
//! ## Check
//!
//! ```text
//! Sheets
//! 001 ADM (8 members)
//!     Key: ADM*
//!     Template: daily-administrative
//!     Flags: administrative
//!     Output: ADM.XLSX
//!
//! 8 rows in 1 sheet
//! ```
//!
//! ## Render
//!
//! ```text
//! 001 ADM → ADM.XLSX (daily-administrative, 8 members)
//! 002 PORTARIA: naming collision with "Portaria"
//!
//! Audit log: out/dumplist.txt (10 lines)
//! Rendered 1 of 2 sheets
//! Run was partial: 1 sheet without a document
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout.

use crate::pipeline::{GroupPlan, GroupStatus, RenderReport};

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{n} {word}")
    } else {
        format!("{n} {word}s")
    }
}

// ============================================================================
// check
// ============================================================================

/// Format the planned groups of a roster without rendering anything.
pub fn format_check_output(plans: &[GroupPlan<'_>], total_rows: usize) -> Vec<String> {
    let mut lines = vec!["Sheets".to_string()];

    for (i, plan) in plans.iter().enumerate() {
        lines.push(format!(
            "{} {} ({})",
            format_index(i + 1),
            plan.title,
            plural(plan.members(), "member")
        ));
        if plan.key() != plan.title {
            lines.push(format!("    Key: {}", plan.key()));
        }
        lines.push(format!("    Template: {}", plan.template));
        if !plan.flags.is_empty() {
            let flags: Vec<&str> = plan.flags.iter().map(String::as_str).collect();
            lines.push(format!("    Flags: {}", flags.join(", ")));
        }
        lines.push(format!("    Output: {}", plan.file_name));
        if let Some(owner) = &plan.collides_with {
            lines.push(format!("    Collision: same file as {owner:?}"));
        }
        for issue in &plan.issues {
            lines.push(format!("    Issue: {issue}"));
        }
    }

    lines.push(String::new());
    lines.push(format!(
        "{} in {}",
        plural(total_rows, "row"),
        plural(plans.len(), "sheet")
    ));
    lines
}

/// Print check output to stdout.
pub fn print_check_output(plans: &[GroupPlan<'_>], total_rows: usize) {
    for line in format_check_output(plans, total_rows) {
        println!("{}", line);
    }
}

// ============================================================================
// render
// ============================================================================

/// Format the outcome of a render run, one entry per sheet plus a summary.
pub fn format_render_report(report: &RenderReport) -> Vec<String> {
    let mut lines = Vec::new();

    for (i, group) in report.groups.iter().enumerate() {
        let index = format_index(i + 1);
        let line = match &group.status {
            GroupStatus::Rendered(_) => format!(
                "{} {} \u{2192} {} ({}, {})",
                index,
                group.title,
                group.file_name,
                group.template,
                plural(group.members, "member")
            ),
            GroupStatus::RenderFailed { error, .. } => format!(
                "{} {}: {} template failed: {}",
                index, group.title, group.template, error
            ),
            GroupStatus::EmptyGroup => format!("{} {}: no members", index, group.title),
            GroupStatus::NamingCollision { owner } => {
                format!("{} {}: naming collision with {:?}", index, group.title, owner)
            }
            GroupStatus::Rejected(issues) => format!(
                "{} {}: rejected ({})",
                index,
                group.title,
                plural(issues.len(), "integrity issue")
            ),
        };
        lines.push(line);
    }

    let rendered = report.rendered().count();
    let failed = report.groups.len() - rendered;
    lines.push(String::new());
    lines.push(format!(
        "Audit log: {} ({})",
        report.audit_path.display(),
        plural(report.audit_lines, "line")
    ));
    lines.push(format!(
        "Rendered {} of {}",
        rendered,
        plural(report.groups.len(), "sheet")
    ));
    if failed > 0 {
        lines.push(format!(
            "Run was partial: {} without a document",
            plural(failed, "sheet")
        ));
    }
    lines
}

/// Print render output to stdout.
pub fn print_render_report(report: &RenderReport) {
    for line in format_render_report(report) {
        println!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Dataset;
    use crate::pipeline::{GroupOutcome, plan};
    use crate::template::TemplateKind;
    use crate::test_helpers::{dataset, row};
    use std::path::PathBuf;

    fn outcome(title: &str, status: GroupStatus) -> GroupOutcome {
        GroupOutcome {
            key: title.to_string(),
            title: title.to_string(),
            file_name: format!("{title}.XLSX"),
            members: 2,
            template: TemplateKind::Weekly,
            status,
        }
    }

    #[test]
    fn format_index_pads() {
        assert_eq!(format_index(1), "001");
        assert_eq!(format_index(42), "042");
    }

    #[test]
    fn check_output_lists_sheets() {
        let ds = dataset(&[("1", "ADM*"), ("2", "ADM*"), ("3", "Portaria")]);
        let plans = plan(&ds);
        let lines = format_check_output(&plans, ds.len());

        assert_eq!(lines[0], "Sheets");
        assert_eq!(lines[1], "001 ADM (2 members)");
        assert!(lines.contains(&"    Key: ADM*".to_string()));
        assert!(lines.contains(&"    Flags: administrative".to_string()));
        assert!(lines.contains(&"    Output: ADM.XLSX".to_string()));
        assert!(lines.contains(&"002 Portaria (1 member)".to_string()));
        assert_eq!(lines.last().unwrap(), "3 rows in 2 sheets");
    }

    #[test]
    fn check_output_shows_collisions_and_issues() {
        let mut other = row("2", "A");
        other.shift = "noite".to_string();
        let ds = Dataset::new(vec![row("1", "A"), other, row("3", "a")]);
        let plans = plan(&ds);
        let lines = format_check_output(&plans, ds.len());

        assert!(lines.iter().any(|l| l.starts_with("    Issue: employee 2: shift")));
        assert!(lines.contains(&"    Collision: same file as \"A\"".to_string()));
    }

    #[test]
    fn render_report_summarizes_outcomes() {
        let report = RenderReport {
            groups: vec![
                outcome("ADM", GroupStatus::Rendered(PathBuf::from("out/ADM.XLSX"))),
                outcome(
                    "BIG",
                    GroupStatus::RenderFailed {
                        path: PathBuf::from("out/BIG.XLSX"),
                        error: "boom".to_string(),
                    },
                ),
                outcome(
                    "Portaria",
                    GroupStatus::NamingCollision {
                        owner: "PORTARIA".to_string(),
                    },
                ),
            ],
            audit_path: PathBuf::from("out/dumplist.txt"),
            audit_lines: 6,
        };
        let lines = format_render_report(&report);

        assert_eq!(lines[0], "001 ADM \u{2192} ADM.XLSX (weekly, 2 members)");
        assert_eq!(lines[1], "002 BIG: weekly template failed: boom");
        assert_eq!(lines[2], "003 Portaria: naming collision with \"PORTARIA\"");
        assert!(lines.contains(&"Audit log: out/dumplist.txt (6 lines)".to_string()));
        assert!(lines.contains(&"Rendered 1 of 3 sheets".to_string()));
        assert_eq!(lines.last().unwrap(), "Run was partial: 2 sheets without a document");
    }

    #[test]
    fn render_report_complete_run_has_no_partial_line() {
        let report = RenderReport {
            groups: vec![outcome("A", GroupStatus::Rendered(PathBuf::from("A.XLSX")))],
            audit_path: PathBuf::from("dumplist.txt"),
            audit_lines: 1,
        };
        let lines = format_render_report(&report);
        assert_eq!(lines.last().unwrap(), "Rendered 1 of 1 sheet");
    }
}
