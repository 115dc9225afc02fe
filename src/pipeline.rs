//! Render orchestration: dataset → one document per sheet + audit log.
//!
//! ## Per-Group Steps
//!
//! ```text
//! raw key ──► title / file name ──► collision check
//!        └──► flags_for ──► select_template
//! group  ──► integrity check ──► placeholder::build ──► DocumentRenderer
//!        └──► audit rows (always)
//! ```
//!
//! Rendering is best-effort per group: a collision, a rejected group, an
//! empty group or a renderer failure is recorded in the [`RenderReport`] and
//! the run moves on. The audit log is written once, after every group has
//! been attempted, and always lists every row of the dataset.
//!
//! [`plan`] runs the pure half of the steps without touching the
//! filesystem; `check` prints it and [`render`] executes it.

use crate::audit::{self, AuditRow};
use crate::config::ConflictPolicy;
use crate::dataset::{Dataset, Group, IntegrityIssue};
use crate::document::DocumentRenderer;
use crate::naming;
use crate::placeholder::{self, PlaceholderError};
use crate::template::{TemplateKind, select_template};
use crate::types::Flags;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, error, info, info_span, warn};

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Cannot create output directory {path}: {source}")]
    OutputDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Cannot write audit log {path}: {source}")]
    AuditLog {
        path: PathBuf,
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RenderOptions {
    pub on_conflict: ConflictPolicy,
}

/// Everything decided about a group before any file is written.
#[derive(Debug, Clone)]
pub struct GroupPlan<'a> {
    pub group: Group<'a>,
    pub title: String,
    pub file_name: String,
    pub flags: Flags,
    pub template: TemplateKind,
    /// Raw key of the earlier group that already claimed `file_name`.
    pub collides_with: Option<String>,
    pub issues: Vec<IntegrityIssue>,
}

impl GroupPlan<'_> {
    pub fn key(&self) -> &str {
        self.group.key
    }

    pub fn members(&self) -> usize {
        self.group.len()
    }
}

/// Plan every group of `dataset`, in partition order.
///
/// The first raw key to claim an output file name owns it; every later key
/// mapping to the same name is marked as colliding.
pub fn plan(dataset: &Dataset) -> Vec<GroupPlan<'_>> {
    let mut claimed: HashMap<String, String> = HashMap::new();
    let mut plans = Vec::new();
    for group in dataset.groups() {
        let title = naming::sanitize_title(group.key);
        let file_name = naming::output_file_name(group.key);
        let flags = dataset.flags_for(group.key);
        let template = select_template(group.len(), &flags);
        let collides_with = match claimed.get(&file_name) {
            Some(owner) => Some(owner.clone()),
            None => {
                claimed.insert(file_name.clone(), group.key.to_string());
                None
            }
        };
        let issues = group.integrity_issues();
        plans.push(GroupPlan {
            group,
            title,
            file_name,
            flags,
            template,
            collides_with,
            issues,
        });
    }
    plans
}

/// What happened to one group.
#[derive(Debug, Clone, PartialEq)]
pub enum GroupStatus {
    Rendered(PathBuf),
    RenderFailed { path: PathBuf, error: String },
    EmptyGroup,
    /// Not rendered: another group already owns the output file name.
    NamingCollision { owner: String },
    /// Not rendered: integrity issues under [`ConflictPolicy::Reject`].
    Rejected(Vec<IntegrityIssue>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct GroupOutcome {
    pub key: String,
    pub title: String,
    pub file_name: String,
    pub members: usize,
    pub template: TemplateKind,
    pub status: GroupStatus,
}

impl GroupOutcome {
    pub fn is_rendered(&self) -> bool {
        matches!(self.status, GroupStatus::Rendered(_))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderReport {
    pub groups: Vec<GroupOutcome>,
    pub audit_path: PathBuf,
    pub audit_lines: usize,
}

impl RenderReport {
    pub fn rendered(&self) -> impl Iterator<Item = &GroupOutcome> {
        self.groups.iter().filter(|g| g.is_rendered())
    }

    pub fn failures(&self) -> impl Iterator<Item = &GroupOutcome> {
        self.groups.iter().filter(|g| !g.is_rendered())
    }

    /// True when at least one group produced no document.
    pub fn is_partial(&self) -> bool {
        self.failures().next().is_some()
    }
}

/// Render every group of `dataset` into `output_dir` and write the audit log.
///
/// Only failures to create the output directory or to write the audit log
/// abort the run; per-group failures end up in the report.
pub fn render(
    dataset: &Dataset,
    output_dir: &Path,
    renderer: &dyn DocumentRenderer,
    options: &RenderOptions,
) -> Result<RenderReport, PipelineError> {
    let span = info_span!("render", output = %output_dir.display(), rows = dataset.len());
    let _guard = span.enter();

    fs::create_dir_all(output_dir).map_err(|source| PipelineError::OutputDir {
        path: output_dir.to_path_buf(),
        source,
    })?;

    let mut audit_rows: Vec<AuditRow> = Vec::with_capacity(dataset.len());
    let mut outcomes = Vec::new();

    for group_plan in plan(dataset) {
        let path = output_dir.join(&group_plan.file_name);
        let status = render_group(&group_plan, &path, renderer, options);

        audit_rows.extend(
            group_plan
                .group
                .rows
                .iter()
                .map(|row| AuditRow::new(&group_plan.title, row)),
        );

        outcomes.push(GroupOutcome {
            key: group_plan.key().to_string(),
            title: group_plan.title.clone(),
            file_name: group_plan.file_name.clone(),
            members: group_plan.members(),
            template: group_plan.template,
            status,
        });
    }

    let audit_path = output_dir.join(audit::AUDIT_FILE_NAME);
    audit::write_audit_log(output_dir, &audit_rows).map_err(|source| PipelineError::AuditLog {
        path: audit_path.clone(),
        source,
    })?;

    let report = RenderReport {
        groups: outcomes,
        audit_path,
        audit_lines: audit_rows.len(),
    };
    let failed = report.failures().count();
    if failed > 0 {
        warn!(
            groups = report.groups.len(),
            failed,
            "run was partial: some groups produced no document"
        );
    } else {
        info!(groups = report.groups.len(), "all groups rendered");
    }
    Ok(report)
}

fn render_group(
    plan: &GroupPlan<'_>,
    path: &Path,
    renderer: &dyn DocumentRenderer,
    options: &RenderOptions,
) -> GroupStatus {
    let key = plan.key();

    if let Some(owner) = &plan.collides_with {
        error!(
            group = key,
            owner = %owner,
            path = %path.display(),
            "naming collision: output already claimed by another group, not rendering"
        );
        return GroupStatus::NamingCollision {
            owner: owner.clone(),
        };
    }

    if let Err(e) = remove_stale_output(path) {
        error!(
            group = key,
            path = %path.display(),
            error = %e,
            "cannot remove previous output, skipping group"
        );
        return GroupStatus::RenderFailed {
            path: path.to_path_buf(),
            error: e.to_string(),
        };
    }

    for issue in &plan.issues {
        warn!(group = key, issue = %issue, "group integrity issue");
    }
    if !plan.issues.is_empty() && options.on_conflict == ConflictPolicy::Reject {
        error!(
            group = key,
            issues = plan.issues.len(),
            "group rejected due to integrity issues"
        );
        return GroupStatus::Rejected(plan.issues.clone());
    }

    let placeholders = match placeholder::build(&plan.group) {
        Ok(map) => map,
        Err(PlaceholderError::EmptyGroup(_)) => {
            error!(group = key, "group has no members, skipping");
            return GroupStatus::EmptyGroup;
        }
    };

    debug!(
        group = key,
        template = %plan.template,
        members = plan.members(),
        path = %path.display(),
        "rendering group"
    );
    match renderer.render(plan.template, &placeholders, path) {
        Ok(()) => GroupStatus::Rendered(path.to_path_buf()),
        Err(e) => {
            error!(
                group = key,
                template = %plan.template,
                path = %path.display(),
                error = %e,
                "template render failed, skipping group"
            );
            GroupStatus::RenderFailed {
                path: path.to_path_buf(),
                error: e.to_string(),
            }
        }
    }
}

/// Delete a document left by an earlier run, so a group that fails now
/// cannot leave an outdated file next to a report saying it failed.
fn remove_stale_output(path: &Path) -> std::io::Result<()> {
    match fs::remove_file(path) {
        Ok(()) => {
            debug!(path = %path.display(), "removed previous output");
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::backend::tests::MockRenderer;
    use crate::test_helpers::{dataset, row};
    use crate::types::Row;
    use tempfile::TempDir;

    fn run(ds: &Dataset, renderer: &MockRenderer) -> (TempDir, RenderReport) {
        let tmp = TempDir::new().unwrap();
        let report = render(ds, tmp.path(), renderer, &RenderOptions::default()).unwrap();
        (tmp, report)
    }

    fn audit_lines(report: &RenderReport) -> Vec<String> {
        fs::read_to_string(&report.audit_path)
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }

    fn many(sheet: &str, count: usize) -> Vec<Row> {
        (1..=count).map(|i| row(&format!("{sheet}-{i}"), sheet)).collect()
    }

    // =========================================================================
    // plan
    // =========================================================================

    #[test]
    fn plan_selects_templates_per_group() {
        let mut rows = many("SMALL", 3);
        rows.extend(many("BIG", 7));
        rows.extend(many("ADM*", 8));
        rows.extend(many("PORT!", 2));
        let ds = Dataset::new(rows);

        let plans = plan(&ds);
        let kinds: Vec<(&str, TemplateKind)> =
            plans.iter().map(|p| (p.key(), p.template)).collect();
        assert_eq!(
            kinds,
            vec![
                ("SMALL", TemplateKind::Weekly),
                ("BIG", TemplateKind::Daily),
                ("ADM*", TemplateKind::DailyAdministrative),
                ("PORT!", TemplateKind::Daily),
            ]
        );
        assert_eq!(plans[2].title, "ADM");
        assert_eq!(plans[2].file_name, "ADM.XLSX");
    }

    #[test]
    fn plan_marks_later_collisions() {
        let ds = dataset(&[("1", "Portaria"), ("2", "PORTARIA*"), ("3", "portaria!")]);
        let plans = plan(&ds);
        assert_eq!(plans[0].collides_with, None);
        assert_eq!(plans[1].collides_with.as_deref(), Some("Portaria"));
        assert_eq!(plans[2].collides_with.as_deref(), Some("Portaria"));
    }

    // =========================================================================
    // render
    // =========================================================================

    #[test]
    fn render_calls_renderer_per_group_in_order() {
        let ds = dataset(&[("1", "B"), ("2", "A"), ("3", "B")]);
        let renderer = MockRenderer::new();
        let (tmp, report) = run(&ds, &renderer);

        let calls = renderer.get_calls();
        let titles: Vec<&str> = calls.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, vec!["B", "A"]);
        assert_eq!(calls[0].members, 2);
        assert_eq!(
            calls[0].output,
            tmp.path().join("B.XLSX").to_string_lossy()
        );
        assert!(!report.is_partial());
        assert_eq!(report.rendered().count(), 2);
    }

    #[test]
    fn render_writes_one_audit_line_per_row() {
        let ds = dataset(&[("3", "B"), ("1", "A"), ("2", "B")]);
        let (_tmp, report) = run(&ds, &MockRenderer::new());

        let lines = audit_lines(&report);
        assert_eq!(lines.len(), 3);
        assert_eq!(report.audit_lines, 3);
        assert!(lines.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn render_failure_is_local_to_group() {
        let ds = dataset(&[("1", "A"), ("2", "B"), ("3", "C")]);
        let renderer = MockRenderer::failing_on(&["B"]);
        let (_tmp, report) = run(&ds, &renderer);

        assert_eq!(renderer.get_calls().len(), 3);
        assert!(report.is_partial());
        let failed: Vec<&str> = report.failures().map(|g| g.key.as_str()).collect();
        assert_eq!(failed, vec!["B"]);
        assert!(matches!(
            report.groups[1].status,
            GroupStatus::RenderFailed { .. }
        ));
        // failed group still reaches the audit log
        let lines = audit_lines(&report);
        assert_eq!(lines.len(), 3);
        assert!(lines.iter().any(|l| l.contains("\tB\t")));
    }

    #[test]
    fn failed_group_leaves_no_previous_document() {
        let tmp = TempDir::new().unwrap();
        let previous = tmp.path().join("B.XLSX");
        fs::write(&previous, b"last week").unwrap();
        let ds = dataset(&[("1", "A"), ("2", "B")]);
        let renderer = MockRenderer::failing_on(&["B"]);

        let report = render(&ds, tmp.path(), &renderer, &RenderOptions::default()).unwrap();

        assert!(matches!(
            report.groups[1].status,
            GroupStatus::RenderFailed { .. }
        ));
        assert!(!previous.exists());
    }

    #[test]
    fn rejected_group_leaves_no_previous_document() {
        let tmp = TempDir::new().unwrap();
        let previous = tmp.path().join("A.XLSX");
        fs::write(&previous, b"last week").unwrap();
        let mut other = row("2", "A");
        other.shift = "noite".to_string();
        let ds = Dataset::new(vec![row("1", "A"), other]);
        let options = RenderOptions {
            on_conflict: ConflictPolicy::Reject,
        };

        let report = render(&ds, tmp.path(), &MockRenderer::new(), &options).unwrap();

        assert!(matches!(report.groups[0].status, GroupStatus::Rejected(_)));
        assert!(!previous.exists());
    }

    #[test]
    fn collision_does_not_touch_owners_document() {
        let tmp = TempDir::new().unwrap();
        let ds = dataset(&[("1", "Portaria"), ("2", "PORTARIA*")]);
        // owner renders first, then the colliding group must leave its file alone
        struct Writing;
        impl DocumentRenderer for Writing {
            fn render(
                &self,
                _kind: TemplateKind,
                _placeholders: &crate::placeholder::PlaceholderMap,
                output: &Path,
            ) -> Result<(), crate::document::RenderError> {
                fs::write(output, b"owner")?;
                Ok(())
            }
        }

        render(&ds, tmp.path(), &Writing, &RenderOptions::default()).unwrap();

        assert_eq!(fs::read(tmp.path().join("PORTARIA.XLSX")).unwrap(), b"owner");
    }

    #[test]
    fn render_collision_keeps_first_group() {
        let ds = dataset(&[("1", "Portaria"), ("2", "PORTARIA*")]);
        let renderer = MockRenderer::new();
        let (_tmp, report) = run(&ds, &renderer);

        assert_eq!(renderer.get_calls().len(), 1);
        assert_eq!(
            report.groups[1].status,
            GroupStatus::NamingCollision {
                owner: "Portaria".to_string()
            }
        );
        assert_eq!(audit_lines(&report).len(), 2);
    }

    #[test]
    fn render_conflict_warns_by_default() {
        let mut other = row("2", "A");
        other.approver_id = "777".to_string();
        let ds = Dataset::new(vec![row("1", "A"), other]);
        let renderer = MockRenderer::new();
        let (_tmp, report) = run(&ds, &renderer);

        assert!(report.groups[0].is_rendered());
        assert_eq!(renderer.get_calls().len(), 1);
    }

    #[test]
    fn audit_rows_keep_each_members_own_approver() {
        let mut other = row("2", "A");
        other.approver_name = "Real Approver".to_string();
        other.approver_id = "777".to_string();
        other.sector_name = "Limpeza".to_string();
        let ds = Dataset::new(vec![row("1", "A"), other]);
        let (_tmp, report) = run(&ds, &MockRenderer::new());

        let lines = audit_lines(&report);
        assert_eq!(
            lines,
            vec![
                "Limpeza\tA\tReal Approver\t777\t2\tEmployee 2\t\t".to_string(),
                "Obras\tA\tCarlos Pereira\t900\t1\tEmployee 1\t\t".to_string(),
            ]
        );
    }

    #[test]
    fn render_conflict_rejected_when_configured() {
        let mut other = row("2", "A");
        other.shift = "noite".to_string();
        let ds = Dataset::new(vec![row("1", "A"), other, row("3", "B")]);
        let renderer = MockRenderer::new();
        let tmp = TempDir::new().unwrap();
        let options = RenderOptions {
            on_conflict: ConflictPolicy::Reject,
        };
        let report = render(&ds, tmp.path(), &renderer, &options).unwrap();

        assert!(matches!(report.groups[0].status, GroupStatus::Rejected(_)));
        assert!(report.groups[1].is_rendered());
        assert_eq!(renderer.get_calls().len(), 1);
        assert_eq!(report.audit_lines, 3);
    }

    #[test]
    fn render_empty_dataset_writes_empty_log() {
        let renderer = MockRenderer::new();
        let (_tmp, report) = run(&Dataset::default(), &renderer);

        assert!(report.groups.is_empty());
        assert!(renderer.get_calls().is_empty());
        assert!(report.audit_path.exists());
        assert_eq!(fs::read_to_string(&report.audit_path).unwrap(), "");
        assert!(!report.is_partial());
    }

    #[test]
    fn render_creates_output_directory() {
        let tmp = TempDir::new().unwrap();
        let out = tmp.path().join("nested").join("out");
        let ds = dataset(&[("1", "A")]);
        let report = render(&ds, &out, &MockRenderer::new(), &RenderOptions::default()).unwrap();
        assert!(out.is_dir());
        assert_eq!(report.audit_path, out.join("dumplist.txt"));
    }
}
