//! Flat audit log of every rendered row (`dumplist.txt`).
//!
//! One line per employee per run, fields separated by TAB:
//!
//! ```text
//! sector  sheet  approver_name  approver_id  employee_id  employee_name  nickname  flags
//! ```
//!
//! Lines are sorted so two runs over the same roster diff cleanly.

use crate::types::Row;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Fixed file name of the audit log inside the output directory.
pub const AUDIT_FILE_NAME: &str = "dumplist.txt";

const FIELD_SEPARATOR: char = '\t';

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditRow {
    pub sector: String,
    /// Sanitized sheet name.
    pub sheet: String,
    pub approver_name: String,
    pub approver_id: String,
    pub employee_id: String,
    pub employee_name: String,
    pub nickname: String,
    pub flags: Vec<String>,
}

impl AuditRow {
    /// Audit entry for `row` under the group's sanitized title.
    ///
    /// Sector and approver are the row's own, even when the group's document
    /// header shows the first row's values.
    pub fn new(title: &str, row: &Row) -> Self {
        Self {
            sector: row.sector_name.clone(),
            sheet: title.to_string(),
            approver_name: row.approver_name.clone(),
            approver_id: row.approver_id.clone(),
            employee_id: row.employee_id.clone(),
            employee_name: row.employee_name.clone(),
            nickname: row.employee_nickname.clone(),
            flags: row.flags.iter().cloned().collect(),
        }
    }

    /// Serialize as a single line (no terminator).
    pub fn to_line(&self) -> String {
        let flags = self.flags.join(",");
        let fields = [
            self.sector.as_str(),
            self.sheet.as_str(),
            self.approver_name.as_str(),
            self.approver_id.as_str(),
            self.employee_id.as_str(),
            self.employee_name.as_str(),
            self.nickname.as_str(),
            flags.as_str(),
        ];
        fields
            .iter()
            .map(|f| one_line(f))
            .collect::<Vec<_>>()
            .join(&FIELD_SEPARATOR.to_string())
    }
}

/// Replace embedded line breaks and separators so a field cannot split a line.
fn one_line(field: &str) -> String {
    field
        .replace("\r\n", "--")
        .replace(['\n', '\r'], "--")
        .replace(FIELD_SEPARATOR, " ")
}

/// Sorted audit lines.
pub fn sorted_lines(rows: &[AuditRow]) -> Vec<String> {
    let mut lines: Vec<String> = rows.iter().map(AuditRow::to_line).collect();
    lines.sort();
    lines
}

/// Write `rows` to `dir/dumplist.txt`, sorted, one terminated line each.
///
/// An empty slice still creates the (empty) file.
pub fn write_audit_log(dir: &Path, rows: &[AuditRow]) -> io::Result<PathBuf> {
    let path = dir.join(AUDIT_FILE_NAME);
    let mut content = String::new();
    for line in sorted_lines(rows) {
        content.push_str(&line);
        content.push('\n');
    }
    fs::write(&path, content)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::row;
    use tempfile::TempDir;

    fn audit(id: &str, sheet: &str) -> AuditRow {
        let r = row(id, sheet);
        AuditRow::new(sheet, &r)
    }

    #[test]
    fn line_has_eight_tab_separated_fields() {
        let mut r = row("101", "ADM*");
        r.employee_nickname = "Aninha".to_string();
        r.flags.insert("noturno".to_string());
        r.flags.insert("daily".to_string());
        let line = AuditRow::new("ADM", &r).to_line();

        let fields: Vec<&str> = line.split('\t').collect();
        assert_eq!(
            fields,
            vec![
                "Obras",
                "ADM",
                "Carlos Pereira",
                "900",
                "101",
                "Employee 101",
                "Aninha",
                "daily,noturno"
            ]
        );
    }

    #[test]
    fn line_breaks_are_flattened() {
        let mut r = row("1", "A");
        r.sector_name = "Obras\r\nNorte\nLeste".to_string();
        r.employee_name = "Ana\tSouza".to_string();
        let line = AuditRow::new("A", &r).to_line();
        assert!(line.starts_with("Obras--Norte--Leste\t"));
        assert!(line.contains("Ana Souza"));
        assert!(!line.contains('\n'));
    }

    #[test]
    fn approver_and_sector_come_from_the_row() {
        let mut member = row("2", "A*");
        member.approver_name = "Real Approver".to_string();
        member.approver_id = "777".to_string();
        member.sector_name = "Limpeza".to_string();
        let entry = AuditRow::new("A", &member);
        assert_eq!(entry.approver_name, "Real Approver");
        assert_eq!(entry.approver_id, "777");
        assert_eq!(entry.sector, "Limpeza");
        assert_eq!(entry.sheet, "A");
        assert_eq!(entry.employee_id, "2");
    }

    #[test]
    fn written_log_is_sorted() {
        let tmp = TempDir::new().unwrap();
        let rows = vec![audit("3", "B"), audit("1", "C"), audit("2", "A")];
        let path = write_audit_log(tmp.path(), &rows).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines.windows(2).all(|w| w[0] <= w[1]));
        assert!(content.ends_with('\n'));
    }

    #[test]
    fn empty_log_is_created() {
        let tmp = TempDir::new().unwrap();
        let path = write_audit_log(tmp.path(), &[]).unwrap();
        assert_eq!(path.file_name().unwrap(), AUDIT_FILE_NAME);
        assert_eq!(fs::read_to_string(&path).unwrap(), "");
    }
}
