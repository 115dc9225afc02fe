//! In-memory roster and its grouping operations.
//!
//! A [`Dataset`] owns every [`Row`] loaded from the source. Grouping never
//! copies rows: [`Partition`] and [`Group`] hold references into the dataset.
//!
//! ## Stable Partitioning
//!
//! [`Dataset::split_by`] keeps rows in input order inside each group, and
//! groups in order of their key's first appearance:
//!
//! ```text
//! rows:   A1 B1 A2 C1 B2
//! groups: A → [A1, A2]   B → [B1, B2]   C → [C1]
//! ```
//!
//! Callers that want key order ask for it with [`Partition::sorted_by_key`].

use crate::naming;
use crate::types::{Flags, GROUP_FLAGS, Row};
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::hash::Hash;

/// All rows of one roster.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    rows: Vec<Row>,
}

impl Dataset {
    pub fn new(rows: Vec<Row>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Stable partition of the rows by `key`.
    pub fn split_by<'a, K, F>(&'a self, key: F) -> Partition<'a, K>
    where
        K: Eq + Hash + Clone,
        F: Fn(&'a Row) -> K,
    {
        let mut index: HashMap<K, usize> = HashMap::new();
        let mut groups: Vec<(K, Vec<&Row>)> = Vec::new();
        for row in &self.rows {
            let k = key(row);
            match index.get(&k) {
                Some(&pos) => groups[pos].1.push(row),
                None => {
                    index.insert(k.clone(), groups.len());
                    groups.push((k, vec![row]));
                }
            }
        }
        Partition { groups, index }
    }

    /// Rows grouped by raw sheet name, in order of first appearance.
    pub fn groups(&self) -> Vec<Group<'_>> {
        self.split_by(|row| row.sheet_name.as_str())
            .into_iter()
            .map(|(key, rows)| Group { key, rows })
            .collect()
    }

    /// Flags declared for a raw sheet name.
    ///
    /// Markers embedded in the name (see [`naming::key_flags`]) are united
    /// with the group-level tags found in the flags column of rows carrying
    /// that exact name. Unknown names yield an empty set.
    pub fn flags_for(&self, raw_key: &str) -> Flags {
        let mut flags = naming::key_flags(raw_key);
        for row in self.rows.iter().filter(|r| r.sheet_name == raw_key) {
            flags.extend(
                row.flags
                    .iter()
                    .filter(|f| GROUP_FLAGS.contains(&f.as_str()))
                    .cloned(),
            );
        }
        flags
    }
}

/// Result of [`Dataset::split_by`]: keys in first-appearance order.
#[derive(Debug)]
pub struct Partition<'a, K> {
    groups: Vec<(K, Vec<&'a Row>)>,
    index: HashMap<K, usize>,
}

impl<'a, K: Eq + Hash + Clone> Partition<'a, K> {
    /// Number of groups.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Total rows across all groups; always equals the dataset's length.
    pub fn row_count(&self) -> usize {
        self.groups.iter().map(|(_, rows)| rows.len()).sum()
    }

    pub fn get(&self, key: &K) -> Option<&[&'a Row]> {
        self.index.get(key).map(|&pos| self.groups[pos].1.as_slice())
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.groups.iter().map(|(k, _)| k)
    }

    /// Groups ordered by key instead of first appearance.
    pub fn sorted_by_key(mut self) -> Vec<(K, Vec<&'a Row>)>
    where
        K: Ord,
    {
        self.groups.sort_by(|a, b| a.0.cmp(&b.0));
        self.groups
    }
}

impl<'a, K> IntoIterator for Partition<'a, K> {
    type Item = (K, Vec<&'a Row>);
    type IntoIter = std::vec::IntoIter<(K, Vec<&'a Row>)>;

    fn into_iter(self) -> Self::IntoIter {
        self.groups.into_iter()
    }
}

/// Rows sharing one raw sheet name.
#[derive(Debug, Clone)]
pub struct Group<'a> {
    /// Raw sheet name, markers included.
    pub key: &'a str,
    pub rows: Vec<&'a Row>,
}

impl<'a> Group<'a> {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Header row: approver, sector and shift are read from the first member.
    pub fn header(&self) -> Option<&'a Row> {
        self.rows.first().copied()
    }

    /// Disagreements between members that the header row hides.
    pub fn integrity_issues(&self) -> Vec<IntegrityIssue> {
        let Some(first) = self.header() else {
            return Vec::new();
        };
        let mut issues = Vec::new();
        let mut seen_ids = BTreeSet::new();
        for row in &self.rows {
            if row.approver_name != first.approver_name || row.approver_id != first.approver_id {
                issues.push(IntegrityIssue::ApproverMismatch {
                    employee_id: row.employee_id.clone(),
                    expected: first.approver_id.clone(),
                    found: row.approver_id.clone(),
                });
            }
            if row.sector_name != first.sector_name {
                issues.push(IntegrityIssue::SectorMismatch {
                    employee_id: row.employee_id.clone(),
                    expected: first.sector_name.clone(),
                    found: row.sector_name.clone(),
                });
            }
            if row.shift != first.shift {
                issues.push(IntegrityIssue::ShiftMismatch {
                    employee_id: row.employee_id.clone(),
                    expected: first.shift.clone(),
                    found: row.shift.clone(),
                });
            }
            if !seen_ids.insert(row.employee_id.as_str()) {
                issues.push(IntegrityIssue::DuplicateEmployee(row.employee_id.clone()));
            }
        }
        issues
    }
}

/// A member row disagreeing with its group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntegrityIssue {
    ApproverMismatch {
        employee_id: String,
        expected: String,
        found: String,
    },
    SectorMismatch {
        employee_id: String,
        expected: String,
        found: String,
    },
    ShiftMismatch {
        employee_id: String,
        expected: String,
        found: String,
    },
    DuplicateEmployee(String),
}

impl fmt::Display for IntegrityIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IntegrityIssue::ApproverMismatch {
                employee_id,
                expected,
                found,
            } => write!(
                f,
                "employee {employee_id}: approver {found:?} differs from {expected:?}"
            ),
            IntegrityIssue::SectorMismatch {
                employee_id,
                expected,
                found,
            } => write!(
                f,
                "employee {employee_id}: sector {found:?} differs from {expected:?}"
            ),
            IntegrityIssue::ShiftMismatch {
                employee_id,
                expected,
                found,
            } => write!(
                f,
                "employee {employee_id}: shift {found:?} differs from {expected:?}"
            ),
            IntegrityIssue::DuplicateEmployee(id) => write!(f, "employee {id} listed twice"),
        }
    }
}
