//! Shared test utilities for the roster-sheets test suite.
//!
//! Rows built here share one approver, sector and shift so groups are clean
//! unless a test changes a field on purpose:
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let ds = dataset(&[("101", "ADM*"), ("102", "ADM*"), ("201", "Portaria")]);
//! assert_eq!(ds.groups().len(), 2);
//! ```

use crate::dataset::Dataset;
use crate::types::Row;

/// A member row of sheet `sheet` with default header fields.
pub fn row(employee_id: &str, sheet: &str) -> Row {
    Row {
        employee_id: employee_id.to_string(),
        employee_name: format!("Employee {employee_id}"),
        employee_nickname: String::new(),
        approver_name: "Carlos Pereira".to_string(),
        approver_id: "900".to_string(),
        sector_name: "Obras".to_string(),
        sheet_name: sheet.to_string(),
        shift: "manha".to_string(),
        substitutes: Vec::new(),
        flags: Default::default(),
    }
}

/// Dataset from `(employee_id, sheet)` pairs, in the given order.
pub fn dataset(rows: &[(&str, &str)]) -> Dataset {
    Dataset::new(rows.iter().map(|(id, sheet)| row(id, sheet)).collect())
}
