//! Document renderer trait and shared error type.
//!
//! The production implementation is
//! [`XlsxRenderer`](super::xlsx_backend::XlsxRenderer).

use crate::placeholder::PlaceholderMap;
use crate::template::TemplateKind;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("XLSX error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),
    #[error("{kind} template holds {capacity} members, group has {members}")]
    CapacityExceeded {
        kind: TemplateKind,
        capacity: usize,
        members: usize,
    },
}

/// Writes one document per call.
///
/// A failure is reported through [`RenderError`] and concerns only the
/// document being written; callers keep going with the next one.
pub trait DocumentRenderer {
    fn render(
        &self,
        kind: TemplateKind,
        placeholders: &PlaceholderMap,
        output: &Path,
    ) -> Result<(), RenderError>;
}
