//! Document rendering: filled placeholder maps → `.xlsx` files.
//!
//! | Step | Where |
//! |---|---|
//! | **Token substitution** | [`fill`]: pure text/number filling of layout cells |
//! | **Renderer seam** | [`DocumentRenderer`] trait + [`RenderError`] |
//! | **Workbook writer** | [`XlsxRenderer`] via `rust_xlsxwriter` |
//!
//! The pipeline only sees the trait, so tests swap in a recording mock.

pub mod backend;
pub mod fill;
pub mod xlsx_backend;

pub use backend::{DocumentRenderer, RenderError};
pub use fill::{CellValue, fill_cell};
pub use xlsx_backend::XlsxRenderer;
