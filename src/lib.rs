//! # Roster Sheets
//!
//! Renders a workforce-assignment roster (CSV or XLSX) into one timesheet
//! workbook per sheet name, plus a flat audit log of every rendered row.
//!
//! # Architecture: Load, Plan, Render
//!
//! ```text
//! 1. Load     roster.csv / .xlsx  →  Dataset          (rows, owned)
//! 2. Plan     Dataset             →  Vec<GroupPlan>   (pure: titles, templates, collisions)
//! 3. Render   GroupPlan           →  out/*.XLSX       (best-effort per sheet)
//!             all rows            →  out/dumplist.txt (always, sorted)
//! ```
//!
//! Planning is pure so `check` can show exactly what `render` would do, and
//! so the template policy and naming rules are testable without a
//! filesystem. The renderer sits behind a trait; unit tests use a recording
//! mock and integration tests use the real `.xlsx` writer.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`source`] | Loader table (lock file / xlsx / csv) and positional row mapping |
//! | [`dataset`] | Stable partitioning, group views, flag lookup, integrity checks |
//! | [`naming`] | Sheet-name convention: markers, sanitized titles, output file names |
//! | [`template`] | Template kinds, the selection policy, sheet layouts |
//! | [`placeholder`] | `##SLOT##` vocabulary and the per-group mapping builder |
//! | [`document`] | Renderer trait, token filling, `rust_xlsxwriter` backend |
//! | [`audit`] | `dumplist.txt` rows and the sorted writer |
//! | [`pipeline`] | Planning and the render orchestrator |
//! | [`config`] | `config.toml` loading over stock defaults |
//! | [`types`] | `Row` and the group-level flag names |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Sheet Name Markers
//!
//! Sheet names carry flags as embedded characters (`*` administrative,
//! `!` daily). The raw name is the grouping key and the flag source; the
//! sanitized name is the printed title and the file name. [`naming`] is the
//! only place that knows the convention.
//!
//! ## Best-Effort Rendering
//!
//! A bad sheet never stops the run. Collisions, integrity rejections and
//! renderer failures are collected in a [`pipeline::RenderReport`], and the
//! audit log lists every row whatever happened to its sheet, so the log can
//! always be reconciled against the input.
//!
//! ## Logging
//!
//! Library code emits `tracing` events with structured fields (`group`,
//! `template`, `path`); installing a subscriber is left to the binary.

pub mod audit;
pub mod config;
pub mod dataset;
pub mod document;
pub mod naming;
pub mod output;
pub mod pipeline;
pub mod placeholder;
pub mod source;
pub mod template;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
