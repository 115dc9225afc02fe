//! `.xlsx` renderer built on `rust_xlsxwriter`.
//!
//! Each document holds a single worksheet named after the sheet title. The
//! layout of the selected [`TemplateKind`] is walked cell by cell and every
//! cell is filled from the placeholder map before it is written.

use super::backend::{DocumentRenderer, RenderError};
use super::fill::{CellValue, fill_cell};
use crate::naming;
use crate::placeholder::{PlaceholderMap, Slot};
use crate::template::{CellStyle, TemplateKind};
use rust_xlsxwriter::{Format, FormatAlign, FormatBorder, Workbook};
use std::path::Path;

const FONT_NAME: &str = "Times New Roman";
const FONT_SIZE: u16 = 11;

/// One format per [`CellStyle`].
struct CellFormats {
    title: Format,
    label: Format,
    header: Format,
    field: Format,
}

impl CellFormats {
    fn new() -> Self {
        let base = Format::new()
            .set_font_name(FONT_NAME)
            .set_font_size(FONT_SIZE)
            .set_align(FormatAlign::VerticalCenter);
        Self {
            title: base.clone().set_bold().set_font_size(14),
            label: base.clone(),
            header: base
                .clone()
                .set_bold()
                .set_align(FormatAlign::Center)
                .set_border(FormatBorder::Thin)
                .set_background_color("#D9D9D9"),
            field: base.set_border(FormatBorder::Thin),
        }
    }

    fn get(&self, style: CellStyle) -> &Format {
        match style {
            CellStyle::Title => &self.title,
            CellStyle::Label => &self.label,
            CellStyle::Header => &self.header,
            CellStyle::Field => &self.field,
        }
    }
}

/// Production renderer writing Excel workbooks.
#[derive(Debug, Default, Clone, Copy)]
pub struct XlsxRenderer;

impl XlsxRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl DocumentRenderer for XlsxRenderer {
    fn render(
        &self,
        kind: TemplateKind,
        placeholders: &PlaceholderMap,
        output: &Path,
    ) -> Result<(), RenderError> {
        let members = placeholders.member_count();
        if members > kind.capacity() {
            return Err(RenderError::CapacityExceeded {
                kind,
                capacity: kind.capacity(),
                members,
            });
        }

        let layout = kind.layout();
        let formats = CellFormats::new();
        let title = placeholders
            .get(Slot::SheetTitle)
            .map(|v| v.to_string())
            .unwrap_or_default();

        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(naming::worksheet_name(&title))?;
        if layout.landscape {
            worksheet.set_landscape();
        }
        for &(col, width) in &layout.column_widths {
            worksheet.set_column_width(col, width)?;
        }

        for cell in &layout.cells {
            let format = formats.get(cell.style);
            match fill_cell(&cell.text, placeholders) {
                CellValue::Blank => {
                    worksheet.write_blank(cell.row, cell.col, format)?;
                }
                CellValue::Text(text) => {
                    worksheet.write_string_with_format(cell.row, cell.col, &text, format)?;
                }
                CellValue::Number(n) => {
                    worksheet.write_number_with_format(cell.row, cell.col, n, format)?;
                }
            }
        }

        workbook.save(output)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::{Data, Reader, Xlsx, open_workbook};
    use tempfile::TempDir;

    fn map_with_members(title: &str, count: usize) -> PlaceholderMap {
        let mut map = PlaceholderMap::default();
        map.insert_text(Slot::Sector, "Obras");
        map.insert_text(Slot::SheetTitle, title);
        map.insert_text(Slot::ApproverName, "Carlos Pereira");
        map.insert_text(Slot::ApproverId, "900");
        map.insert_number(Slot::MemberCount, count as i64);
        for i in 1..=count {
            map.insert_text(Slot::MemberName(i), format!("Employee {i}"));
            map.insert_text(Slot::MemberId(i), format!("{}", 100 + i));
        }
        map
    }

    fn sheet_texts(path: &Path) -> (Vec<String>, Vec<String>) {
        let mut workbook: Xlsx<_> = open_workbook(path).unwrap();
        let names = workbook.sheet_names().to_vec();
        let range = workbook.worksheet_range_at(0).unwrap().unwrap();
        let texts = range
            .rows()
            .flatten()
            .filter(|c| !matches!(c, Data::Empty))
            .map(|c| c.to_string())
            .collect();
        (names, texts)
    }

    #[test]
    fn renders_weekly_workbook() {
        let tmp = TempDir::new().unwrap();
        let out = tmp.path().join("ADM.XLSX");

        XlsxRenderer::new()
            .render(TemplateKind::Weekly, &map_with_members("ADM", 2), &out)
            .unwrap();

        let (names, texts) = sheet_texts(&out);
        assert_eq!(names, vec!["ADM"]);
        assert!(texts.contains(&"Weekly timesheet - ADM".to_string()));
        assert!(texts.contains(&"Carlos Pereira (900)".to_string()));
        assert!(texts.contains(&"Employee 2".to_string()));
        assert!(texts.contains(&"102".to_string()));
        assert!(!texts.iter().any(|t| t.contains("##")));
    }

    #[test]
    fn renders_daily_administrative_workbook() {
        let tmp = TempDir::new().unwrap();
        let out = tmp.path().join("ESCRITORIO.XLSX");

        XlsxRenderer::new()
            .render(
                TemplateKind::DailyAdministrative,
                &map_with_members("ESCRITORIO", 9),
                &out,
            )
            .unwrap();

        let (_, texts) = sheet_texts(&out);
        assert!(texts.contains(&"Daily timesheet (administrative) - ESCRITORIO".to_string()));
        assert!(texts.contains(&"Employee 9".to_string()));
        assert!(!texts.contains(&"Employee 10".to_string()));
    }

    #[test]
    fn over_capacity_is_render_error() {
        let tmp = TempDir::new().unwrap();
        let out = tmp.path().join("BIG.XLSX");

        let result =
            XlsxRenderer::new().render(TemplateKind::Weekly, &map_with_members("BIG", 7), &out);

        assert!(matches!(
            result,
            Err(RenderError::CapacityExceeded {
                kind: TemplateKind::Weekly,
                capacity: 6,
                members: 7
            })
        ));
        assert!(!out.exists());
    }

    #[test]
    fn missing_output_directory_is_render_error() {
        let tmp = TempDir::new().unwrap();
        let out = tmp.path().join("missing").join("ADM.XLSX");

        let result =
            XlsxRenderer::new().render(TemplateKind::Weekly, &map_with_members("ADM", 1), &out);
        assert!(result.is_err());
    }
}
