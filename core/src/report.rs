//! Spreadsheet export of the monthly metrics table.

use crate::{
    error::{PipelineError, PipelineResult},
    metrics::{round_for_report, MetricsRecord},
};
use chrono::Datelike;
use rust_xlsxwriter::{ExcelDateTime, Format, FormatBorder, Workbook, Worksheet};
use std::path::Path;

/// Column order of the exported sheet. There is no index column.
pub const REPORT_COLUMNS: [&str; 7] = [
    "month",
    "revenue",
    "expenses",
    "sales_volume",
    "profit",
    "profit_margin",
    "revenue_per_unit",
];

/// Round money and ratio columns to cents and write them to a single
/// worksheet named `sheet_name`. Overwrites `path`.
pub fn export_workbook(path: &Path, sheet_name: &str, records: &[MetricsRecord]) -> PipelineResult<()> {
    let rows = round_for_report(records);

    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(sheet_name)?;

    let header = Format::new().set_bold().set_border(FormatBorder::Thin);
    let date = Format::new().set_num_format("yyyy-mm-dd hh:mm:ss");

    for (col, name) in REPORT_COLUMNS.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *name, &header)?;
    }

    for (i, r) in rows.iter().enumerate() {
        let row = i as u32 + 1;
        let month = ExcelDateTime::from_ymd(r.month.year() as u16, r.month.month() as u8, r.month.day() as u8)?;
        sheet.write_datetime_with_format(row, 0, &month, &date)?;
        write_number(sheet, row, 1, r.revenue)?;
        write_number(sheet, row, 2, r.expenses)?;
        write_number(sheet, row, 3, r.sales_volume as f64)?;
        write_number(sheet, row, 4, r.profit)?;
        write_number(sheet, row, 5, r.profit_margin)?;
        write_number(sheet, row, 6, r.revenue_per_unit)?;
    }
    sheet.autofit();

    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).map_err(PipelineError::io(dir))?;
    }
    workbook.save(path)?;
    log::debug!("Workbook written: {} ({} rows)", path.display(), rows.len());
    Ok(())
}

/// Non-finite values are left as empty cells.
fn write_number(sheet: &mut Worksheet, row: u32, col: u16, value: f64) -> PipelineResult<()> {
    if value.is_finite() {
        sheet.write_number(row, col, value)?;
    }
    Ok(())
}
