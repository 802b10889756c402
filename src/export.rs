//! Excel export functionality.

use crate::models::{Collaborator, Department};
use chrono::Local;
use rust_xlsxwriter::{Color, Format, FormatBorder, Workbook, Worksheet, XlsxError};
use std::path::{Path, PathBuf};

fn header_format() -> Format {
    Format::new()
        .set_bold()
        .set_background_color(Color::RGB(0x22C55E))
        .set_font_color(Color::White)
        .set_border(FormatBorder::Thin)
}

/// Write the header row and column widths.
fn write_header(worksheet: &mut Worksheet, columns: &[(&str, f64)]) -> Result<(), XlsxError> {
    let format = header_format();
    for (col, (title, width)) in columns.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, *title, &format)?;
        worksheet.set_column_width(col as u16, *width)?;
    }
    Ok(())
}

/// Autofilter over the data and a frozen header row.
fn finish(worksheet: &mut Worksheet, rows: usize, columns: usize) -> Result<(), XlsxError> {
    if rows > 0 {
        worksheet.autofilter(0, 0, rows as u32, (columns - 1) as u16)?;
    }
    worksheet.set_freeze_panes(1, 0)?;
    Ok(())
}

/// Export collaborators to Excel file.
pub fn export_collaborators_to_excel(collaborators: &[Collaborator], path: &Path) -> Result<(), XlsxError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name("Collaborators")?;

    let columns = [
        ("Name", 30.0),
        ("Email", 32.0),
        ("Department", 25.0),
        ("Role", 20.0),
        ("Seniority", 12.0),
        ("Status", 10.0),
        ("Admission Date", 14.0),
        ("Base Salary", 14.0),
    ];
    write_header(worksheet, &columns)?;

    let salary_format = Format::new().set_num_format("#,##0.00");

    for (idx, c) in collaborators.iter().enumerate() {
        let row = (idx + 1) as u32;

        worksheet.write_string(row, 0, &c.name)?;
        worksheet.write_string(row, 1, &c.email)?;
        worksheet.write_string(row, 2, c.department_name.as_deref().unwrap_or(""))?;
        worksheet.write_string(row, 3, c.role.as_deref().unwrap_or(""))?;
        worksheet.write_string(row, 4, c.seniority.map(|s| s.label()).unwrap_or(""))?;
        worksheet.write_string(row, 5, c.status.label())?;

        match c.admission_date {
            Some(date) => worksheet.write_string(row, 6, date.format("%Y-%m-%d").to_string())?,
            None => worksheet.write_string(row, 6, "")?,
        };
        if let Some(salary) = c.salary_base {
            worksheet.write_number_with_format(row, 7, salary, &salary_format)?;
        }
    }

    finish(worksheet, collaborators.len(), columns.len())?;
    workbook.save(path)?;
    Ok(())
}

/// Export departments with their manager and live member count.
pub fn export_departments_to_excel(
    departments: &[Department],
    collaborators: &[Collaborator],
    path: &Path,
) -> Result<(), XlsxError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name("Departments")?;

    let columns = [("Department", 30.0), ("Manager", 30.0), ("Collaborators", 14.0)];
    write_header(worksheet, &columns)?;

    for (idx, dept) in departments.iter().enumerate() {
        let row = (idx + 1) as u32;

        let manager = dept
            .manager
            .as_deref()
            .and_then(|id| collaborators.iter().find(|c| c.id == id))
            .map(|c| c.name.as_str())
            .unwrap_or("");
        let members = collaborators.iter().filter(|c| c.references_department(&dept.id)).count();

        worksheet.write_string(row, 0, &dept.name)?;
        worksheet.write_string(row, 1, manager)?;
        worksheet.write_number(row, 2, members as f64)?;
    }

    finish(worksheet, departments.len(), columns.len())?;
    workbook.save(path)?;
    Ok(())
}

/// Open save file dialog and return selected path.
pub fn show_save_dialog(default_name: &str) -> Option<PathBuf> {
    rfd::FileDialog::new()
        .set_file_name(default_name)
        .add_filter("Excel Files", &["xlsx"])
        .save_file()
}

/// Generate default filename for export.
pub fn generate_export_filename(prefix: &str) -> String {
    let now = Local::now();
    format!("{prefix}_{ts}.xlsx", ts = now.format("%Y%m%d_%H%M%S"))
}
