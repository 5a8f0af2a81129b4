use crate::domain::property::{Cell, PropertyRecord};
use crate::errors::StoreError;
use crate::store::table::header_for;
use rust_xlsxwriter::Workbook;
use std::path::Path;

// Excel rejects longer strings; propertyJSON regularly exceeds it.
const MAX_CELL_CHARS: usize = 32_767;

/// Writes the merged store as a single-sheet workbook at `path`.
pub fn export_records_xlsx(records: &[PropertyRecord], path: &Path) -> Result<(), StoreError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    for (col, header) in header_for(records).iter().enumerate() {
        worksheet.write_string(0, col as u16, header)?;
    }

    for (i, record) in records.iter().enumerate() {
        let r = (i + 1) as u32;

        for (col, cell) in record.cells().iter().enumerate() {
            let col = col as u16;
            match cell {
                Cell::Text(s) if s.chars().count() > MAX_CELL_CHARS => {
                    let clipped: String = s.chars().take(MAX_CELL_CHARS).collect();
                    worksheet.write_string(r, col, &clipped)?;
                }
                Cell::Text(s) => {
                    worksheet.write_string(r, col, s)?;
                }
                Cell::Number(n) => match n.as_f64() {
                    Some(v) => {
                        worksheet.write_number(r, col, v)?;
                    }
                    None => {
                        worksheet.write_string(r, col, n.to_string())?;
                    }
                },
                Cell::Empty => {}
            }
        }
    }

    workbook.save(path)?;
    Ok(())
}
