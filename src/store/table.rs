// store/table.rs
use crate::domain::property::{image_column, PropertyRecord, FIXED_COLUMNS, IMAGE_COLUMN_PREFIX};
use crate::errors::StoreError;
use chrono::NaiveDateTime;
use csv::{ReaderBuilder, WriterBuilder};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Fixed columns plus as many `ImagesN` columns as the widest record needs.
pub fn header_for(records: &[PropertyRecord]) -> Vec<String> {
    let max_images = records.iter().map(|r| r.images.len()).max().unwrap_or(0);

    FIXED_COLUMNS
        .iter()
        .map(|c| c.to_string())
        .chain((0..max_images).map(image_column))
        .collect()
}

/// Overwrites `path`. Rows are not padded: a row ends after its last image.
pub fn write_records(path: &Path, records: &[PropertyRecord]) -> Result<(), StoreError> {
    let mut writer = WriterBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(|e| StoreError::csv(path, e))?;

    writer
        .write_record(header_for(records))
        .map_err(|e| StoreError::csv(path, e))?;

    for record in records {
        let row: Vec<String> = record.cells().iter().map(|c| c.render()).collect();
        writer
            .write_record(&row)
            .map_err(|e| StoreError::csv(path, e))?;
    }

    writer.flush().map_err(|e| StoreError::io(path, e))?;
    Ok(())
}

/// Reads records back by column name.
pub fn read_records(path: &Path) -> Result<Vec<PropertyRecord>, StoreError> {
    let mut reader = ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(|e| StoreError::csv(path, e))?;

    let headers = reader
        .headers()
        .map_err(|e| StoreError::csv(path, e))?
        .clone();

    let index: HashMap<&str, usize> = headers.iter().enumerate().map(|(i, h)| (h, i)).collect();

    let mut image_cols: Vec<(usize, usize)> = headers
        .iter()
        .enumerate()
        .filter_map(|(i, h)| {
            let n = h.strip_prefix(IMAGE_COLUMN_PREFIX)?.parse::<usize>().ok()?;
            Some((n, i))
        })
        .collect();
    image_cols.sort();

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row.map_err(|e| StoreError::csv(path, e))?;

        let images = image_cols
            .iter()
            .filter_map(|(_, i)| row.get(*i))
            .filter(|url| !url.is_empty())
            .map(str::to_string)
            .collect();

        let record =
            PropertyRecord::from_named(|col| index.get(col).and_then(|&i| row.get(i)), images);

        if record.zpid.is_empty() {
            continue;
        }
        records.push(record);
    }

    Ok(records)
}

/// `<dir>/<stem>_<kind>_YYYYMMDD_HHMMSS.csv`, with `_1`, `_2`, ... appended
/// when a file with that name already exists.
pub fn timestamped_path(dir: &Path, stem: &str, kind: &str, now: NaiveDateTime) -> PathBuf {
    let base = format!("{stem}_{kind}_{}", now.format("%Y%m%d_%H%M%S"));

    let first = dir.join(format!("{base}.csv"));
    if !first.exists() {
        return first;
    }

    (1..)
        .map(|n| dir.join(format!("{base}_{n}.csv")))
        .find(|p| !p.exists())
        .unwrap_or(first)
}
