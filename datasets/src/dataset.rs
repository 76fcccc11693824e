use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::Path;

use carebill::table::{Column, ColumnValues, Table};
use csv::{ReaderBuilder, WriterBuilder};
use flate2::read::GzDecoder;
use log::debug;

use crate::error::{Error, Result};

/// Read a table from a file
///
/// The file must be comma separated with a header row. A path ending in `.gz` is gunzipped
/// while reading.
pub fn load<P: AsRef<Path>>(path: P) -> Result<Table> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| Error::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let reader = BufReader::new(file);

    let table = if path.extension().map_or(false, |ext| ext == "gz") {
        table_from_gz_csv(reader, b',')?
    } else {
        table_from_csv(reader, b',')?
    };

    debug!(
        "loaded {} rows and {} columns from {}",
        table.nrows(),
        table.ncols(),
        path.display()
    );

    Ok(table)
}

/// Convert gzipped CSV bytes into a table
pub fn table_from_gz_csv<R: Read>(gz: R, separator: u8) -> Result<Table> {
    // unzip file
    let file = GzDecoder::new(gz);
    table_from_csv(file, separator)
}

/// Convert CSV bytes with a header row into a table
///
/// Rows with a different number of fields than the header, invalid UTF-8 and repeated header
/// names are rejected.
pub fn table_from_csv<R: Read>(csv: R, separator: u8) -> Result<Table> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .delimiter(separator)
        .from_reader(csv);

    let headers = reader.headers()?.clone();
    if headers.is_empty() {
        return Err(Error::MissingHeader);
    }

    let mut cells: Vec<Vec<String>> = vec![Vec::new(); headers.len()];
    for record in reader.records() {
        let record = record?;
        for (column, field) in cells.iter_mut().zip(record.iter()) {
            column.push(field.to_string());
        }
    }

    let columns = headers
        .iter()
        .zip(cells)
        .map(|(name, cells)| Column::new(name, infer_values(cells)))
        .collect();

    Ok(Table::new(columns)?)
}

/// Narrowest value kind that represents every cell
fn infer_values(cells: Vec<String>) -> ColumnValues {
    let ints = cells
        .iter()
        .map(|cell| cell.parse::<i64>())
        .collect::<std::result::Result<Vec<_>, _>>();
    if let Ok(ints) = ints {
        return ColumnValues::Int(ints);
    }

    let floats = cells
        .iter()
        .map(|cell| {
            if cell.is_empty() {
                Ok(f64::NAN)
            } else {
                cell.parse::<f64>()
            }
        })
        .collect::<std::result::Result<Vec<_>, _>>();
    if let Ok(floats) = floats {
        return ColumnValues::Float(floats);
    }

    ColumnValues::Str(cells)
}

/// Write a table as comma separated values with a header row
///
/// `NaN` floats are written as empty cells, so reading the output back yields the same table.
pub fn write_csv<W: Write>(table: &Table, writer: W) -> Result<()> {
    let mut writer = WriterBuilder::new().from_writer(writer);

    writer.write_record(table.column_names())?;
    for row in 0..table.nrows() {
        let record = table.columns().iter().map(|column| match column.values() {
            ColumnValues::Float(v) if v[row].is_nan() => String::new(),
            _ => column.display(row),
        });
        writer.write_record(record)?;
    }
    writer.flush().map_err(csv::Error::from)?;

    Ok(())
}
