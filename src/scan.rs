//! Single-pass column classification over a delimited file.

use std::path::Path;

use log::debug;

use crate::{
    column::ColumnCollection,
    error::{Error, Result},
    io_utils::{self, ScanOptions},
};

#[derive(Debug, Clone, PartialEq)]
pub struct ScanSummary {
    pub columns: ColumnCollection,
    /// Rows consumed by the reader, header included.
    pub row_count: usize,
    pub column_count: usize,
}

/// Reads `path` once, building one [`crate::column::ColumnMetadata`] per header
/// field and classifying every field of every data row.
pub fn scan(path: &Path, options: &ScanOptions) -> Result<ScanSummary> {
    if !path.is_file() {
        return Err(Error::NotFound {
            path: path.to_path_buf(),
        });
    }
    let mut reader = io_utils::open_csv_reader(path, options.delimiter)?;
    let headers = io_utils::reader_headers(&mut reader, path, options.encoding)?;
    if headers.is_empty() {
        return Err(Error::MissingHeader {
            path: path.to_path_buf(),
        });
    }

    let mut columns = ColumnCollection::from_headers(&headers);
    let mut data_rows = 0usize;
    for row in io_utils::decoded_rows(&mut reader, path, options.encoding) {
        columns.observe_row(&row?);
        data_rows += 1;
    }

    let summary = ScanSummary {
        columns,
        row_count: data_rows + 1,
        column_count: headers.len(),
    };
    debug!(
        "Scanned {:?}: {} row(s), {} column(s)",
        path, summary.row_count, summary.column_count
    );
    Ok(summary)
}
