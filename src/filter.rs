//! Row selection by predicates, materialized in memory or written atomically.

use std::path::Path;

use log::info;

use crate::{
    column::ColumnCollection,
    error::Result,
    io_utils::{self, AtomicCsvWriter, ScanOptions},
    predicate::Predicate,
    table,
};

/// A predicate bound to the ordinal of the column it tests.
#[derive(Debug, Clone)]
pub(crate) struct BoundPredicate<'p> {
    ordinal: usize,
    predicate: &'p Predicate,
}

/// Resolves every predicate column up front so unknown names fail before any scan.
pub(crate) fn bind_predicates<'p>(
    columns: &ColumnCollection,
    predicates: &'p [Predicate],
) -> Result<Vec<BoundPredicate<'p>>> {
    predicates
        .iter()
        .map(|predicate| {
            Ok(BoundPredicate {
                ordinal: columns.ordinal(&predicate.column)?,
                predicate,
            })
        })
        .collect()
}

/// All predicates must hold; evaluation stops at the first failure.
pub(crate) fn row_matches(bound: &[BoundPredicate<'_>], row: &[String]) -> bool {
    bound.iter().all(|b| {
        let raw = row.get(b.ordinal).map(String::as_str).unwrap_or("");
        b.predicate.matches(raw)
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilteredRows {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl FilteredRows {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Renders a fixed-width report, splitting `width` evenly across columns.
    pub fn render(&self, width: usize) -> String {
        table::render_fixed_width(&self.headers, &self.rows, width)
    }
}

pub fn filter_rows(
    path: &Path,
    options: &ScanOptions,
    columns: &ColumnCollection,
    predicates: &[Predicate],
) -> Result<FilteredRows> {
    let bound = bind_predicates(columns, predicates)?;
    let mut reader = io_utils::open_csv_reader(path, options.delimiter)?;
    let headers = io_utils::reader_headers(&mut reader, path, options.encoding)?;
    let mut rows = Vec::new();
    for row in io_utils::decoded_rows(&mut reader, path, options.encoding) {
        let row = row?;
        if row_matches(&bound, &row) {
            rows.push(row);
        }
    }
    Ok(FilteredRows { headers, rows })
}

/// Writes the header and every passing row to `destination`, returning the
/// number of rows written.
pub fn filter_to_file(
    path: &Path,
    options: &ScanOptions,
    columns: &ColumnCollection,
    predicates: &[Predicate],
    destination: &Path,
) -> Result<usize> {
    let bound = bind_predicates(columns, predicates)?;
    let mut reader = io_utils::open_csv_reader(path, options.delimiter)?;
    let headers = io_utils::reader_headers(&mut reader, path, options.encoding)?;
    let mut writer = AtomicCsvWriter::create(destination, options)?;
    writer.write_record(&headers)?;
    let mut written = 0usize;
    for row in io_utils::decoded_rows(&mut reader, path, options.encoding) {
        let row = row?;
        if row_matches(&bound, &row) {
            writer.write_record(&row)?;
            written += 1;
        }
    }
    drop(reader);
    writer.commit()?;
    info!("Wrote {written} filtered row(s) to {destination:?}");
    Ok(written)
}
