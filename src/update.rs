//! Value substitution across matching rows.

use std::path::Path;

use log::info;

use crate::{
    column::ColumnCollection,
    error::Result,
    filter::{bind_predicates, row_matches},
    io_utils::{self, AtomicCsvWriter, ScanOptions},
    predicate::Predicate,
    value::Value,
};

/// Replace `old_value` with `new_value` in the `targets` columns of every row
/// that satisfies all `predicates`.
///
/// Text given for `old_value` or for a `where_eq` match value is classified the
/// way cells are, so `"75,000"` and `75000` select the same fields.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateRequest {
    pub old_value: Value,
    pub new_value: Value,
    pub targets: Vec<String>,
    pub predicates: Vec<Predicate>,
}

impl UpdateRequest {
    pub fn new(
        old_value: impl Into<Value>,
        new_value: impl Into<Value>,
        targets: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            old_value: classified(old_value.into()),
            new_value: new_value.into(),
            targets: targets.into_iter().map(Into::into).collect(),
            predicates: Vec::new(),
        }
    }

    pub fn with_predicate(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    /// Restricts the update to rows where `column` equals `value`.
    pub fn where_eq(self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.with_predicate(Predicate::equals(column, classified(value.into())))
    }
}

fn classified(value: Value) -> Value {
    match value {
        Value::Text(text) => Value::classify(&text),
        number => number,
    }
}

/// Re-emits every row of `path` to `destination`, applying `request` to the
/// eligible ones. Returns the number of fields replaced.
///
/// Column names are validated before anything is written. The destination is
/// replaced only once the whole file has been written.
pub fn update_rows(
    path: &Path,
    options: &ScanOptions,
    columns: &ColumnCollection,
    request: &UpdateRequest,
    destination: &Path,
) -> Result<usize> {
    let targets = request
        .targets
        .iter()
        .map(|name| columns.ordinal(name))
        .collect::<Result<Vec<_>>>()?;
    let bound = bind_predicates(columns, &request.predicates)?;
    let replacement = request.new_value.to_string();

    let mut reader = io_utils::open_csv_reader(path, options.delimiter)?;
    let headers = io_utils::reader_headers(&mut reader, path, options.encoding)?;
    let mut writer = AtomicCsvWriter::create(destination, options)?;
    writer.write_record(&headers)?;

    let mut replaced = 0usize;
    for row in io_utils::decoded_rows(&mut reader, path, options.encoding) {
        let mut row = row?;
        if row_matches(&bound, &row) {
            for &ordinal in &targets {
                if let Some(field) = row.get_mut(ordinal)
                    && Value::classify(field) == request.old_value
                {
                    *field = replacement.clone();
                    replaced += 1;
                }
            }
        }
        writer.write_record(&row)?;
    }
    drop(reader);
    writer.commit()?;
    info!("Replaced {replaced} value(s); output written to {destination:?}");
    Ok(replaced)
}
