//! Cross-column value relationships.
//!
//! A [`Relation`] records which distinct values of a related column appear on
//! rows where a source column holds one specific categorical value. Source
//! fields are compared verbatim; no numeric normalization applies here.

use std::{
    collections::{BTreeSet, HashMap},
    fmt,
    path::Path,
};

use itertools::Itertools;
use log::debug;
use serde::Serialize;

use crate::{
    column::ColumnMetadata,
    error::{Error, Result},
    io_utils::{self, ScanOptions},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Relation {
    pub value: String,
    pub column: String,
    pub column_number: usize,
    pub related: String,
    pub related_number: usize,
    pub related_values: BTreeSet<String>,
}

impl Relation {
    fn empty(value: &str, column: &ColumnMetadata, related: &ColumnMetadata) -> Self {
        Self {
            value: value.to_string(),
            column: column.name.clone(),
            column_number: column.number,
            related: related.name.clone(),
            related_number: related.number,
            related_values: BTreeSet::new(),
        }
    }

    pub fn cardinality(&self) -> String {
        format!("one to {}", self.related_values.len())
    }
}

impl fmt::Display for Relation {
    /// `{:#}` appends the related values.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<Relation between {} from {} and {}> {}.",
            self.value,
            self.column,
            self.related,
            self.cardinality()
        )?;
        if f.alternate() {
            write!(
                f,
                "\nRelated values: {}",
                self.related_values.iter().join(",")
            )?;
        }
        Ok(())
    }
}

/// Collects the distinct `related` values on rows where `column` equals `value`.
///
/// Fails with [`Error::UnknownValue`] when `value` is not a categorical value of
/// `column`, which includes every value of a purely numeric column.
pub fn find_relationship(
    path: &Path,
    options: &ScanOptions,
    value: &str,
    column: &ColumnMetadata,
    related: &ColumnMetadata,
) -> Result<Relation> {
    if !column.has_categorical_value(value) {
        return Err(Error::UnknownValue {
            value: value.to_string(),
            column: column.name.clone(),
        });
    }
    let mut relation = Relation::empty(value, column, related);
    for_each_row(path, options, |row| {
        if field(row, column.number) == value {
            relation
                .related_values
                .insert(field(row, related.number).to_string());
        }
    })?;
    debug!("{relation}");
    Ok(relation)
}

/// Builds one [`Relation`] per categorical value of `column` in a single pass.
pub fn find_all_relationships(
    path: &Path,
    options: &ScanOptions,
    column: &ColumnMetadata,
    related: &ColumnMetadata,
) -> Result<HashMap<String, Relation>> {
    let mut relations = column
        .categorical_values
        .keys()
        .map(|value| (value.clone(), Relation::empty(value, column, related)))
        .collect::<HashMap<_, _>>();
    for_each_row(path, options, |row| {
        if let Some(relation) = relations.get_mut(field(row, column.number)) {
            relation
                .related_values
                .insert(field(row, related.number).to_string());
        }
    })?;
    debug!(
        "Collected {} relation(s) between '{}' and '{}'",
        relations.len(),
        column.name,
        related.name
    );
    Ok(relations)
}

fn for_each_row(
    path: &Path,
    options: &ScanOptions,
    mut visit: impl FnMut(&[String]),
) -> Result<()> {
    let mut reader = io_utils::open_csv_reader(path, options.delimiter)?;
    io_utils::reader_headers(&mut reader, path, options.encoding)?;
    for row in io_utils::decoded_rows(&mut reader, path, options.encoding) {
        visit(&row?);
    }
    Ok(())
}

fn field(row: &[String], ordinal: usize) -> &str {
    row.get(ordinal).map(String::as_str).unwrap_or("")
}
