//! The dataset handle: one scanned file plus its cached relationships.
//!
//! Opening a [`DataFile`] runs the classification pass immediately. Every
//! query afterwards re-reads the file from disk and consults the column
//! metadata only to resolve names to ordinals. A handle is not meant to be
//! shared across threads; open one per thread instead.

use std::{
    collections::HashMap,
    fmt, fs,
    path::{Path, PathBuf},
};

use log::info;

use crate::{
    column::{ColumnCollection, ColumnMetadata},
    error::Result,
    filter::{self, FilteredRows},
    io_utils::ScanOptions,
    predicate::Predicate,
    relation::{self, Relation},
    scan,
    update::{self, UpdateRequest},
};

#[derive(Debug, Clone)]
pub struct DataFile {
    path: PathBuf,
    options: ScanOptions,
    columns: ColumnCollection,
    row_count: usize,
    column_count: usize,
    relationships: HashMap<String, Relation>,
}

impl DataFile {
    /// Opens and scans a comma-delimited UTF-8 file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with(path, ScanOptions::default())
    }

    pub fn open_with(path: impl AsRef<Path>, options: ScanOptions) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let summary = scan::scan(&path, &options)?;
        Ok(Self {
            path,
            options,
            columns: summary.columns,
            row_count: summary.row_count,
            column_count: summary.column_count,
            relationships: HashMap::new(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn options(&self) -> &ScanOptions {
        &self.options
    }

    /// Rows read during the scan, header included.
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn column_count(&self) -> usize {
        self.column_count
    }

    pub fn columns(&self) -> &ColumnCollection {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Result<&ColumnMetadata> {
        self.columns.get(name)
    }

    /// Summaries for the named columns, or for every column when `names` is empty.
    /// Unknown names are reported inline rather than failing the report.
    pub fn metadata_report<S: AsRef<str>>(&self, names: &[S]) -> String {
        let mut report = String::new();
        if names.is_empty() {
            for column in &self.columns {
                report.push('\n');
                report.push_str(&column.to_string());
            }
            return report;
        }
        for name in names {
            let name = name.as_ref();
            report.push('\n');
            match self.columns.get(name) {
                Ok(column) => report.push_str(&column.to_string()),
                Err(_) => report.push_str(&format!("{name} is not a valid column name.")),
            }
        }
        report
    }

    /// Finds the values of `related` that co-occur with `value` in `column`,
    /// caching the result under `value`.
    pub fn relationship(&mut self, value: &str, column: &str, related: &str) -> Result<&Relation> {
        let relation = relation::find_relationship(
            &self.path,
            &self.options,
            value,
            self.columns.get(column)?,
            self.columns.get(related)?,
        )?;
        Ok(self
            .relationships
            .entry(value.to_string())
            .insert_entry(relation)
            .into_mut())
    }

    /// Builds a relation for every categorical value of `column`, replacing
    /// cached relations under the same values.
    pub fn relationships(
        &mut self,
        column: &str,
        related: &str,
    ) -> Result<&HashMap<String, Relation>> {
        let relations = relation::find_all_relationships(
            &self.path,
            &self.options,
            self.columns.get(column)?,
            self.columns.get(related)?,
        )?;
        self.relationships.extend(relations);
        Ok(&self.relationships)
    }

    pub fn cached_relationship(&self, value: &str) -> Option<&Relation> {
        self.relationships.get(value)
    }

    pub fn filter(&self, predicates: &[Predicate]) -> Result<FilteredRows> {
        filter::filter_rows(&self.path, &self.options, &self.columns, predicates)
    }

    /// Writes the header and all passing rows to `destination`, returning the
    /// number of rows written.
    pub fn filter_to_file(
        &self,
        predicates: &[Predicate],
        destination: impl AsRef<Path>,
    ) -> Result<usize> {
        filter::filter_to_file(
            &self.path,
            &self.options,
            &self.columns,
            predicates,
            destination.as_ref(),
        )
    }

    /// Applies `request` and writes the result to `destination`, or over the
    /// source file when no destination is given. Rewriting the source rescans
    /// it and drops cached relationships.
    pub fn update(&mut self, request: &UpdateRequest, destination: Option<&Path>) -> Result<usize> {
        let target = destination.unwrap_or(&self.path).to_path_buf();
        let replaced =
            update::update_rows(&self.path, &self.options, &self.columns, request, &target)?;
        if target == self.path || same_file(&target, &self.path) {
            self.refresh()?;
        }
        Ok(replaced)
    }

    /// Re-runs the classification pass and clears cached relationships.
    pub fn refresh(&mut self) -> Result<()> {
        let summary = scan::scan(&self.path, &self.options)?;
        self.columns = summary.columns;
        self.row_count = summary.row_count;
        self.column_count = summary.column_count;
        self.relationships.clear();
        info!("Rescanned {:?}", self.path);
        Ok(())
    }
}

/// True when both paths resolve to the same file on disk.
fn same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

impl fmt::Display for DataFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "DataFile {}: {} rows; {} columns\nHeaders:",
            self.path.display(),
            self.row_count,
            self.column_count
        )?;
        for column in &self.columns {
            write!(f, "\n<{}>: {}", column.name, column)?;
        }
        Ok(())
    }
}
