//! Per-column metadata accumulated during a scan.

use std::{
    collections::{BTreeMap, HashMap},
    fmt,
};

use log::warn;
use serde::Serialize;

use crate::{
    error::{Error, Result},
    value::is_numeric,
};

/// Classification summarizing every value seen in a column so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Datatype {
    Categorical,
    Numeric,
    Mixed,
}

impl Datatype {
    /// Merges an observation into the current tag. Tags only ever widen to `Mixed`.
    pub fn widen(current: Option<Datatype>, observed: Datatype) -> Datatype {
        match current {
            None => observed,
            Some(existing) if existing == observed => existing,
            Some(_) => Datatype::Mixed,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Datatype::Categorical => "categorical",
            Datatype::Numeric => "numeric",
            Datatype::Mixed => "mixed",
        }
    }
}

impl fmt::Display for Datatype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnMetadata {
    pub name: String,
    /// Zero-based position of the column in the header row.
    pub number: usize,
    pub categorical_values: HashMap<String, usize>,
    pub numeric_count: usize,
    pub datatype: Option<Datatype>,
}

impl ColumnMetadata {
    pub fn new(name: impl Into<String>, number: usize) -> Self {
        Self {
            name: name.into(),
            number,
            categorical_values: HashMap::new(),
            numeric_count: 0,
            datatype: None,
        }
    }

    /// Classifies one raw field and folds it into the aggregate.
    pub fn observe(&mut self, raw: &str) {
        if is_numeric(raw) {
            self.numeric_count += 1;
            self.datatype = Some(Datatype::widen(self.datatype, Datatype::Numeric));
        } else {
            *self.categorical_values.entry(raw.to_string()).or_insert(0) += 1;
            self.datatype = Some(Datatype::widen(self.datatype, Datatype::Categorical));
        }
    }

    pub fn categorical_count(&self) -> usize {
        self.categorical_values.values().sum()
    }

    pub fn has_categorical_value(&self, value: &str) -> bool {
        self.categorical_values.contains_key(value)
    }

    fn sorted_values(&self) -> BTreeMap<&str, usize> {
        self.categorical_values
            .iter()
            .map(|(value, count)| (value.as_str(), *count))
            .collect()
    }
}

impl fmt::Display for ColumnMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let datatype = self.datatype.map(|d| d.as_str()).unwrap_or("none");
        write!(
            f,
            "<Metadata for column number {}: {}> datatype:{}",
            self.number, self.name, datatype
        )?;
        if !self.categorical_values.is_empty() {
            write!(
                f,
                "; categorical_values_count:{}",
                self.categorical_values.len()
            )?;
        }
        if self.numeric_count > 0 {
            write!(f, "; numeric_values_count:{}", self.numeric_count)?;
        }
        if !self.categorical_values.is_empty() {
            write!(f, "\nCategorical values [value: count]: {:?}", self.sorted_values())?;
        }
        Ok(())
    }
}

/// Header-ordered, name-indexed set of column metadata.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnCollection {
    columns: Vec<ColumnMetadata>,
    by_name: HashMap<String, usize>,
}

impl ColumnCollection {
    pub fn from_headers(headers: &[String]) -> Self {
        let mut collection = Self::default();
        for (number, name) in headers.iter().enumerate() {
            collection.insert(ColumnMetadata::new(name.clone(), number));
        }
        collection
    }

    /// Adds a column. A repeated name replaces the earlier entry in place.
    fn insert(&mut self, column: ColumnMetadata) {
        match self.by_name.get(&column.name) {
            Some(&slot) => {
                warn!(
                    "Duplicate column name '{}' at position {} replaces position {}",
                    column.name, column.number, self.columns[slot].number
                );
                self.columns[slot] = column;
            }
            None => {
                self.by_name.insert(column.name.clone(), self.columns.len());
                self.columns.push(column);
            }
        }
    }

    pub fn get(&self, name: &str) -> Result<&ColumnMetadata> {
        self.by_name
            .get(name)
            .map(|&slot| &self.columns[slot])
            .ok_or_else(|| Error::UnknownColumn {
                column: name.to_string(),
            })
    }

    /// Resolves a column name to its ordinal position in each row.
    pub fn ordinal(&self, name: &str) -> Result<usize> {
        self.get(name).map(|column| column.number)
    }

    /// Folds one data row into every column's aggregate.
    pub fn observe_row(&mut self, row: &[String]) {
        for column in &mut self.columns {
            let raw = row.get(column.number).map(String::as_str).unwrap_or("");
            column.observe(raw);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &ColumnMetadata> {
        self.columns.iter()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl<'a> IntoIterator for &'a ColumnCollection {
    type Item = &'a ColumnMetadata;
    type IntoIter = std::slice::Iter<'a, ColumnMetadata>;

    fn into_iter(self) -> Self::IntoIter {
        self.columns.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn widening_is_order_independent() {
        let mut numeric_first = ColumnMetadata::new("Cost", 0);
        numeric_first.observe("$15,000");
        numeric_first.observe("N.A.");
        let mut categorical_first = ColumnMetadata::new("Cost", 0);
        categorical_first.observe("N.A.");
        categorical_first.observe("$15,000");

        assert_eq!(numeric_first.datatype, Some(Datatype::Mixed));
        assert_eq!(categorical_first.datatype, Some(Datatype::Mixed));
        assert_eq!(numeric_first, categorical_first);
    }

    #[test]
    fn mixed_never_narrows() {
        let mut column = ColumnMetadata::new("Cost", 0);
        column.observe("1");
        column.observe("x");
        for _ in 0..3 {
            column.observe("2");
        }
        assert_eq!(column.datatype, Some(Datatype::Mixed));
        assert_eq!(column.numeric_count, 4);
        assert_eq!(column.categorical_values.get("x"), Some(&1));
    }

    #[test]
    fn datatype_unset_until_first_observation() {
        let column = ColumnMetadata::new("Empty", 2);
        assert_eq!(column.datatype, None);
        assert!(column.to_string().contains("datatype:none"));
    }

    #[test]
    fn display_lists_sorted_categorical_values() {
        let mut column = ColumnMetadata::new("Cost", 5);
        column.observe("N.A.");
        column.observe("10");
        assert_eq!(
            column.to_string(),
            "<Metadata for column number 5: Cost> datatype:mixed; categorical_values_count:1; \
             numeric_values_count:1\nCategorical values [value: count]: {\"N.A.\": 1}"
        );
    }

    #[test]
    fn unknown_column_lookup_fails() {
        let collection = ColumnCollection::from_headers(&headers(&["a", "b"]));
        assert_eq!(collection.ordinal("b").unwrap(), 1);
        let err = collection.get("c").unwrap_err();
        assert!(matches!(err, Error::UnknownColumn { ref column } if column == "c"));
    }

    #[test]
    fn duplicate_header_replaces_earlier_entry() {
        let collection = ColumnCollection::from_headers(&headers(&["a", "b", "a"]));
        assert_eq!(collection.len(), 2);
        assert_eq!(collection.ordinal("a").unwrap(), 2);
        let names = collection.iter().map(|c| c.name.as_str()).collect::<Vec<_>>();
        assert_eq!(names, ["a", "b"]);
    }
}
