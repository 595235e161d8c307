//! In-memory tabular dataset stored as ordered column vectors.

use anyhow::{Context, Result};
use csv::ReaderBuilder;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::debug;

use crate::error::SummaryError;

/// A single cell of a [`Dataset`].
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Number(f64),
    Text(String),
}

impl Value {
    /// Interprets a raw CSV cell: empty is `Null`, anything `f64` accepts is
    /// `Number`, everything else is `Text`.
    pub fn parse(cell: &str) -> Self {
        let cell = cell.trim();
        if cell.is_empty() {
            return Value::Null;
        }
        match cell.parse::<f64>() {
            Ok(n) => Value::Number(n),
            Err(_) => Value::Text(cell.to_string()),
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Column {
    name: String,
    values: Vec<Value>,
}

/// An ordered collection of named, equal-length columns.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Dataset {
    columns: Vec<Column>,
    rows: usize,
}

impl Dataset {
    /// Builds a dataset from `(name, values)` pairs.
    ///
    /// # Errors
    ///
    /// Returns [`SummaryError::LengthMismatch`] if the columns differ in length.
    pub fn new<I, S>(columns: I) -> Result<Self, SummaryError>
    where
        I: IntoIterator<Item = (S, Vec<Value>)>,
        S: Into<String>,
    {
        let columns: Vec<Column> = columns
            .into_iter()
            .map(|(name, values)| Column {
                name: name.into(),
                values,
            })
            .collect();

        let rows = columns.first().map_or(0, |c| c.values.len());
        if let Some(bad) = columns.iter().find(|c| c.values.len() != rows) {
            return Err(SummaryError::LengthMismatch {
                column: bad.name.clone(),
                expected: rows,
                actual: bad.values.len(),
            });
        }

        Ok(Dataset { columns, rows })
    }

    /// Reads a headed CSV document. Every row must have as many cells as the header.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = ReaderBuilder::new().has_headers(true).from_reader(reader);

        let mut columns: Vec<Column> = rdr
            .headers()?
            .iter()
            .map(|name| Column {
                name: name.to_string(),
                values: Vec::new(),
            })
            .collect();

        let mut rows = 0;
        for result in rdr.records() {
            let record = result?;
            for (column, cell) in columns.iter_mut().zip(record.iter()) {
                column.values.push(Value::parse(cell));
            }
            rows += 1;
        }

        Ok(Dataset { columns, rows })
    }

    /// Loads a dataset from a CSV file on disk.
    pub fn from_csv_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file =
            File::open(path).with_context(|| format!("failed to open '{}'", path.display()))?;
        let dataset = Self::from_reader(file)
            .with_context(|| format!("failed to read CSV '{}'", path.display()))?;

        debug!(
            path = %path.display(),
            rows = dataset.rows,
            columns = dataset.columns.len(),
            "Dataset loaded"
        );
        Ok(dataset)
    }

    pub fn row_count(&self) -> usize {
        self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    /// Returns the values of the first column called `name`.
    ///
    /// Duplicate headers are not renamed on load, so a later column sharing
    /// a name with an earlier one is unreachable through this lookup.
    pub fn column(&self, name: &str) -> Option<&[Value]> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.values.as_slice())
    }

    /// Returns a copy of the dataset with a `target` column holding the decade
    /// (`floor(year / 10) * 10`) of each year in `source`.
    ///
    /// `source` may hold numeric years or date text starting with a four-digit
    /// year (`1999-03-01`). Anything else maps to [`Value::Null`]. An existing
    /// `target` column is replaced.
    ///
    /// # Errors
    ///
    /// Returns [`SummaryError::ColumnNotFound`] if `source` is absent.
    pub fn with_decade_column(&self, source: &str, target: &str) -> Result<Self, SummaryError> {
        let years = self
            .column(source)
            .ok_or_else(|| SummaryError::column_not_found(source))?;

        let decades = years
            .iter()
            .map(|v| year_of(v).map_or(Value::Null, |y| Value::Number(decade_of(y))))
            .collect();

        let mut out = self.clone();
        out.columns.retain(|c| c.name != target);
        out.columns.push(Column {
            name: target.to_string(),
            values: decades,
        });
        Ok(out)
    }
}

fn year_of(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) if n.is_finite() => Some(*n),
        Value::Text(s) => {
            let prefix = s.get(..4)?;
            if prefix.bytes().all(|b| b.is_ascii_digit()) {
                prefix.parse().ok()
            } else {
                None
            }
        }
        _ => None,
    }
}

fn decade_of(year: f64) -> f64 {
    (year / 10.0).floor() * 10.0
}
