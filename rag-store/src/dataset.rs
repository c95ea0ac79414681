//! In-memory booking dataset loaded once from a delimited file.
//!
//! No schema is enforced: columns are whatever the header says. Cells are
//! typed on load so rows serialize to natural JSON (numbers stay numbers,
//! missing values become `null`).

use std::{
    collections::{HashMap, HashSet},
    fs::File,
    io::Read,
    path::Path,
};

use serde_json::{Number, Value};
use tracing::{debug, info};

use crate::{errors::RagError, record::BookingRecord};

/// Cell texts treated as missing values.
const NA_TOKENS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Read-only tabular store of booking rows.
#[derive(Clone, Debug, Default)]
pub struct BookingStore {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl BookingStore {
    /// Loads the dataset from `path`.
    ///
    /// Returns `Ok(None)` when the file does not exist or has no header line;
    /// callers treat that as "dataset not loaded".
    ///
    /// # Errors
    /// Other I/O failures and malformed rows (more fields than the header).
    pub fn load(path: impl AsRef<Path>, delimiter: u8) -> Result<Option<Self>, RagError> {
        let path = path.as_ref();
        let file = match File::open(path) {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "dataset file not found");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        let store = Self::from_reader(file, delimiter)?;
        if let Some(s) = &store {
            info!(
                path = %path.display(),
                rows = s.len(),
                columns = s.columns.len(),
                "dataset loaded"
            );
        }
        Ok(store)
    }

    /// Parses a delimited stream with a header line.
    ///
    /// Short rows are padded with `null`; duplicate header names get a `.N`
    /// suffix so every column stays addressable.
    pub fn from_reader<R: Read>(reader: R, delimiter: u8) -> Result<Option<Self>, RagError> {
        let mut rdr = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let headers = rdr.headers()?.clone();
        if headers.is_empty() || headers.iter().all(|h| h.trim().is_empty()) {
            return Ok(None);
        }
        let columns = dedup_columns(headers.iter());
        let width = columns.len();

        let mut rows = Vec::new();
        for (line, result) in rdr.records().enumerate() {
            let record = result?;
            if record.len() > width {
                return Err(RagError::Computation(format!(
                    "Error tokenizing data. Expected {width} fields in line {}, saw {}",
                    line + 2,
                    record.len()
                )));
            }
            let mut row: Vec<Value> = record.iter().map(parse_cell).collect();
            row.resize(width, Value::Null);
            rows.push(row);
        }

        Ok(Some(Self { columns, rows }))
    }

    /// Number of data rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Column names in file order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// All values of a column (including `null`s), or `None` if it is absent.
    pub fn column_values<'a>(
        &'a self,
        name: &str,
    ) -> Option<impl Iterator<Item = &'a Value> + use<'a>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(move |row| &row[idx]))
    }

    /// Row `position` as a record, or `None` when out of range.
    pub fn record(&self, position: usize) -> Option<BookingRecord> {
        let row = self.rows.get(position)?;
        Some(
            self.columns
                .iter()
                .cloned()
                .zip(row.iter().cloned())
                .collect(),
        )
    }
}

/// Types a raw cell: missing → `null`, integer, float, boolean, else string.
pub(crate) fn parse_cell(raw: &str) -> Value {
    let t = raw.trim();
    if NA_TOKENS.contains(&t) {
        return Value::Null;
    }
    if let Ok(i) = t.parse::<i64>() {
        return Value::from(i);
    }
    if looks_numeric(t) {
        if let Some(n) = t.parse::<f64>().ok().and_then(Number::from_f64) {
            return Value::Number(n);
        }
    }
    match t.to_ascii_lowercase().as_str() {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => Value::String(raw.to_string()),
    }
}

/// Rejects words like `inf`/`infinity` that `f64::from_str` would accept.
fn looks_numeric(t: &str) -> bool {
    t.bytes()
        .all(|b| b.is_ascii_digit() || matches!(b, b'.' | b'-' | b'+' | b'e' | b'E'))
}

fn dedup_columns<'a>(names: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut used: HashSet<String> = HashSet::new();
    let mut next_suffix: HashMap<&str, usize> = HashMap::new();
    let mut out = Vec::new();
    for name in names {
        let mut column = name.to_string();
        if used.contains(&column) {
            let n = next_suffix.entry(name).or_insert(1);
            loop {
                column = format!("{name}.{n}");
                *n += 1;
                if !used.contains(&column) {
                    break;
                }
            }
        }
        used.insert(column.clone());
        out.push(column);
    }
    out
}
