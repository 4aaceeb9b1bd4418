//! One-Hot Encoding

use crate::error::AlignmentError;
use crate::record::{FieldValue, RawRecord};
use crate::schema::FeatureSchema;
use std::collections::{BTreeSet, HashSet};
use tracing::debug;

/// A named numeric column
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: Vec<f64>,
}

/// Table of named numeric columns produced by one-hot expansion
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EncodedTable {
    pub(crate) columns: Vec<Column>,
    pub(crate) rows: usize,
}

impl EncodedTable {
    /// Build a table from columns; every column must have the same length
    pub fn from_columns<I, S>(rows: usize, columns: I) -> Result<Self, AlignmentError>
    where
        I: IntoIterator<Item = (S, Vec<f64>)>,
        S: Into<String>,
    {
        let mut table = Self {
            columns: Vec::new(),
            rows,
        };
        for (name, values) in columns {
            let name = name.into();
            if values.len() != rows {
                return Err(AlignmentError::RaggedColumn {
                    column: name,
                    expected: rows,
                    actual: values.len(),
                });
            }
            table.columns.push(Column { name, values });
        }
        Ok(table)
    }

    /// Column names in table order
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// First column with the given name
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Number of rows
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns
    pub fn width(&self) -> usize {
        self.columns.len()
    }
}

/// Expand categorical fields into indicator columns.
///
/// Indicator columns exist only for labels observed in `records`; a batch of
/// all-"Male" rows yields `Gender_Male` and no `Gender_Female`. Numeric
/// columns come first, then indicator groups, both in field order. Labels
/// within a group are sorted.
pub fn encode_one_hot(records: &[RawRecord]) -> EncodedTable {
    encode_filtered(records, |_| true)
}

/// [`encode_one_hot`] that only materializes indicator columns the schema has.
///
/// Aligning the result against `schema` gives the same table as aligning the
/// full encoding, but a free-text field with a distinct label per row costs
/// one column of labels instead of one dense column per label. Numeric
/// columns are kept whether or not the schema knows them.
pub fn encode_for_schema(records: &[RawRecord], schema: &FeatureSchema) -> EncodedTable {
    encode_filtered(records, |name| schema.contains(name))
}

fn encode_filtered<F>(records: &[RawRecord], keep_indicator: F) -> EncodedTable
where
    F: Fn(&str) -> bool,
{
    let mut seen = HashSet::new();
    let mut fields: Vec<&str> = Vec::new();
    for record in records {
        for (name, _) in record.fields() {
            if seen.insert(name) {
                fields.push(name);
            }
        }
    }

    let rows = records.len();
    let mut numeric = Vec::new();
    let mut indicators = Vec::new();

    for field in fields {
        let categorical = records
            .iter()
            .any(|r| r.get(field).map_or(false, FieldValue::is_category));

        if categorical {
            let labels: Vec<Option<String>> = records
                .iter()
                .map(|r| r.get(field).and_then(FieldValue::as_label))
                .collect();
            let distinct: BTreeSet<&str> = labels.iter().flatten().map(String::as_str).collect();

            for label in distinct {
                let name = format!("{}_{}", field, label);
                if !keep_indicator(&name) {
                    continue;
                }
                let values = labels
                    .iter()
                    .map(|l| if l.as_deref() == Some(label) { 1.0 } else { 0.0 })
                    .collect();
                indicators.push(Column { name, values });
            }
        } else {
            let values = records
                .iter()
                .map(|r| r.get(field).and_then(FieldValue::as_number).unwrap_or(f64::NAN))
                .collect();
            numeric.push(Column {
                name: field.to_string(),
                values,
            });
        }
    }

    numeric.extend(indicators);
    debug!("Encoded {} rows into {} columns", rows, numeric.len());

    EncodedTable {
        columns: numeric,
        rows,
    }
}
