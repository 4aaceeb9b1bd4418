//! Schema Alignment

use crate::encoder::{Column, EncodedTable};
use crate::schema::FeatureSchema;
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Rows whose columns are exactly the schema's columns, in schema order
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedTable {
    schema: FeatureSchema,
    rows: Vec<Vec<f64>>,
}

impl AlignedTable {
    /// Column names; always equal to the schema's
    pub fn columns(&self) -> &[String] {
        self.schema.columns()
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    /// Row-major values
    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    pub fn row(&self, idx: usize) -> Option<&[f64]> {
        self.rows.get(idx).map(Vec::as_slice)
    }

    /// Values of one column across all rows
    pub fn column(&self, name: &str) -> Option<Vec<f64>> {
        let position = self.schema.position(name)?;
        Some(self.rows.iter().map(|row| row[position]).collect())
    }

    /// Number of columns
    pub fn width(&self) -> usize {
        self.schema.width()
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn into_rows(self) -> Vec<Vec<f64>> {
        self.rows
    }

    /// View as an encoded table, e.g. to re-align against another schema
    pub fn to_encoded(&self) -> EncodedTable {
        let columns = self
            .schema
            .columns()
            .iter()
            .enumerate()
            .map(|(j, name)| Column {
                name: name.clone(),
                values: self.rows.iter().map(|row| row[j]).collect(),
            })
            .collect();
        EncodedTable {
            columns,
            rows: self.rows.len(),
        }
    }
}

/// Columns touched by alignment
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AlignmentReport {
    /// Schema columns missing from the input, filled with 0
    pub padded: Vec<String>,
    /// Input columns unknown to the schema, discarded
    pub dropped: Vec<String>,
}

impl AlignmentReport {
    /// True when input and schema had identical column sets
    pub fn is_exact(&self) -> bool {
        self.padded.is_empty() && self.dropped.is_empty()
    }
}

/// Reindex an encoded table against the schema.
///
/// Total: absent schema columns are filled with 0, unknown columns are
/// dropped, and the result is in schema order. A missing category therefore
/// reads as "not a member of any absent category" rather than an error.
pub fn align_to_schema(encoded: &EncodedTable, schema: &FeatureSchema) -> AlignedTable {
    align_with_report(encoded, schema).0
}

/// [`align_to_schema`], also reporting which columns were padded or dropped
pub fn align_with_report(
    encoded: &EncodedTable,
    schema: &FeatureSchema,
) -> (AlignedTable, AlignmentReport) {
    // First occurrence wins on duplicate names
    let mut by_name: HashMap<&str, &[f64]> = HashMap::with_capacity(encoded.width());
    for column in encoded.columns() {
        by_name
            .entry(column.name.as_str())
            .or_insert(column.values.as_slice());
    }

    let mut report = AlignmentReport::default();
    let sources: Vec<Option<&[f64]>> = schema
        .columns()
        .iter()
        .map(|name| {
            let source = by_name.get(name.as_str()).copied();
            if source.is_none() {
                report.padded.push(name.clone());
            }
            source
        })
        .collect();

    let mut dropped_seen = HashSet::new();
    for name in encoded.column_names() {
        if !schema.contains(name) && dropped_seen.insert(name) {
            report.dropped.push(name.to_string());
        }
    }

    let rows = (0..encoded.rows())
        .map(|r| {
            sources
                .iter()
                .map(|source| source.map_or(0.0, |values| values[r]))
                .collect()
        })
        .collect();

    if !report.is_exact() {
        debug!(
            "Aligned {} rows: padded {:?}, dropped {:?}",
            encoded.rows(),
            report.padded,
            report.dropped
        );
    }

    (
        AlignedTable {
            schema: schema.clone(),
            rows,
        },
        report,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::encode_one_hot;
    use crate::record::RawRecord;

    fn attrition_schema() -> FeatureSchema {
        FeatureSchema::with_categorical_fields(
            [
                "Age",
                "MonthlyIncome",
                "BusinessTravel_Travel_Frequently",
                "BusinessTravel_Travel_Rarely",
                "Gender_Male",
                "OverTime_Yes",
            ],
            ["BusinessTravel", "Gender", "OverTime"],
        )
        .unwrap()
    }

    #[test]
    fn test_single_employee_fully_specified() {
        let record = RawRecord::new()
            .with("OverTime", "Yes")
            .with("BusinessTravel", "Travel_Frequently")
            .with("Age", 34)
            .with("MonthlyIncome", 5200);
        let schema = attrition_schema();

        let aligned = align_to_schema(&encode_one_hot(&[record]), &schema);

        assert_eq!(aligned.columns(), schema.columns());
        assert_eq!(aligned.row(0).unwrap(), &[34.0, 5200.0, 1.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_overtime_no_reads_as_zero() {
        // The schema only keeps OverTime_Yes; "No" is the dropped reference level
        let record = RawRecord::new().with("OverTime", "No").with("Age", 50);
        let (aligned, report) = align_with_report(&encode_one_hot(&[record]), &attrition_schema());

        assert_eq!(aligned.column("OverTime_Yes").unwrap(), vec![0.0]);
        assert_eq!(report.dropped, vec!["OverTime_No".to_string()]);
        assert!(report.padded.contains(&"MonthlyIncome".to_string()));
    }

    #[test]
    fn test_unknown_fields_dropped_silently() {
        let record = RawRecord::new()
            .with("Age", 40)
            .with("EmployeeNumber", 1001)
            .with("Over18", "Y");
        let aligned = align_to_schema(&encode_one_hot(&[record]), &attrition_schema());

        assert_eq!(aligned.width(), 6);
        assert!(aligned.column("EmployeeNumber").is_none());
        assert!(aligned.column("Over18_Y").is_none());
    }

    #[test]
    fn test_duplicate_encoded_columns_first_wins() {
        let encoded =
            EncodedTable::from_columns(1, [("Age", vec![30.0]), ("Age", vec![99.0])]).unwrap();
        let aligned = align_to_schema(&encoded, &attrition_schema());
        assert_eq!(aligned.column("Age").unwrap(), vec![30.0]);
    }

    #[test]
    fn test_realign_is_identity() {
        let batch = vec![
            RawRecord::new().with("Gender", "Male").with("Age", 30),
            RawRecord::new().with("Gender", "Female").with("Age", 41),
        ];
        let schema = attrition_schema();
        let aligned = align_to_schema(&encode_one_hot(&batch), &schema);

        let (again, report) = align_with_report(&aligned.to_encoded(), &schema);
        assert_eq!(again, aligned);
        assert!(report.is_exact());
    }

    #[test]
    fn test_empty_batch_keeps_schema_columns() {
        let schema = attrition_schema();
        let aligned = align_to_schema(&encode_one_hot(&[]), &schema);
        assert!(aligned.is_empty());
        assert_eq!(aligned.columns(), schema.columns());
    }
}
