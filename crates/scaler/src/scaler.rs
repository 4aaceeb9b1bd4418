//! Fitted Affine Scaler

use crate::error::ScalingError;
use feature_aligner::{AlignedTable, FeatureSchema};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

/// How the scaler was fitted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalingMethod {
    /// Z-score: center is the mean, scale the standard deviation
    Standard,
    /// Min-max to [0, 1]: center is the minimum, scale the range
    MinMax,
    /// Pass-through
    Identity,
}

/// Per-column `(x - center) / scale`, fitted at training time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedScaler {
    /// Fitting method (informational; the transform is always affine)
    pub method: ScalingMethod,
    /// Per-column center
    pub center: Vec<f64>,
    /// Per-column spread
    pub scale: Vec<f64>,
}

/// Scaled rows, still in schema order
#[derive(Debug, Clone, PartialEq)]
pub struct ScaledTable {
    schema: FeatureSchema,
    rows: Vec<Vec<f64>>,
}

impl ScaledTable {
    pub fn columns(&self) -> &[String] {
        self.schema.columns()
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
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
}

impl FittedScaler {
    /// Create a scaler, checking that parameters line up
    pub fn new(
        method: ScalingMethod,
        center: Vec<f64>,
        scale: Vec<f64>,
    ) -> Result<Self, ScalingError> {
        let scaler = Self {
            method,
            center,
            scale,
        };
        scaler.validate()?;
        Ok(scaler)
    }

    /// Standard scaler from fitted means and standard deviations
    pub fn standard(mean: Vec<f64>, std_dev: Vec<f64>) -> Result<Self, ScalingError> {
        Self::new(ScalingMethod::Standard, mean, std_dev)
    }

    /// Min-max scaler from fitted minima and maxima
    pub fn min_max(min: Vec<f64>, max: Vec<f64>) -> Result<Self, ScalingError> {
        if min.len() != max.len() {
            return Err(ScalingError::InvalidParameters(format!(
                "{} minima but {} maxima",
                min.len(),
                max.len()
            )));
        }
        let range = min.iter().zip(&max).map(|(lo, hi)| hi - lo).collect();
        Self::new(ScalingMethod::MinMax, min, range)
    }

    /// Pass-through scaler of the given width
    pub fn identity(width: usize) -> Self {
        Self {
            method: ScalingMethod::Identity,
            center: vec![0.0; width],
            scale: vec![1.0; width],
        }
    }

    /// Parse a scaler artifact from JSON
    pub fn from_json_str(json: &str) -> Result<Self, ScalingError> {
        let scaler: Self =
            serde_json::from_str(json).map_err(|e| ScalingError::Load(e.to_string()))?;
        scaler.validate()?;
        Ok(scaler)
    }

    /// Load a scaler artifact from a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ScalingError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| ScalingError::Load(format!("{}: {}", path.display(), e)))?;
        let scaler = Self::from_json_str(&json)?;
        info!(
            "Loaded {:?} scaler with {} columns from {}",
            scaler.method,
            scaler.width(),
            path.display()
        );
        Ok(scaler)
    }

    fn validate(&self) -> Result<(), ScalingError> {
        if self.center.len() != self.scale.len() {
            return Err(ScalingError::InvalidParameters(format!(
                "{} centers but {} scales",
                self.center.len(),
                self.scale.len()
            )));
        }
        if let Some(idx) = self.center.iter().position(|c| !c.is_finite()) {
            return Err(ScalingError::InvalidParameters(format!(
                "non-finite center at column {}",
                idx
            )));
        }
        Ok(())
    }

    /// Fitted dimensionality
    pub fn width(&self) -> usize {
        self.center.len()
    }

    /// Scale an aligned table
    pub fn transform(&self, table: &AlignedTable) -> Result<ScaledTable, ScalingError> {
        if table.width() != self.width() {
            return Err(ScalingError::SchemaMismatch {
                expected: self.width(),
                actual: table.width(),
            });
        }
        let rows = self.transform_rows(table.rows())?;
        debug!("Scaled {} rows of width {}", rows.len(), self.width());
        Ok(ScaledTable {
            schema: table.schema().clone(),
            rows,
        })
    }

    /// Scale raw rows; every row must match the fitted width
    pub fn transform_rows(&self, rows: &[Vec<f64>]) -> Result<Vec<Vec<f64>>, ScalingError> {
        rows.iter().map(|row| self.transform_row(row)).collect()
    }

    /// Scale a single row
    pub fn transform_row(&self, row: &[f64]) -> Result<Vec<f64>, ScalingError> {
        if row.len() != self.width() {
            return Err(ScalingError::SchemaMismatch {
                expected: self.width(),
                actual: row.len(),
            });
        }
        Ok(row
            .iter()
            .zip(self.center.iter().zip(&self.scale))
            .map(|(x, (center, scale))| (x - center) / effective_scale(*scale))
            .collect())
    }
}

/// Constant columns are fitted with zero spread; those pass through unscaled
fn effective_scale(scale: f64) -> f64 {
    if scale == 0.0 || !scale.is_finite() {
        1.0
    } else {
        scale
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use feature_aligner::{align_to_schema, encode_one_hot, RawRecord};
    use proptest::prelude::*;

    fn schema(columns: &[&str]) -> FeatureSchema {
        FeatureSchema::new(columns.iter().copied()).unwrap()
    }

    #[test]
    fn test_standard_transform() {
        let scaler = FittedScaler::standard(vec![30.0, 5000.0], vec![10.0, 2500.0]).unwrap();
        let row = scaler.transform_row(&[40.0, 2500.0]).unwrap();
        assert_eq!(row, vec![1.0, -1.0]);
    }

    #[test]
    fn test_min_max_transform() {
        let scaler = FittedScaler::min_max(vec![18.0, 1.0], vec![58.0, 4.0]).unwrap();
        let row = scaler.transform_row(&[38.0, 4.0]).unwrap();
        assert!((row[0] - 0.5).abs() < 1e-12);
        assert!((row[1] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_zero_spread_passes_through_centered() {
        let scaler = FittedScaler::standard(vec![1.0], vec![0.0]).unwrap();
        assert_eq!(scaler.transform_row(&[3.0]).unwrap(), vec![2.0]);
    }

    #[test]
    fn test_one_column_short_is_schema_mismatch() {
        let scaler = FittedScaler::identity(3);
        let narrow = align_to_schema(
            &encode_one_hot(&[RawRecord::new().with("Age", 30)]),
            &schema(&["Age", "MonthlyIncome"]),
        );

        let err = scaler.transform(&narrow).unwrap_err();
        assert_eq!(err, ScalingError::SchemaMismatch { expected: 3, actual: 2 });
        assert_eq!(
            err.to_string(),
            "Feature width mismatch: scaler was fitted on 3 columns, received 2"
        );
    }

    #[test]
    fn test_ragged_row_rejected() {
        let scaler = FittedScaler::identity(2);
        let rows = vec![vec![1.0, 2.0], vec![1.0]];
        assert!(matches!(
            scaler.transform_rows(&rows),
            Err(ScalingError::SchemaMismatch { expected: 2, actual: 1 })
        ));
    }

    #[test]
    fn test_transform_keeps_schema_order() {
        let schema = schema(&["MonthlyIncome", "Age"]);
        let aligned = align_to_schema(
            &encode_one_hot(&[RawRecord::new().with("Age", 40).with("MonthlyIncome", 7500)]),
            &schema,
        );
        let scaler = FittedScaler::standard(vec![5000.0, 30.0], vec![2500.0, 10.0]).unwrap();

        let scaled = scaler.transform(&aligned).unwrap();
        assert_eq!(scaled.columns(), schema.columns());
        assert_eq!(scaled.rows()[0], vec![1.0, 1.0]);
    }

    #[test]
    fn test_json_artifact() {
        let scaler = FittedScaler::from_json_str(
            r#"{"method":"standard","center":[1.0,2.0],"scale":[0.5,4.0]}"#,
        )
        .unwrap();
        assert_eq!(scaler.method, ScalingMethod::Standard);
        assert_eq!(scaler.width(), 2);

        let err = FittedScaler::from_json_str(r#"{"method":"standard","center":[1.0],"scale":[]}"#)
            .unwrap_err();
        assert!(matches!(err, ScalingError::InvalidParameters(_)));
    }

    proptest! {
        #[test]
        fn prop_identity_is_noop(
            rows in prop::collection::vec(prop::collection::vec(-1e6f64..1e6, 4), 0..20)
        ) {
            let scaler = FittedScaler::identity(4);
            prop_assert_eq!(scaler.transform_rows(&rows).unwrap(), rows);
        }
    }
}
