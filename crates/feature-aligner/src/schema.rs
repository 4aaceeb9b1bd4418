//! Feature Schema

use crate::error::AlignmentError;
use std::collections::HashMap;
use std::sync::Arc;

/// Ordered column names a fitted model expects, fixed at training time.
///
/// Cheap to clone; the column list is shared.
#[derive(Debug, Clone)]
pub struct FeatureSchema {
    columns: Arc<[String]>,
    index: Arc<HashMap<String, usize>>,
    /// Fields expanded into `{field}_{label}` indicator columns
    categorical_fields: Arc<[String]>,
}

impl FeatureSchema {
    /// Create a schema from column names in model order
    pub fn new<I, S>(columns: I) -> Result<Self, AlignmentError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_categorical_fields(columns, Vec::<String>::new())
    }

    /// Create a schema and declare which raw fields are categorical
    pub fn with_categorical_fields<I, S, F, T>(
        columns: I,
        categorical_fields: F,
    ) -> Result<Self, AlignmentError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        F: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
        if columns.is_empty() {
            return Err(AlignmentError::EmptySchema);
        }

        let mut index = HashMap::with_capacity(columns.len());
        for (position, name) in columns.iter().enumerate() {
            if index.insert(name.clone(), position).is_some() {
                return Err(AlignmentError::DuplicateColumn(name.clone()));
            }
        }

        Ok(Self {
            columns: columns.into(),
            index: Arc::new(index),
            categorical_fields: categorical_fields
                .into_iter()
                .map(Into::into)
                .collect::<Vec<_>>()
                .into(),
        })
    }

    /// Column names in model order
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Number of columns
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Position of a column, if the schema has it
    pub fn position(&self, column: &str) -> Option<usize> {
        self.index.get(column).copied()
    }

    pub fn contains(&self, column: &str) -> bool {
        self.index.contains_key(column)
    }

    /// Declared categorical fields
    pub fn categorical_fields(&self) -> &[String] {
        &self.categorical_fields
    }

    pub fn is_categorical(&self, field: &str) -> bool {
        self.categorical_fields.iter().any(|f| f == field)
    }

    /// Category labels the model knows for a field, in schema order.
    ///
    /// Empty for fields not declared categorical.
    pub fn categories(&self, field: &str) -> Vec<&str> {
        if !self.is_categorical(field) {
            return Vec::new();
        }
        let prefix = format!("{}_", field);
        self.columns
            .iter()
            .filter_map(|column| column.strip_prefix(prefix.as_str()))
            .collect()
    }
}

impl PartialEq for FeatureSchema {
    fn eq(&self, other: &Self) -> bool {
        self.columns == other.columns && self.categorical_fields == other.categorical_fields
    }
}
