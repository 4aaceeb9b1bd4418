//! Feature Alignment Engine
//!
//! Turns raw employee records into the fixed column layout a fitted model expects:
//! - One-hot expansion of categorical fields (batch-driven)
//! - Reindexing against the Feature Schema (pad absent columns with 0, drop extras)
//!
//! Categories absent from a batch are never an error. Their indicator columns are
//! padded with 0, so a record is scored as if it belonged to none of them.

mod aligner;
mod encoder;
mod error;
mod record;
mod schema;

pub use aligner::{align_to_schema, align_with_report, AlignedTable, AlignmentReport};
pub use encoder::{encode_for_schema, encode_one_hot, Column, EncodedTable};
pub use error::AlignmentError;
pub use record::{FieldValue, RawRecord};
pub use schema::FeatureSchema;
