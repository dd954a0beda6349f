//! Crate error type.
//!
//! Malformed tokens, invalid N values, unsupported reset levels and unknown
//! formulas are not errors: they are normalized in place. `CalcError` covers
//! what a caller must handle.

use thiserror::Error;

use crate::metadata::MetadataError;
use crate::model::PercentageOption;

/// Result type for calculation operations.
pub type CalcResult<T> = Result<T, CalcError>;

#[derive(Error, Debug)]
pub enum CalcError {
    /// Requested percentage axis is not legal for the grouping shape.
    #[error(
        "percentage option '{}' is not allowed here (allowed: {})",
        .option,
        format_options(.allowed)
    )]
    IllegalPercentageOption {
        option: PercentageOption,
        allowed: Vec<PercentageOption>,
    },

    /// Kind tag is not one of the calculation kinds.
    #[error("unknown calculation kind: {0}")]
    UnknownKind(String),

    /// Persisted variant JSON could not be read or written.
    #[error("invalid calculation JSON: {0}")]
    InvalidVariantJson(#[source] serde_json::Error),

    /// Metadata collaborator failed.
    #[error(transparent)]
    Metadata(#[from] MetadataError),
}

fn format_options(options: &[PercentageOption]) -> String {
    options
        .iter()
        .map(|opt| opt.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
