//! Metadata request/response types.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::calc::{CalcKind, ResetLevel};

/// A metadata request stamped with the editor state that issued it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataRequest {
    /// Editor generation at the time of the request.
    pub generation: u64,
    /// Calculation kind selected when the request was issued.
    pub kind: CalcKind,
    /// Current break-by dimension, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub break_by: Option<String>,
}

impl MetadataRequest {
    pub fn new(generation: u64, kind: CalcKind, break_by: Option<String>) -> Self {
        Self {
            generation,
            kind,
            break_by,
        }
    }
}

/// Metadata the calculation editor needs from its collaborator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalcMetadata {
    /// Reset levels offered for the current break-by dimension.
    #[serde(default)]
    pub reset_options: Vec<ResetLevel>,
    /// Dimensions available as break-by.
    #[serde(default)]
    pub dimensions: Vec<String>,
    /// Whether each dimension supports a non-trivial reset level.
    #[serde(default)]
    pub reset_capabilities: HashMap<String, bool>,
}

impl CalcMetadata {
    /// Dimensions missing from the capability map do not support reset.
    pub fn supports_reset(&self, dimension: &str) -> bool {
        self.reset_capabilities
            .get(dimension)
            .copied()
            .unwrap_or(false)
    }
}

/// A metadata response echoing the stamp of its request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataResponse {
    pub request: MetadataRequest,
    pub metadata: CalcMetadata,
}
