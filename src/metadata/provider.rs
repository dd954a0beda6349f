//! CalcMetadataProvider trait definition.
//!
//! The calculation editor asks an external collaborator for the reset levels,
//! break-by dimensions and per-dimension reset capabilities of the current
//! binding. Responses can arrive after the user has moved on; the editor
//! decides whether a response still applies (see
//! [`CalcEditor::apply_metadata`](crate::calc::CalcEditor::apply_metadata)).

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use super::types::{CalcMetadata, MetadataRequest, MetadataResponse};
use crate::calc::ResetLevel;
use crate::model::GroupDimension;

/// Result type for metadata operations.
pub type MetadataResult<T> = Result<T, MetadataError>;

/// Errors reported by a metadata collaborator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MetadataError {
    /// The collaborator could not be reached.
    #[error("metadata service unavailable: {0}")]
    Unavailable(String),

    /// A dimension named in the request is not part of the binding.
    #[error("unknown dimension: {0}")]
    UnknownDimension(String),

    /// The collaborator answered with an error.
    #[error("metadata error: {message} (code: {code})")]
    Remote { code: String, message: String },
}

impl MetadataError {
    pub fn remote(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Remote {
            code: code.into(),
            message: message.into(),
        }
    }

    /// Check if this error is retriable.
    pub fn is_retriable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

/// Source of the metadata the calculation editor needs.
///
/// # Example
///
/// ```ignore
/// use aggcalc::metadata::CalcMetadataProvider;
///
/// async fn refresh(editor: &mut CalcEditor, provider: &impl CalcMetadataProvider) {
///     let request = editor.begin_metadata_request();
///     if let Ok(response) = provider.load(request).await {
///         editor.apply_metadata(response);
///     }
/// }
/// ```
#[async_trait]
pub trait CalcMetadataProvider: Send + Sync {
    /// Reset levels offered for `dimension` (or the binding when `None`).
    async fn reset_options(&self, dimension: Option<&str>) -> MetadataResult<Vec<ResetLevel>>;

    /// Dimensions that can be used as break-by.
    async fn break_by_dimensions(&self) -> MetadataResult<Vec<String>>;

    /// Whether each dimension supports a non-trivial reset level.
    async fn reset_capabilities(&self) -> MetadataResult<HashMap<String, bool>>;

    /// Fetch everything for `request` concurrently and echo its stamp.
    async fn load(&self, request: MetadataRequest) -> MetadataResult<MetadataResponse> {
        let (reset_options, dimensions, reset_capabilities) = futures::try_join!(
            self.reset_options(request.break_by.as_deref()),
            self.break_by_dimensions(),
            self.reset_capabilities(),
        )?;

        Ok(MetadataResponse {
            request,
            metadata: CalcMetadata {
                reset_options,
                dimensions,
                reset_capabilities,
            },
        })
    }
}

/// In-memory provider built from the current grouping list.
///
/// Reset levels come from the finest grouped date dimension. Every dimension
/// supports reset unless marked otherwise.
#[derive(Debug, Clone, Default)]
pub struct StaticMetadataProvider {
    groups: Vec<GroupDimension>,
    no_reset: HashSet<String>,
    latency: Option<Duration>,
    failure: Option<MetadataError>,
}

impl StaticMetadataProvider {
    pub fn new(groups: Vec<GroupDimension>) -> Self {
        Self {
            groups,
            ..Self::default()
        }
    }

    /// Mark a dimension as not supporting reset levels.
    pub fn without_reset_support(mut self, dimension: impl Into<String>) -> Self {
        self.no_reset.insert(dimension.into());
        self
    }

    /// Delay every answer, to simulate a slow collaborator.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Fail every request with `error`.
    pub fn failing(mut self, error: MetadataError) -> Self {
        self.failure = Some(error);
        self
    }

    async fn ready(&self) -> MetadataResult<()> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        match &self.failure {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl CalcMetadataProvider for StaticMetadataProvider {
    async fn reset_options(&self, dimension: Option<&str>) -> MetadataResult<Vec<ResetLevel>> {
        self.ready().await?;

        if let Some(dimension) = dimension {
            if !self.groups.iter().any(|group| group.name == dimension) {
                return Err(MetadataError::UnknownDimension(dimension.to_string()));
            }
            if self.no_reset.contains(dimension) {
                return Ok(vec![ResetLevel::None]);
            }
        }

        let finest = self.groups.iter().filter_map(|group| group.date_level).max();
        Ok(match finest {
            Some(level) => ResetLevel::options_below(level),
            None => vec![ResetLevel::None],
        })
    }

    async fn break_by_dimensions(&self) -> MetadataResult<Vec<String>> {
        self.ready().await?;
        Ok(self.groups.iter().map(|group| group.name.clone()).collect())
    }

    async fn reset_capabilities(&self) -> MetadataResult<HashMap<String, bool>> {
        self.ready().await?;
        Ok(self
            .groups
            .iter()
            .map(|group| (group.name.clone(), !self.no_reset.contains(&group.name)))
            .collect())
    }
}
