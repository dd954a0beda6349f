//! Metadata collaborator for the calculation editor.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         CalcEditor                              │
//! │  begin_metadata_request() ──► MetadataRequest {generation,kind} │
//! │  apply_metadata(response) ◄── MetadataResponse (stamp echoed)   │
//! └─────────────────────────────────────────────────────────────────┘
//!                           │            ▲
//!                           ▼            │
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                  CalcMetadataProvider (async)                   │
//! │  - reset_options(dimension)                                     │
//! │  - break_by_dimensions()                                        │
//! │  - reset_capabilities()                                         │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The request carries the editor generation; a response whose stamp no
//! longer matches the editor is discarded.

mod provider;
mod types;

pub use provider::{CalcMetadataProvider, MetadataError, MetadataResult, StaticMetadataProvider};
pub use types::{CalcMetadata, MetadataRequest, MetadataResponse};
