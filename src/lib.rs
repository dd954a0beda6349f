//! # aggcalc
//!
//! Aggregate formulas and the secondary calculations layered on them.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │        formula (catalog + wire token codec)             │
//! │        "NthLargest<1>(3)" ⇄ FormulaToken                │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼
//! ┌─────────────────────────────────────────────────────────┐
//! │        binding (AggregateBinding + BindingRules)        │
//! │        defaults, eligibility, percentage axes           │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼
//! ┌─────────────────────────────────────────────────────────┐
//! │        calc (CalculationVariant + CalcEditor)           │
//! │        ◄── metadata (CalcMetadataProvider, async)       │
//! └─────────────────────────────────────────────────────────┘
//! ```

pub mod binding;
pub mod calc;
pub mod config;
pub mod error;
pub mod formula;
pub mod metadata;
pub mod model;

pub use error::{CalcError, CalcResult};

/// Re-exports for convenient usage.
pub mod prelude {
    pub use crate::binding::{AggregateBinding, BindingRules, PercentDirection};
    pub use crate::calc::{
        CalcEditor, CalcKind, CalculationVariant, CommitOutcome, EditorContext, PercentLevel,
        ResetLevel,
    };
    pub use crate::config::{CalcDefaults, Settings};
    pub use crate::error::{CalcError, CalcResult};
    pub use crate::formula::{decode, encode, lookup, FormulaId, FormulaToken, NValue};
    pub use crate::metadata::{CalcMetadataProvider, StaticMetadataProvider};
    pub use crate::model::{ColumnRef, DataType, DateLevel, GroupDimension, PercentageOption};
}
