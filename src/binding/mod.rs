//! Aggregate bindings and the rules that keep them consistent.
//!
//! - [`AggregateBinding`]: a measure column with its formula decorations and
//!   optional calculation variant
//! - [`BindingRules`]: formula lists, parameter defaulting, eligibility
//! - [`PercentDirection`]: legal percentage axes for a grouping shape

pub mod aggregate;
pub mod percent;
pub mod rules;

pub use aggregate::AggregateBinding;
pub use percent::{crosstab_options, rederive_after_grouping_change, table_options, PercentDirection};
pub use rules::{BindingRules, FormulaControls, NCheck};
