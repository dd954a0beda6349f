//! Base aggregate formulas.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────┐     ┌──────────────────────────────┐
//! │ catalog                      │     │ codec                        │
//! │  - lookup(token)             │◄────│  - encode(FormulaToken)      │
//! │  - formulas_for_data_type()  │     │  - decode("Sum<1>(3)")       │
//! │  - capability bits per id    │     │                              │
//! └──────────────────────────────┘     └──────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use aggcalc::formula::{decode, FormulaId, NValue};
//!
//! let token = decode("NthLargest(3)");
//! assert_eq!(token.formula, FormulaId::NthLargest);
//! assert_eq!(token.n(), Some(&NValue::Number(3)));
//! assert_eq!(token.encode(), "NthLargest(3)");
//! ```

pub mod catalog;
pub mod codec;

pub use catalog::{
    default_formula, find, formulas_for_data_type, formulas_for_data_type_without_none, lookup,
    lookup_opt, none, AggregateFormula, FormulaId, PercentageClass, CATALOG,
};
pub use codec::{
    decode, decode_with_report, encode, is_dynamic, DecodeReport, FormulaParam, FormulaToken,
    NValue,
};
