//! Secondary calculations layered on a base aggregate.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │ CalcEditor                                                    │
//! │  select_kind ──► fresh CalculationVariant, generation += 1    │
//! │  apply_metadata ──► dropped unless generation and kind match  │
//! │  commit ──► CommitOutcome {variant, percentage_option, ...}   │
//! └───────────────────────────────────────────────────────────────┘
//!                               │
//!                               ▼
//! ┌───────────────────────────────────────────────────────────────┐
//! │ CalculationVariant (tagged by classType)                      │
//! │  PERCENT │ CHANGE │ MOVING │ RUNNINGTOTAL │ COMPOUNDGROWTH │   │
//! │  VALUE │ CUSTOM                                               │
//! └───────────────────────────────────────────────────────────────┘
//! ```

pub mod editor;
pub mod types;
pub mod variant;

pub use editor::{CalcEditor, CommitOutcome, EditorContext};
pub use types::{CalcKind, PercentLevel, ResetLevel, ResetScope, ValueOfFrom};
pub use variant::{
    CalculationVariant, ChangeCalc, CompoundGrowthCalc, CustomCalc, MovingCalc, PercentCalc,
    RunningTotalCalc, ValueOfCalc,
};
