//! Secondary calculation variants.
//!
//! [`CalculationVariant`] is a sum type with one payload per kind. It persists as
//! a JSON object tagged by `classType`:
//!
//! ```json
//! {"classType":"MOVING","aggregate":"NthLargest(2)","previous":2,"next":2,
//!  "includeCurrentValue":true,"nullIfNoEnoughValue":false,"innerDim":""}
//! ```
//!
//! Fields the crate does not define are kept in each payload's `extra` map and
//! written back unchanged.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::types::{CalcKind, PercentLevel, ResetLevel, ResetScope, ValueOfFrom};
use crate::config::CalcDefaults;
use crate::error::{CalcError, CalcResult};

/// Percent of a subtotal, grand total or dimension level.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PercentCalc {
    #[serde(default)]
    pub level: PercentLevel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column_name: Option<String>,
    /// Crosstab only.
    #[serde(default)]
    pub by_row: bool,
    /// Crosstab only.
    #[serde(default)]
    pub by_column: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_template: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Change from a reference value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeCalc {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column_name: Option<String>,
    #[serde(default)]
    pub from: ValueOfFrom,
    #[serde(default)]
    pub as_percent: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_template: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Value of a reference period.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueOfCalc {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column_name: Option<String>,
    #[serde(default)]
    pub from: ValueOfFrom,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_template: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Moving aggregate over a window of neighbouring values.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovingCalc {
    /// Inner aggregate token, e.g. `Average` or `NthLargest(2)`.
    pub aggregate: String,
    #[serde(default)]
    pub previous: i32,
    #[serde(default)]
    pub next: i32,
    #[serde(default)]
    pub include_current_value: bool,
    #[serde(default)]
    pub null_if_no_enough_value: bool,
    /// Crosstab inner dimension; empty for charts.
    #[serde(default)]
    pub inner_dim: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_template: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl MovingCalc {
    /// Number of values in the window.
    pub fn window_size(&self) -> u32 {
        let previous = self.previous.max(0) as u32;
        let next = self.next.max(0) as u32;
        previous + next + u32::from(self.include_current_value)
    }
}

/// Running accumulation with an optional reset level.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunningTotalCalc {
    /// Inner aggregate token.
    pub aggregate: String,
    #[serde(flatten)]
    pub reset: ResetScope,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_template: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Compound growth rate with an optional reset level.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompoundGrowthCalc {
    #[serde(flatten)]
    pub reset: ResetScope,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_template: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Editor-defined calculation; the payload is opaque.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CustomCalc {
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

/// A secondary calculation attached to an aggregate.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "classType")]
pub enum CalculationVariant {
    #[serde(rename = "PERCENT")]
    Percent(PercentCalc),
    #[serde(rename = "CHANGE")]
    Change(ChangeCalc),
    #[serde(rename = "MOVING")]
    Moving(MovingCalc),
    #[serde(rename = "RUNNINGTOTAL")]
    RunningTotal(RunningTotalCalc),
    #[serde(rename = "COMPOUNDGROWTH")]
    CompoundGrowth(CompoundGrowthCalc),
    #[serde(rename = "VALUE")]
    ValueOf(ValueOfCalc),
    #[serde(rename = "CUSTOM")]
    Custom(CustomCalc),
}

impl PartialEq for CalculationVariant {
    /// Same kind and equal kind-specific fields. Display templates and unknown
    /// fields are ignored.
    fn eq(&self, other: &Self) -> bool {
        use CalculationVariant as V;

        match (self, other) {
            (V::Percent(a), V::Percent(b)) => {
                a.level == b.level
                    && a.column_name == b.column_name
                    && a.by_row == b.by_row
                    && a.by_column == b.by_column
            }
            (V::Change(a), V::Change(b)) => {
                a.column_name == b.column_name && a.from == b.from && a.as_percent == b.as_percent
            }
            (V::ValueOf(a), V::ValueOf(b)) => a.column_name == b.column_name && a.from == b.from,
            (V::Moving(a), V::Moving(b)) => {
                a.aggregate == b.aggregate
                    && a.previous == b.previous
                    && a.next == b.next
                    && a.include_current_value == b.include_current_value
                    && a.null_if_no_enough_value == b.null_if_no_enough_value
                    && a.inner_dim == b.inner_dim
            }
            (V::RunningTotal(a), V::RunningTotal(b)) => {
                a.aggregate == b.aggregate && a.reset == b.reset
            }
            // Compound growth shares ResetScope with running total, but a
            // running total never equals a compound growth (falls to `_`).
            (V::CompoundGrowth(a), V::CompoundGrowth(b)) => a.reset == b.reset,
            (V::Custom(a), V::Custom(b)) => a.fields == b.fields,
            _ => false,
        }
    }
}

impl Eq for CalculationVariant {}

impl Default for CalculationVariant {
    fn default() -> Self {
        CalculationVariant::Percent(PercentCalc::default())
    }
}

impl CalculationVariant {
    /// A fresh variant of `kind` with kind defaults.
    ///
    /// `first_column` seeds the reference column of change and value-of.
    pub fn fresh(kind: CalcKind, defaults: &CalcDefaults, first_column: Option<&str>) -> Self {
        match kind {
            CalcKind::Percent => CalculationVariant::Percent(PercentCalc::default()),
            CalcKind::Change => CalculationVariant::Change(ChangeCalc {
                column_name: first_column.map(str::to_string),
                ..ChangeCalc::default()
            }),
            CalcKind::ValueOf => CalculationVariant::ValueOf(ValueOfCalc {
                column_name: first_column.map(str::to_string),
                ..ValueOfCalc::default()
            }),
            CalcKind::Moving => CalculationVariant::Moving(MovingCalc {
                aggregate: defaults.moving_aggregate.clone(),
                previous: defaults.moving_previous,
                next: defaults.moving_next,
                include_current_value: defaults.moving_include_current,
                null_if_no_enough_value: false,
                inner_dim: String::new(),
                display_template: None,
                extra: Map::new(),
            }),
            CalcKind::RunningTotal => CalculationVariant::RunningTotal(RunningTotalCalc {
                aggregate: defaults.running_total_aggregate.clone(),
                reset: ResetScope::default(),
                display_template: None,
                extra: Map::new(),
            }),
            CalcKind::CompoundGrowth => {
                CalculationVariant::CompoundGrowth(CompoundGrowthCalc::default())
            }
            CalcKind::Custom => CalculationVariant::Custom(CustomCalc::default()),
        }
    }

    pub fn kind(&self) -> CalcKind {
        match self {
            CalculationVariant::Percent(_) => CalcKind::Percent,
            CalculationVariant::Change(_) => CalcKind::Change,
            CalculationVariant::Moving(_) => CalcKind::Moving,
            CalculationVariant::RunningTotal(_) => CalcKind::RunningTotal,
            CalculationVariant::CompoundGrowth(_) => CalcKind::CompoundGrowth,
            CalculationVariant::ValueOf(_) => CalcKind::ValueOf,
            CalculationVariant::Custom(_) => CalcKind::Custom,
        }
    }

    /// Inner aggregate token of moving and running total variants.
    pub fn inner_aggregate(&self) -> Option<&str> {
        match self {
            CalculationVariant::Moving(calc) => Some(&calc.aggregate),
            CalculationVariant::RunningTotal(calc) => Some(&calc.aggregate),
            _ => None,
        }
    }

    pub fn inner_aggregate_mut(&mut self) -> Option<&mut String> {
        match self {
            CalculationVariant::Moving(calc) => Some(&mut calc.aggregate),
            CalculationVariant::RunningTotal(calc) => Some(&mut calc.aggregate),
            _ => None,
        }
    }

    pub fn reset_scope(&self) -> Option<&ResetScope> {
        match self {
            CalculationVariant::RunningTotal(calc) => Some(&calc.reset),
            CalculationVariant::CompoundGrowth(calc) => Some(&calc.reset),
            _ => None,
        }
    }

    pub fn reset_scope_mut(&mut self) -> Option<&mut ResetScope> {
        match self {
            CalculationVariant::RunningTotal(calc) => Some(&mut calc.reset),
            CalculationVariant::CompoundGrowth(calc) => Some(&mut calc.reset),
            _ => None,
        }
    }

    pub fn reset_level(&self) -> Option<ResetLevel> {
        self.reset_scope().map(|scope| scope.reset_level)
    }

    /// Reference column of percent, change and value-of variants.
    pub fn column_name(&self) -> Option<&str> {
        match self {
            CalculationVariant::Percent(calc) => calc.column_name.as_deref(),
            CalculationVariant::Change(calc) => calc.column_name.as_deref(),
            CalculationVariant::ValueOf(calc) => calc.column_name.as_deref(),
            _ => None,
        }
    }

    pub fn from_json(json: &str) -> CalcResult<Self> {
        serde_json::from_str(json).map_err(CalcError::InvalidVariantJson)
    }

    pub fn from_value(value: Value) -> CalcResult<Self> {
        serde_json::from_value(value).map_err(CalcError::InvalidVariantJson)
    }

    pub fn to_json(&self) -> CalcResult<String> {
        serde_json::to_string(self).map_err(CalcError::InvalidVariantJson)
    }
}

impl From<PercentCalc> for CalculationVariant {
    fn from(calc: PercentCalc) -> Self {
        CalculationVariant::Percent(calc)
    }
}

impl From<ChangeCalc> for CalculationVariant {
    fn from(calc: ChangeCalc) -> Self {
        CalculationVariant::Change(calc)
    }
}

impl From<ValueOfCalc> for CalculationVariant {
    fn from(calc: ValueOfCalc) -> Self {
        CalculationVariant::ValueOf(calc)
    }
}

impl From<MovingCalc> for CalculationVariant {
    fn from(calc: MovingCalc) -> Self {
        CalculationVariant::Moving(calc)
    }
}

impl From<RunningTotalCalc> for CalculationVariant {
    fn from(calc: RunningTotalCalc) -> Self {
        CalculationVariant::RunningTotal(calc)
    }
}

impl From<CompoundGrowthCalc> for CalculationVariant {
    fn from(calc: CompoundGrowthCalc) -> Self {
        CalculationVariant::CompoundGrowth(calc)
    }
}
