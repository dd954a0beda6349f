//! Percentage axis resolution and grouping-change re-derivation.
//!
//! The legal axis set is a pure function of the grouping shape, so nothing
//! here is cached: callers rebuild a [`PercentDirection`] whenever a dimension
//! is added, removed or reordered.

use serde::{Deserialize, Serialize};

use crate::calc::{CalculationVariant, PercentLevel, ResetLevel};
use crate::error::{CalcError, CalcResult};
use crate::model::{GroupDimension, PercentageOption};

/// Legal percentage options for a crosstab.
pub fn crosstab_options(has_row: bool, has_col: bool) -> Vec<PercentageOption> {
    let mut options = vec![PercentageOption::None];
    if has_row {
        options.push(PercentageOption::RowGroup);
        options.push(PercentageOption::RowGrandTotal);
    }
    if has_col {
        options.push(PercentageOption::ColGroup);
        options.push(PercentageOption::ColGrandTotal);
    }
    options
}

/// Legal percentage options for a table or chart, which have a single axis.
pub fn table_options(has_group: bool) -> Vec<PercentageOption> {
    if has_group {
        vec![
            PercentageOption::None,
            PercentageOption::Group,
            PercentageOption::GrandTotal,
        ]
    } else {
        vec![PercentageOption::None, PercentageOption::GrandTotal]
    }
}

/// Grouping shape of the binding that owns an aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PercentDirection {
    Crosstab { has_row: bool, has_col: bool },
    Table { has_group: bool },
}

impl Default for PercentDirection {
    fn default() -> Self {
        PercentDirection::Table { has_group: false }
    }
}

impl PercentDirection {
    pub fn crosstab(has_row: bool, has_col: bool) -> Self {
        PercentDirection::Crosstab { has_row, has_col }
    }

    pub fn table(has_group: bool) -> Self {
        PercentDirection::Table { has_group }
    }

    pub fn is_crosstab(&self) -> bool {
        matches!(self, PercentDirection::Crosstab { .. })
    }

    /// Legal options for this shape, `None` first.
    pub fn options(&self) -> Vec<PercentageOption> {
        match *self {
            PercentDirection::Crosstab { has_row, has_col } => crosstab_options(has_row, has_col),
            PercentDirection::Table { has_group } => table_options(has_group),
        }
    }

    pub fn allows(&self, option: PercentageOption) -> bool {
        self.options().contains(&option)
    }

    /// Accept `requested` if it is legal for this shape.
    pub fn resolve(&self, requested: PercentageOption) -> CalcResult<PercentageOption> {
        let allowed = self.options();
        if allowed.contains(&requested) {
            Ok(requested)
        } else {
            Err(CalcError::IllegalPercentageOption {
                option: requested,
                allowed,
            })
        }
    }
}

/// Bring a variant back in line with a new grouping list.
///
/// Drops a `break_by` that is no longer grouped, forces the reset level to
/// `none` unless it is strictly coarser than the finest grouped date level,
/// and sends an out-of-range percent dimension index back to grand total.
/// Returns whether anything changed.
pub fn rederive_after_grouping_change(
    variant: &mut CalculationVariant,
    groups: &[GroupDimension],
) -> bool {
    let mut changed = false;

    if let CalculationVariant::Percent(calc) = variant {
        if let PercentLevel::Dimension(index) = calc.level {
            if index as usize >= groups.len() {
                tracing::debug!(index, groups = groups.len(), "percent level out of range");
                calc.level = PercentLevel::GrandTotal;
                changed = true;
            }
        }
    }

    let finest_date = groups.iter().filter_map(|group| group.date_level).max();

    if let Some(scope) = variant.reset_scope_mut() {
        if let Some(break_by) = &scope.break_by {
            if !groups.iter().any(|group| &group.name == break_by) {
                tracing::debug!(break_by = %break_by, "break-by dimension no longer grouped");
                scope.break_by = None;
                changed = true;
            }
        }

        let legal = match (scope.reset_level.date_level(), finest_date) {
            (None, _) => true,
            (Some(reset), Some(finest)) => reset.is_coarser_than(finest),
            (Some(_), None) => false,
        };
        if !legal {
            scope.reset_level = ResetLevel::None;
            changed = true;
        }
    }

    changed
}
