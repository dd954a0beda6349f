//! Defaulting and eligibility rules for aggregate bindings.

use serde::Serialize;

use super::aggregate::AggregateBinding;
use crate::config::CalcDefaults;
use crate::formula::{self, AggregateFormula, FormulaParam, NValue, PercentageClass};
use crate::model::{ColumnRef, DataType, PercentageOption};

/// Result of checking an N/P argument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NCheck {
    /// Value to persist.
    pub value: String,
    /// The input was replaced by the default; the caller should warn.
    pub coerced: bool,
}

/// Which formula controls apply to a binding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FormulaControls {
    pub n: bool,
    pub secondary_column: bool,
    pub percentage: bool,
}

/// Rule engine for base formula selection and parameter defaulting.
#[derive(Debug, Clone, Default)]
pub struct BindingRules {
    defaults: CalcDefaults,
}

impl BindingRules {
    pub fn new(defaults: CalcDefaults) -> Self {
        Self { defaults }
    }

    pub fn defaults(&self) -> &CalcDefaults {
        &self.defaults
    }

    /// Formulas offered for a column, `None` first.
    pub fn default_formula_set(
        &self,
        data_type: DataType,
        is_cube: bool,
    ) -> Vec<&'static AggregateFormula> {
        formula::formulas_for_data_type(data_type, is_cube)
    }

    /// A binding for a newly selected measure column.
    pub fn new_binding(&self, column: ColumnRef) -> AggregateBinding {
        let formula = formula::default_formula(column.data_type, column.cube);
        AggregateBinding::new(column, formula)
    }

    /// Switch the base formula and fix up its parameters.
    ///
    /// Parameters embedded in `token` win over the binding's current ones.
    /// A two-column formula keeps a still-compatible secondary column or takes
    /// the first compatible one from `available`; an N formula gets the
    /// default N; any other formula clears both. A percentage option the new
    /// formula can never carry is dropped.
    pub fn on_formula_changed(
        &self,
        binding: &mut AggregateBinding,
        token: &str,
        available: &[ColumnRef],
    ) -> &'static AggregateFormula {
        let decoded = formula::decode(token);
        let formula = decoded.descriptor();

        binding.base_formula = formula.formula_name.to_string();
        if let Some(percentage) = decoded.percentage {
            binding.percentage_option = percentage;
        }
        match decoded.param {
            Some(FormulaParam::N(n)) => binding.num_value = Some(n.to_string()),
            Some(FormulaParam::Column(name)) => binding.secondary_column = Some(name),
            None => {}
        }

        if formula.two_columns {
            binding.num_value = None;

            let still_compatible = binding.secondary_column.as_deref().is_some_and(|name| {
                available
                    .iter()
                    .find(|column| column.name == name)
                    .map_or(true, |column| {
                        is_compatible_secondary(formula, &binding.column, column)
                    })
            });
            if !still_compatible {
                binding.secondary_column = available
                    .iter()
                    .find(|column| is_compatible_secondary(formula, &binding.column, column))
                    .map(|column| column.name.clone());
                tracing::debug!(
                    formula = formula.formula_name,
                    secondary = ?binding.secondary_column,
                    "selected secondary column"
                );
            }
        } else if formula.has_n {
            binding.secondary_column = None;
            if binding.num_value.is_none() {
                binding.num_value = Some(self.defaults.default_n.clone());
            }
        } else {
            binding.secondary_column = None;
            binding.num_value = None;
        }

        if !formula.supports_percentage() {
            binding.percentage_option = PercentageOption::None;
        }

        formula
    }

    /// Whether the binding's formula may carry a percentage option.
    pub fn is_percentage_eligible(&self, binding: &AggregateBinding, group_count: usize) -> bool {
        match binding.formula().percentage {
            PercentageClass::Always => true,
            PercentageClass::WithGroup => group_count > 0,
            PercentageClass::Never => false,
        }
    }

    pub fn controls(&self, binding: &AggregateBinding, group_count: usize) -> FormulaControls {
        let formula = binding.formula();
        FormulaControls {
            n: formula.has_n,
            secondary_column: formula.two_columns,
            percentage: self.is_percentage_eligible(binding, group_count),
        }
    }

    /// Accept a positive integer or a dynamic expression, else the default N.
    pub fn validate_n(&self, value: Option<&str>) -> NCheck {
        match value.and_then(NValue::parse) {
            Some(n) if n.is_valid() => NCheck {
                value: n.to_string(),
                coerced: false,
            },
            _ => {
                tracing::debug!(?value, "invalid N value, using default");
                NCheck {
                    value: self.defaults.default_n.clone(),
                    coerced: true,
                }
            }
        }
    }
}

/// Correlation, covariance and the weighted formulas need a numeric second
/// operand unless the source is a cube; first/last accept any column.
fn is_compatible_secondary(
    formula: &AggregateFormula,
    source: &ColumnRef,
    candidate: &ColumnRef,
) -> bool {
    !formula.needs_numeric_secondary() || source.cube || candidate.data_type.is_numeric()
}
