//! The aggregate binding of a measure column.

use serde::{Deserialize, Serialize};

use crate::calc::CalculationVariant;
use crate::formula::{self, AggregateFormula, FormulaParam, FormulaToken, NValue};
use crate::model::{ColumnRef, PercentageOption};

/// A measure: a column, its base formula and the decorations around it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateBinding {
    pub column: ColumnRef,
    /// Wire token of the base formula.
    pub base_formula: String,
    /// N/P argument; may be a dynamic expression.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary_column: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calculation: Option<CalculationVariant>,
    #[serde(default)]
    pub percentage_option: PercentageOption,
}

impl AggregateBinding {
    pub fn new(column: ColumnRef, formula: &AggregateFormula) -> Self {
        Self {
            column,
            base_formula: formula.formula_name.to_string(),
            num_value: None,
            secondary_column: None,
            calculation: None,
            percentage_option: PercentageOption::None,
        }
    }

    /// Catalog entry of the base formula.
    pub fn formula(&self) -> &'static AggregateFormula {
        formula::decode(&self.base_formula).descriptor()
    }

    /// Encode the binding as a single formula token.
    pub fn to_token(&self) -> String {
        let formula = self.formula();
        let mut token = FormulaToken::new(formula.id);

        if !self.percentage_option.is_none() {
            token = token.with_percentage(self.percentage_option);
        }
        if formula.has_n {
            if let Some(n) = self.num_value.as_deref().and_then(NValue::parse) {
                token = token.with_n(n);
            }
        } else if formula.two_columns {
            if let Some(column) = &self.secondary_column {
                token = token.with_column(column.clone());
            }
        }

        token.encode()
    }

    /// Rebuild a binding of `column` from a persisted token.
    ///
    /// Decorations the token cannot carry are left unset.
    pub fn from_token(column: ColumnRef, token: &str) -> Self {
        let decoded = formula::decode(token);
        let mut binding = Self::new(column, decoded.descriptor());

        binding.percentage_option = decoded.percentage.unwrap_or_default();
        match decoded.param {
            Some(FormulaParam::N(n)) => binding.num_value = Some(n.to_string()),
            Some(FormulaParam::Column(name)) => binding.secondary_column = Some(name),
            None => {}
        }

        binding
    }

    /// Attach `variant`, replacing any previous one wholesale.
    ///
    /// Returns the variant that was attached before.
    pub fn attach_calculation(&mut self, variant: CalculationVariant) -> Option<CalculationVariant> {
        self.calculation.replace(variant)
    }

    pub fn detach_calculation(&mut self) -> Option<CalculationVariant> {
        self.calculation.take()
    }
}
