//! Static registry of base aggregate formulas and their capabilities.
//!
//! Every formula is a program-wide constant. Capability bits (`two_columns`,
//! `has_n`, percentage class) live here and are queried by [`FormulaId`], never
//! by comparing display labels.

use std::collections::HashMap;
use std::sync::LazyLock;

use crate::model::{DataCategory, DataType};

/// Identity of a catalog formula.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormulaId {
    None,
    Sum,
    Average,
    Count,
    DistinctCount,
    Max,
    Min,
    Product,
    StandardDeviation,
    Variance,
    PopulationStandardDeviation,
    PopulationVariance,
    Median,
    Mode,
    SumSquares,
    First,
    Last,
    Correlation,
    Covariance,
    WeightedAverage,
    SumWeighted,
    NthLargest,
    NthSmallest,
    NthMostFrequent,
    PthPercentile,
    Concat,
}

/// When a formula may carry a percentage decoration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PercentageClass {
    /// Eligible with or without grouping.
    Always,
    /// Eligible only when at least one group/dimension is present.
    WithGroup,
    Never,
}

/// Immutable descriptor of a base aggregate formula.
#[derive(Debug, PartialEq, Eq)]
pub struct AggregateFormula {
    pub id: FormulaId,
    /// Canonical name.
    pub name: &'static str,
    /// Wire token used in the formula string.
    pub formula_name: &'static str,
    /// Display label.
    pub label: &'static str,
    /// Needs a secondary column operand.
    pub two_columns: bool,
    /// Needs a numeric N/P parameter.
    pub has_n: bool,
    pub percentage: PercentageClass,
}

impl AggregateFormula {
    const fn new(
        id: FormulaId,
        name: &'static str,
        formula_name: &'static str,
        label: &'static str,
        two_columns: bool,
        has_n: bool,
        percentage: PercentageClass,
    ) -> Self {
        Self {
            id,
            name,
            formula_name,
            label,
            two_columns,
            has_n,
            percentage,
        }
    }

    pub fn supports_percentage(&self) -> bool {
        self.percentage != PercentageClass::Never
    }

    pub fn is_none(&self) -> bool {
        self.id == FormulaId::None
    }

    /// Whether the formula accepts a parenthesized parameter in its token.
    pub fn takes_param(&self) -> bool {
        self.two_columns || self.has_n
    }

    /// Whether the secondary operand must be numeric.
    ///
    /// First/Last use the secondary column only for ordering, so any type works.
    pub fn needs_numeric_secondary(&self) -> bool {
        matches!(
            self.id,
            FormulaId::Correlation
                | FormulaId::Covariance
                | FormulaId::WeightedAverage
                | FormulaId::SumWeighted
        )
    }
}

use FormulaId as F;
use PercentageClass::{Always, Never, WithGroup};

/// All formulas in catalog order. The numeric formula list follows this order.
pub static CATALOG: [AggregateFormula; 26] = [
    AggregateFormula::new(F::None, "NONE", "None", "None", false, false, Always),
    AggregateFormula::new(F::Sum, "SUM", "Sum", "Sum", false, false, Always),
    AggregateFormula::new(F::Average, "AVG", "Average", "Average", false, false, Always),
    AggregateFormula::new(F::Count, "COUNT_ALL", "Count", "Count", false, false, Always),
    AggregateFormula::new(
        F::DistinctCount,
        "COUNT_DISTINCT",
        "DistinctCount",
        "Distinct Count",
        false,
        false,
        Always,
    ),
    AggregateFormula::new(F::Max, "MAX", "Max", "Max", false, false, Always),
    AggregateFormula::new(F::Min, "MIN", "Min", "Min", false, false, Always),
    AggregateFormula::new(F::Product, "PRODUCT", "Product", "Product", false, false, Always),
    AggregateFormula::new(
        F::StandardDeviation,
        "STANDARD_DEVIATION",
        "StandardDeviation",
        "Standard Deviation",
        false,
        false,
        Always,
    ),
    AggregateFormula::new(F::Variance, "VARIANCE", "Variance", "Variance", false, false, Always),
    AggregateFormula::new(
        F::PopulationStandardDeviation,
        "POPULATION_STANDARD_DEVIATION",
        "PopulationStandardDeviation",
        "Population Standard Deviation",
        false,
        false,
        Always,
    ),
    AggregateFormula::new(
        F::PopulationVariance,
        "POPULATION_VARIANCE",
        "PopulationVariance",
        "Population Variance",
        false,
        false,
        Always,
    ),
    AggregateFormula::new(F::Median, "MEDIAN", "Median", "Median", false, false, Always),
    AggregateFormula::new(F::Mode, "MODE", "Mode", "Mode", false, false, Always),
    AggregateFormula::new(F::SumSquares, "SUMSQ", "SumSQ", "Sum of Squares", false, false, Never),
    AggregateFormula::new(F::First, "FIRST", "First", "First", true, false, WithGroup),
    AggregateFormula::new(F::Last, "LAST", "Last", "Last", true, false, WithGroup),
    AggregateFormula::new(F::Correlation, "CORRELATION", "Correlation", "Correlation", true, false, Never),
    AggregateFormula::new(F::Covariance, "COVARIANCE", "Covariance", "Covariance", true, false, Never),
    AggregateFormula::new(
        F::WeightedAverage,
        "WEIGHTED_AVG",
        "WeightedAverage",
        "Weighted Average",
        true,
        false,
        Never,
    ),
    AggregateFormula::new(F::SumWeighted, "SUMWT", "SumWT", "Sum of Weights", true, false, Never),
    AggregateFormula::new(F::NthLargest, "NTH_LARGEST", "NthLargest", "Nth Largest", false, true, Never),
    AggregateFormula::new(
        F::NthSmallest,
        "NTH_SMALLEST",
        "NthSmallest",
        "Nth Smallest",
        false,
        true,
        Never,
    ),
    AggregateFormula::new(
        F::NthMostFrequent,
        "NTH_MOST_FREQUENT",
        "NthMostFrequent",
        "Nth Most Frequent",
        false,
        true,
        Never,
    ),
    AggregateFormula::new(
        F::PthPercentile,
        "PTH_PERCENTILE",
        "PthPercentile",
        "Pth Percentile",
        false,
        true,
        Never,
    ),
    AggregateFormula::new(F::Concat, "CONCAT", "Concat", "Concat", false, false, Never),
];

/// The NONE formula.
pub fn none() -> &'static AggregateFormula {
    &CATALOG[0]
}

/// Tokens that always resolve to NONE.
const NONE_TOKENS: [&str; 4] = ["None", "none", "null", ""];

/// Wire token, canonical name and label, in that precedence, to catalog index.
static INDEX: LazyLock<HashMap<&'static str, usize>> = LazyLock::new(|| {
    let mut index = HashMap::with_capacity(CATALOG.len() * 3);
    for (pos, formula) in CATALOG.iter().enumerate().rev() {
        index.insert(formula.label, pos);
    }
    for (pos, formula) in CATALOG.iter().enumerate().rev() {
        index.insert(formula.name, pos);
    }
    for (pos, formula) in CATALOG.iter().enumerate().rev() {
        index.insert(formula.formula_name, pos);
    }
    index
});

const STRING_FORMULAS: &[FormulaId] = &[
    F::Count,
    F::DistinctCount,
    F::Max,
    F::Min,
    F::First,
    F::Last,
    F::Mode,
    F::NthMostFrequent,
    F::Concat,
];

const DATE_FORMULAS: &[FormulaId] = &[
    F::Count,
    F::DistinctCount,
    F::Max,
    F::Min,
    F::First,
    F::Last,
    F::Mode,
    F::NthLargest,
    F::NthSmallest,
    F::NthMostFrequent,
];

const BOOLEAN_FORMULAS: &[FormulaId] = &[F::Count, F::DistinctCount, F::First, F::Last, F::Mode];

const CUBE_FORMULAS: &[FormulaId] = &[
    F::Sum,
    F::Average,
    F::Count,
    F::DistinctCount,
    F::Max,
    F::Min,
];

impl FormulaId {
    pub fn descriptor(&self) -> &'static AggregateFormula {
        CATALOG
            .iter()
            .find(|formula| formula.id == *self)
            .unwrap_or_else(none)
    }
}

/// Resolve a token to its formula. Unknown tokens resolve to NONE.
pub fn lookup(token: &str) -> &'static AggregateFormula {
    if NONE_TOKENS.contains(&token) {
        return none();
    }

    match INDEX.get(token) {
        Some(&pos) => &CATALOG[pos],
        None => {
            tracing::debug!(token, "unrecognized aggregate formula, using None");
            none()
        }
    }
}

/// Resolve an optional token; absent resolves to NONE.
pub fn lookup_opt(token: Option<&str>) -> &'static AggregateFormula {
    token.map(lookup).unwrap_or_else(none)
}

/// Resolve a token only if it names a catalog formula.
pub fn find(token: &str) -> Option<&'static AggregateFormula> {
    if NONE_TOKENS.contains(&token) {
        return Some(none());
    }
    INDEX.get(token).map(|&pos| &CATALOG[pos])
}

/// Ordered formula list for a column, prefixed with NONE.
pub fn formulas_for_data_type(data_type: DataType, is_cube: bool) -> Vec<&'static AggregateFormula> {
    let mut formulas = Vec::with_capacity(CATALOG.len());
    formulas.push(none());
    formulas.extend(formulas_for_data_type_without_none(data_type, is_cube));
    formulas
}

/// Ordered formula list for a column, without the NONE entry.
pub fn formulas_for_data_type_without_none(
    data_type: DataType,
    is_cube: bool,
) -> Vec<&'static AggregateFormula> {
    if is_cube {
        return CUBE_FORMULAS.iter().map(FormulaId::descriptor).collect();
    }

    match data_type.category() {
        DataCategory::Numeric => CATALOG.iter().filter(|f| !f.is_none()).collect(),
        DataCategory::String => STRING_FORMULAS.iter().map(FormulaId::descriptor).collect(),
        DataCategory::Date => DATE_FORMULAS.iter().map(FormulaId::descriptor).collect(),
        DataCategory::Boolean => BOOLEAN_FORMULAS.iter().map(FormulaId::descriptor).collect(),
    }
}

/// Formula selected when a column is first bound as a measure.
pub fn default_formula(data_type: DataType, is_cube: bool) -> &'static AggregateFormula {
    if is_cube || data_type.is_numeric() {
        FormulaId::Sum.descriptor()
    } else {
        FormulaId::Count.descriptor()
    }
}
