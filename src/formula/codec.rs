//! Formula string codec.
//!
//! A base formula and its optional decorations share one wire token:
//!
//! ```text
//! token        := formula-name [ "<" percent-opt ">" ] [ "(" param ")" ]
//! percent-opt  := integer
//! param        := integer | column-name | dynamic-expr ("$..." | "=...")
//! ```
//!
//! Examples: `Sum`, `Sum<1>`, `NthLargest<2>(3)`, `Correlation(quantity)`,
//! `PthPercentile($(pct))`.
//!
//! Decoding never fails. A decoration that cannot be parsed is dropped and
//! reported through [`DecodeReport`] so callers can apply their defaults.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use super::catalog::{self, AggregateFormula, FormulaId};
use crate::model::PercentageOption;

/// Splits a token into base name, optional angle decoration and remainder.
static TOKEN_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?s)(?P<base>[^<(]*)(?:<(?P<pct>[^>]*)>)?(?P<rest>.*)$").unwrap());

/// The N/P argument of an Nth-* or Pth-* formula.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum NValue {
    Number(u32),
    /// Deferred expression (`$...` or `=...`), passed through unparsed.
    Dynamic(String),
}

impl NValue {
    /// Parse a raw N string. Dynamic expressions are kept verbatim.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if is_dynamic(raw) {
            return Some(NValue::Dynamic(raw.to_string()));
        }
        raw.parse::<u32>().ok().map(NValue::Number)
    }

    /// Positive integers and dynamic expressions are valid N values.
    pub fn is_valid(&self) -> bool {
        match self {
            NValue::Number(n) => *n > 0,
            NValue::Dynamic(_) => true,
        }
    }
}

impl fmt::Display for NValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NValue::Number(n) => write!(f, "{}", n),
            NValue::Dynamic(expr) => write!(f, "{}", expr),
        }
    }
}

/// True for deferred expressions, which are never parsed as numbers.
pub fn is_dynamic(raw: &str) -> bool {
    raw.starts_with('$') || raw.starts_with('=')
}

/// Parenthesized parameter of a formula token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum FormulaParam {
    N(NValue),
    Column(String),
}

/// Structured form of a formula wire token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormulaToken {
    pub formula: FormulaId,
    pub percentage: Option<PercentageOption>,
    pub param: Option<FormulaParam>,
}

impl FormulaToken {
    pub fn new(formula: FormulaId) -> Self {
        Self {
            formula,
            percentage: None,
            param: None,
        }
    }

    pub fn with_percentage(mut self, percentage: PercentageOption) -> Self {
        self.percentage = Some(percentage);
        self
    }

    pub fn with_n(mut self, n: NValue) -> Self {
        self.param = Some(FormulaParam::N(n));
        self
    }

    /// Set the secondary column. An empty name clears the parameter.
    pub fn with_column(mut self, column: impl Into<String>) -> Self {
        let column = column.into();
        self.param = if column.is_empty() {
            None
        } else {
            Some(FormulaParam::Column(column))
        };
        self
    }

    pub fn descriptor(&self) -> &'static AggregateFormula {
        self.formula.descriptor()
    }

    pub fn n(&self) -> Option<&NValue> {
        match &self.param {
            Some(FormulaParam::N(n)) => Some(n),
            _ => None,
        }
    }

    pub fn column(&self) -> Option<&str> {
        match &self.param {
            Some(FormulaParam::Column(column)) => Some(column),
            _ => None,
        }
    }

    /// Encode into the wire token.
    pub fn encode(&self) -> String {
        encode(self)
    }
}

impl fmt::Display for FormulaToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&encode(self))
    }
}

/// Decorations that were present in a token but could not be used.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecodeReport {
    /// Base name did not resolve to a catalog formula.
    pub unknown_formula: bool,
    /// Angle decoration was unterminated or not a known percentage value.
    pub malformed_percentage: bool,
    /// Parenthesized parameter was unmatched or not a number where one is required.
    pub malformed_param: bool,
}

impl DecodeReport {
    pub fn is_clean(&self) -> bool {
        !self.unknown_formula && !self.malformed_percentage && !self.malformed_param
    }
}

/// Encode a formula token.
///
/// The parameter is only written when the formula's flags permit it: an N value
/// for `has_n` formulas, a non-empty column for `two_columns` formulas.
pub fn encode(token: &FormulaToken) -> String {
    let formula = token.descriptor();
    let mut out = String::from(formula.formula_name);

    if let Some(percentage) = token.percentage {
        out.push('<');
        out.push_str(&percentage.value().to_string());
        out.push('>');
    }

    let param = match &token.param {
        Some(FormulaParam::N(n)) if formula.has_n => Some(n.to_string()),
        Some(FormulaParam::Column(column)) if formula.two_columns && !column.is_empty() => {
            Some(column.clone())
        }
        _ => None,
    };
    if let Some(param) = param {
        out.push('(');
        out.push_str(&param);
        out.push(')');
    }

    out
}

/// Decode a wire token, dropping decorations that cannot be parsed.
pub fn decode(token: &str) -> FormulaToken {
    decode_with_report(token).0
}

/// Decode a wire token and report which decorations were dropped.
pub fn decode_with_report(token: &str) -> (FormulaToken, DecodeReport) {
    let mut report = DecodeReport::default();

    let Some(caps) = TOKEN_PATTERN.captures(token) else {
        report.unknown_formula = true;
        return (FormulaToken::new(FormulaId::None), report);
    };

    let base = caps.name("base").map(|m| m.as_str()).unwrap_or_default();
    let formula = match catalog::find(base) {
        Some(formula) => formula,
        None => {
            report.unknown_formula = true;
            catalog::lookup(base)
        }
    };

    let percentage = match caps.name("pct") {
        Some(pct) => {
            let parsed = pct
                .as_str()
                .trim()
                .parse::<i32>()
                .ok()
                .and_then(PercentageOption::from_value);
            if parsed.is_none() {
                report.malformed_percentage = true;
            }
            parsed
        }
        None => None,
    };

    let rest = caps.name("rest").map(|m| m.as_str()).unwrap_or_default();
    if rest.starts_with('<') {
        report.malformed_percentage = true;
    }

    let param = if rest.is_empty() || rest.starts_with('<') {
        None
    } else if !formula.takes_param() {
        report.malformed_param = true;
        None
    } else {
        match strip_parens(rest) {
            Some(inner) if formula.has_n => {
                let n = NValue::parse(inner);
                if n.is_none() {
                    report.malformed_param = true;
                }
                n.map(FormulaParam::N)
            }
            Some(inner) if !inner.is_empty() => Some(FormulaParam::Column(inner.to_string())),
            _ => {
                report.malformed_param = true;
                None
            }
        }
    };

    if !report.is_clean() {
        tracing::debug!(token, ?report, "dropped malformed formula decorations");
    }

    (
        FormulaToken {
            formula: formula.id,
            percentage,
            param,
        },
        report,
    )
}

/// Inner text of `(...)` when the whole string is one parenthesized group.
fn strip_parens(s: &str) -> Option<&str> {
    s.strip_prefix('(')?.strip_suffix(')')
}
