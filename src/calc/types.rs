//! Field types shared by the calculation variants.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CalcError;
use crate::model::DateLevel;

/// Discriminator of a [`CalculationVariant`](super::CalculationVariant).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CalcKind {
    #[serde(rename = "PERCENT")]
    Percent,
    #[serde(rename = "CHANGE")]
    Change,
    #[serde(rename = "MOVING")]
    Moving,
    #[serde(rename = "RUNNINGTOTAL")]
    RunningTotal,
    #[serde(rename = "COMPOUNDGROWTH")]
    CompoundGrowth,
    #[serde(rename = "VALUE")]
    ValueOf,
    #[serde(rename = "CUSTOM")]
    Custom,
}

impl CalcKind {
    pub const ALL: [CalcKind; 7] = [
        CalcKind::Percent,
        CalcKind::Change,
        CalcKind::Moving,
        CalcKind::RunningTotal,
        CalcKind::CompoundGrowth,
        CalcKind::ValueOf,
        CalcKind::Custom,
    ];

    /// Value of the persisted `classType` discriminator.
    pub fn class_type(&self) -> &'static str {
        match self {
            CalcKind::Percent => "PERCENT",
            CalcKind::Change => "CHANGE",
            CalcKind::Moving => "MOVING",
            CalcKind::RunningTotal => "RUNNINGTOTAL",
            CalcKind::CompoundGrowth => "COMPOUNDGROWTH",
            CalcKind::ValueOf => "VALUE",
            CalcKind::Custom => "CUSTOM",
        }
    }

    /// Parse a kind from its `classType` or its long name (`RUNNING_TOTAL`).
    pub fn parse(s: &str) -> Result<Self, CalcError> {
        let normalized = s.trim().to_uppercase().replace(['_', '-'], "");
        match normalized.as_str() {
            "PERCENT" => Ok(CalcKind::Percent),
            "CHANGE" => Ok(CalcKind::Change),
            "MOVING" => Ok(CalcKind::Moving),
            "RUNNINGTOTAL" => Ok(CalcKind::RunningTotal),
            "COMPOUNDGROWTH" => Ok(CalcKind::CompoundGrowth),
            "VALUE" | "VALUEOF" => Ok(CalcKind::ValueOf),
            "CUSTOM" => Ok(CalcKind::Custom),
            _ => Err(CalcError::UnknownKind(s.to_string())),
        }
    }

    /// Whether the variant carries a reset level.
    pub fn has_reset_level(&self) -> bool {
        matches!(self, CalcKind::RunningTotal | CalcKind::CompoundGrowth)
    }
}

impl fmt::Display for CalcKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.class_type())
    }
}

/// Level of a percent calculation, persisted as a signed integer.
///
/// Negative values are total sentinels; non-negative values index the
/// dimension list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "i32", into = "i32")]
pub enum PercentLevel {
    #[default]
    GrandTotal,
    SubTotal,
    Dimension(u32),
}

impl PercentLevel {
    pub const GRAND_TOTAL: i32 = -1;
    pub const SUB_TOTAL: i32 = -2;
}

impl From<i32> for PercentLevel {
    fn from(value: i32) -> Self {
        match value {
            PercentLevel::SUB_TOTAL => PercentLevel::SubTotal,
            v if v < 0 => PercentLevel::GrandTotal,
            v => PercentLevel::Dimension(v as u32),
        }
    }
}

impl From<PercentLevel> for i32 {
    fn from(level: PercentLevel) -> Self {
        match level {
            PercentLevel::GrandTotal => PercentLevel::GRAND_TOTAL,
            PercentLevel::SubTotal => PercentLevel::SUB_TOTAL,
            PercentLevel::Dimension(index) => i32::try_from(index).unwrap_or(i32::MAX),
        }
    }
}

/// Reference period for change and value-of calculations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueOfFrom {
    #[default]
    First,
    Previous,
    Next,
    Last,
    PreviousYear,
    PreviousQuarter,
    PreviousWeek,
}

impl ValueOfFrom {
    /// Options legal for a reference column grouped at `date_level`.
    ///
    /// Non-date columns (`None`) only get the positional options.
    pub fn options_for(date_level: Option<DateLevel>) -> Vec<ValueOfFrom> {
        let mut options = vec![
            ValueOfFrom::First,
            ValueOfFrom::Previous,
            ValueOfFrom::Next,
            ValueOfFrom::Last,
        ];

        if let Some(level) = date_level {
            if DateLevel::Year.is_coarser_than(level) {
                options.push(ValueOfFrom::PreviousYear);
            }
            if DateLevel::Quarter.is_coarser_than(level) {
                options.push(ValueOfFrom::PreviousQuarter);
            }
            if level >= DateLevel::Day {
                options.push(ValueOfFrom::PreviousWeek);
            }
        }

        options
    }

    pub fn is_positional(&self) -> bool {
        matches!(
            self,
            ValueOfFrom::First | ValueOfFrom::Previous | ValueOfFrom::Next | ValueOfFrom::Last
        )
    }
}

/// Date granularity at which accumulation restarts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResetLevel {
    #[default]
    None,
    Year,
    Quarter,
    Month,
    Week,
    Day,
    Hour,
    Minute,
    Second,
}

impl ResetLevel {
    pub fn date_level(&self) -> Option<DateLevel> {
        match self {
            ResetLevel::None => None,
            ResetLevel::Year => Some(DateLevel::Year),
            ResetLevel::Quarter => Some(DateLevel::Quarter),
            ResetLevel::Month => Some(DateLevel::Month),
            ResetLevel::Week => Some(DateLevel::Week),
            ResetLevel::Day => Some(DateLevel::Day),
            ResetLevel::Hour => Some(DateLevel::Hour),
            ResetLevel::Minute => Some(DateLevel::Minute),
            ResetLevel::Second => Some(DateLevel::Second),
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, ResetLevel::None)
    }

    /// Reset levels usable below a date dimension grouped at `level`.
    pub fn options_below(level: DateLevel) -> Vec<ResetLevel> {
        let mut options = vec![ResetLevel::None];
        options.extend(
            [
                DateLevel::Year,
                DateLevel::Quarter,
                DateLevel::Month,
                DateLevel::Week,
                DateLevel::Day,
                DateLevel::Hour,
                DateLevel::Minute,
            ]
            .into_iter()
            .filter(|candidate| candidate.is_coarser_than(level))
            .map(ResetLevel::from),
        );
        options
    }
}

impl From<DateLevel> for ResetLevel {
    fn from(level: DateLevel) -> Self {
        match level {
            DateLevel::Year => ResetLevel::Year,
            DateLevel::Quarter => ResetLevel::Quarter,
            DateLevel::Month => ResetLevel::Month,
            DateLevel::Week => ResetLevel::Week,
            DateLevel::Day => ResetLevel::Day,
            DateLevel::Hour => ResetLevel::Hour,
            DateLevel::Minute => ResetLevel::Minute,
            DateLevel::Second => ResetLevel::Second,
        }
    }
}

/// Reset settings shared by running total and compound growth.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetScope {
    #[serde(default)]
    pub reset_level: ResetLevel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub break_by: Option<String>,
}
