//! Column and grouping primitives shared by the formula and calculation layers.

use serde::{Deserialize, Serialize};

/// Data types of a bound measure column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    String,
    Int,
    Decimal,
    Float,
    Bool,
    Date,
    Timestamp,
}

/// Coarse grouping of [`DataType`] that drives the formula list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataCategory {
    String,
    Date,
    Boolean,
    Numeric,
}

impl DataType {
    /// Parse a data type from a string.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "string" | "char" | "text" => Some(DataType::String),
            "int" | "integer" | "long" | "short" | "byte" => Some(DataType::Int),
            "decimal" => Some(DataType::Decimal),
            "float" | "double" => Some(DataType::Float),
            "bool" | "boolean" => Some(DataType::Bool),
            "date" => Some(DataType::Date),
            "timestamp" | "time" | "timeinstant" => Some(DataType::Timestamp),
            _ => None,
        }
    }

    pub fn category(&self) -> DataCategory {
        match self {
            DataType::String => DataCategory::String,
            DataType::Int | DataType::Decimal | DataType::Float => DataCategory::Numeric,
            DataType::Bool => DataCategory::Boolean,
            DataType::Date | DataType::Timestamp => DataCategory::Date,
        }
    }

    pub fn is_numeric(&self) -> bool {
        self.category() == DataCategory::Numeric
    }

    pub fn is_date(&self) -> bool {
        self.category() == DataCategory::Date
    }
}

/// Date granularity of a grouped date column, coarsest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateLevel {
    Year,
    Quarter,
    Month,
    Week,
    Day,
    Hour,
    Minute,
    Second,
}

impl DateLevel {
    /// Parse a date level from a string.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "year" => Some(DateLevel::Year),
            "quarter" => Some(DateLevel::Quarter),
            "month" => Some(DateLevel::Month),
            "week" => Some(DateLevel::Week),
            "day" => Some(DateLevel::Day),
            "hour" => Some(DateLevel::Hour),
            "minute" => Some(DateLevel::Minute),
            "second" => Some(DateLevel::Second),
            _ => None,
        }
    }

    /// True when `self` is a strictly coarser bucket than `other`.
    pub fn is_coarser_than(&self, other: DateLevel) -> bool {
        *self < other
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DateLevel::Year => "year",
            DateLevel::Quarter => "quarter",
            DateLevel::Month => "month",
            DateLevel::Week => "week",
            DateLevel::Day => "day",
            DateLevel::Hour => "hour",
            DateLevel::Minute => "minute",
            DateLevel::Second => "second",
        }
    }
}

/// A column that can be bound as a measure or offered as a secondary operand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnRef {
    pub name: String,
    pub data_type: DataType,
    /// Column comes from an OLAP cube source.
    #[serde(default)]
    pub cube: bool,
}

impl ColumnRef {
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            cube: false,
        }
    }

    pub fn cube(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            cube: true,
        }
    }
}

/// A dimension present in the current grouping list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupDimension {
    pub name: String,
    /// Date granularity when the dimension groups a date column.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_level: Option<DateLevel>,
}

impl GroupDimension {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            date_level: None,
        }
    }

    pub fn date(name: impl Into<String>, level: DateLevel) -> Self {
        Self {
            name: name.into(),
            date_level: Some(level),
        }
    }
}

/// Percentage axis of an aggregate, persisted as its integer value.
///
/// Values are bit flags so the crosstab options can be combined by callers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub enum PercentageOption {
    #[default]
    None,
    Group,
    GrandTotal,
    RowGroup,
    ColGroup,
    RowGrandTotal,
    ColGrandTotal,
}

impl PercentageOption {
    pub const ALL: [PercentageOption; 7] = [
        PercentageOption::None,
        PercentageOption::Group,
        PercentageOption::GrandTotal,
        PercentageOption::RowGroup,
        PercentageOption::ColGroup,
        PercentageOption::RowGrandTotal,
        PercentageOption::ColGrandTotal,
    ];

    pub fn value(&self) -> i32 {
        match self {
            PercentageOption::None => 0,
            PercentageOption::Group => 1,
            PercentageOption::GrandTotal => 2,
            PercentageOption::RowGroup => 4,
            PercentageOption::ColGroup => 8,
            PercentageOption::RowGrandTotal => 16,
            PercentageOption::ColGrandTotal => 32,
        }
    }

    pub fn from_value(value: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|opt| opt.value() == value)
    }

    pub fn is_none(&self) -> bool {
        matches!(self, PercentageOption::None)
    }
}

impl From<PercentageOption> for i32 {
    fn from(opt: PercentageOption) -> Self {
        opt.value()
    }
}

impl TryFrom<i32> for PercentageOption {
    type Error = String;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Self::from_value(value).ok_or_else(|| format!("unknown percentage option: {}", value))
    }
}

impl std::fmt::Display for PercentageOption {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            PercentageOption::None => "none",
            PercentageOption::Group => "group",
            PercentageOption::GrandTotal => "grand_total",
            PercentageOption::RowGroup => "row_group",
            PercentageOption::ColGroup => "col_group",
            PercentageOption::RowGrandTotal => "row_grand_total",
            PercentageOption::ColGrandTotal => "col_grand_total",
        };
        write!(f, "{}", name)
    }
}
