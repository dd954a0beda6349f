//! Column, grouping and percentage-axis types.

pub mod types;

pub use types::{
    ColumnRef, DataCategory, DataType, DateLevel, GroupDimension, PercentageOption,
};
