//! Range filter over dataset summaries
//!
//! A [`DatasetFilter`] holds independently optional bounds. Every present bound
//! becomes one [`Predicate`]; the predicates are ANDed and rendered to SQL by
//! the storage layer.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Summary field a predicate applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SummaryField {
    DatasetName,
    MinimumTimestamp,
    AvgExecutionSeconds,
    AvgStoreValue,
    TimeSpanSeconds,
}

impl SummaryField {
    /// Column holding this field in the `datasets` table
    pub fn column(&self) -> &'static str {
        match self {
            SummaryField::DatasetName => "dataset_name",
            SummaryField::MinimumTimestamp => "minimum_timestamp_us",
            SummaryField::AvgExecutionSeconds => "avg_execution_seconds",
            SummaryField::AvgStoreValue => "avg_store_value",
            SummaryField::TimeSpanSeconds => "time_span_seconds",
        }
    }
}

/// Inclusive comparison used by a predicate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Comparison {
    Equal,
    AtLeast,
    AtMost,
}

impl Comparison {
    /// SQL operator
    pub fn operator(&self) -> &'static str {
        match self {
            Comparison::Equal => "=",
            Comparison::AtLeast => ">=",
            Comparison::AtMost => "<=",
        }
    }
}

/// Typed bound value
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Text(String),
    Timestamp(DateTime<Utc>),
    Float(f64),
    Decimal(Decimal),
    Integer(i64),
}

/// One comparison of a summary field against a bound
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    pub field: SummaryField,
    pub comparison: Comparison,
    pub value: FilterValue,
}

impl Predicate {
    fn new(field: SummaryField, comparison: Comparison, value: FilterValue) -> Self {
        Self {
            field,
            comparison,
            value,
        }
    }
}

/// Optional inclusive `[min, max]` bounds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InclusiveRange<T> {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<T>,
}

impl<T> Default for InclusiveRange<T> {
    fn default() -> Self {
        Self {
            min: None,
            max: None,
        }
    }
}

impl<T> InclusiveRange<T> {
    pub fn new(min: Option<T>, max: Option<T>) -> Self {
        Self { min, max }
    }
}

impl<T: Clone> InclusiveRange<T> {
    fn push_predicates(
        &self,
        field: SummaryField,
        wrap: fn(T) -> FilterValue,
        predicates: &mut Vec<Predicate>,
    ) {
        if let Some(min) = &self.min {
            predicates.push(Predicate::new(field, Comparison::AtLeast, wrap(min.clone())));
        }
        if let Some(max) = &self.max {
            predicates.push(Predicate::new(field, Comparison::AtMost, wrap(max.clone())));
        }
    }
}

/// Conjunction of optional bounds over dataset summary fields
///
/// An empty dataset name imposes no constraint, like an absent one. Bounds that
/// cannot be satisfied (min above max) simply produce an empty result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dataset_name: Option<String>,
    pub minimum_timestamp: InclusiveRange<DateTime<Utc>>,
    pub avg_execution_seconds: InclusiveRange<f64>,
    pub avg_store_value: InclusiveRange<Decimal>,
    pub time_span_seconds: InclusiveRange<i64>,
}

impl DatasetFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict to one dataset name
    pub fn with_dataset_name(mut self, name: impl Into<String>) -> Self {
        self.dataset_name = Some(name.into());
        self
    }

    pub fn with_minimum_timestamp(
        mut self,
        min: Option<DateTime<Utc>>,
        max: Option<DateTime<Utc>>,
    ) -> Self {
        self.minimum_timestamp = InclusiveRange::new(min, max);
        self
    }

    pub fn with_avg_execution_seconds(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.avg_execution_seconds = InclusiveRange::new(min, max);
        self
    }

    pub fn with_avg_store_value(mut self, min: Option<Decimal>, max: Option<Decimal>) -> Self {
        self.avg_store_value = InclusiveRange::new(min, max);
        self
    }

    pub fn with_time_span_seconds(mut self, min: Option<i64>, max: Option<i64>) -> Self {
        self.time_span_seconds = InclusiveRange::new(min, max);
        self
    }

    /// Name constraint, if one applies
    pub fn name_constraint(&self) -> Option<&str> {
        self.dataset_name.as_deref().filter(|name| !name.is_empty())
    }

    /// One predicate per present bound
    pub fn predicates(&self) -> Vec<Predicate> {
        let mut predicates = Vec::new();

        if let Some(name) = self.name_constraint() {
            predicates.push(Predicate::new(
                SummaryField::DatasetName,
                Comparison::Equal,
                FilterValue::Text(name.to_string()),
            ));
        }

        self.minimum_timestamp.push_predicates(
            SummaryField::MinimumTimestamp,
            FilterValue::Timestamp,
            &mut predicates,
        );
        self.avg_execution_seconds.push_predicates(
            SummaryField::AvgExecutionSeconds,
            FilterValue::Float,
            &mut predicates,
        );
        self.avg_store_value.push_predicates(
            SummaryField::AvgStoreValue,
            FilterValue::Decimal,
            &mut predicates,
        );
        self.time_span_seconds.push_predicates(
            SummaryField::TimeSpanSeconds,
            FilterValue::Integer,
            &mut predicates,
        );

        predicates
    }
}
