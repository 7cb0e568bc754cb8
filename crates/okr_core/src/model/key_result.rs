//! Key result model.
//!
//! # Invariants
//! - `target_value` is always present.
//! - `baseline_value = None` disables baseline-relative progress.
//! - Progress is derived on read and never stored.

use crate::model::org::ObjectiveId;
use crate::progress::{format_value, progress, FormatConfig};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub type KeyResultId = Uuid;

/// Which way the metric has to move to count as progress.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Higher current value is better.
    #[default]
    Increase,
    /// Lower current value is better, e.g. time-to-resolution.
    Decrease,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Increase => "increase",
            Self::Decrease => "decrease",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "increase" => Some(Self::Increase),
            "decrease" => Some(Self::Decrease),
            _ => None,
        }
    }
}

/// How a key result value is rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitType {
    #[default]
    Number,
    Currency,
    Percentage,
}

impl UnitType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Number => "number",
            Self::Currency => "currency",
            Self::Percentage => "percentage",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "number" => Some(Self::Number),
            "currency" => Some(Self::Currency),
            "percentage" => Some(Self::Percentage),
            _ => None,
        }
    }
}

/// Validation errors raised before a key result is persisted.
#[derive(Debug, Clone, PartialEq)]
pub enum KeyResultValidationError {
    BlankTitle,
    NonFiniteValue(&'static str),
}

impl Display for KeyResultValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankTitle => write!(f, "key result title must not be blank"),
            Self::NonFiniteValue(field) => write!(f, "key result {field} must be a finite number"),
        }
    }
}

impl Error for KeyResultValidationError {}

/// A measurable target tied to one objective.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyResult {
    pub uuid: KeyResultId,
    pub objective_uuid: ObjectiveId,
    pub title: String,
    pub current_value: f64,
    pub target_value: f64,
    pub baseline_value: Option<f64>,
    pub direction: Direction,
    pub unit_type: UnitType,
    pub value_label: Option<String>,
    /// Headline metric for the owning department; at most one per department.
    pub is_top: bool,
}

impl KeyResult {
    /// Creates a key result with zero current value and no baseline.
    pub fn new(objective_uuid: ObjectiveId, title: impl Into<String>, target_value: f64) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            objective_uuid,
            title: title.into(),
            current_value: 0.0,
            target_value,
            baseline_value: None,
            direction: Direction::Increase,
            unit_type: UnitType::Number,
            value_label: None,
            is_top: false,
        }
    }

    pub fn validate(&self) -> Result<(), KeyResultValidationError> {
        if self.title.trim().is_empty() {
            return Err(KeyResultValidationError::BlankTitle);
        }
        if !self.current_value.is_finite() {
            return Err(KeyResultValidationError::NonFiniteValue("current_value"));
        }
        if !self.target_value.is_finite() {
            return Err(KeyResultValidationError::NonFiniteValue("target_value"));
        }
        if self.baseline_value.is_some_and(|value| !value.is_finite()) {
            return Err(KeyResultValidationError::NonFiniteValue("baseline_value"));
        }
        Ok(())
    }

    /// Normalized 0..=100 progress for the current values.
    pub fn progress(&self) -> u8 {
        progress(
            self.current_value,
            self.target_value,
            self.baseline_value,
            self.direction,
        )
    }

    pub fn view(&self, config: &FormatConfig) -> KeyResultView {
        let label = self.value_label.as_deref();
        KeyResultView {
            progress: self.progress(),
            current_display: format_value(Some(self.current_value), self.unit_type, label, config),
            target_display: format_value(Some(self.target_value), self.unit_type, label, config),
            baseline_display: format_value(self.baseline_value, self.unit_type, label, config),
            key_result: self.clone(),
        }
    }
}

/// Read model handed to dashboards: the record plus its derived values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeyResultView {
    pub key_result: KeyResult,
    pub progress: u8,
    pub current_display: String,
    pub target_display: String,
    pub baseline_display: String,
}
