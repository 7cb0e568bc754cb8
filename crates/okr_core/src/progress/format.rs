//! Display strings for key result values.

use crate::model::key_result::UnitType;
use serde::Deserialize;

const DEFAULT_CURRENCY_SYMBOL: &str = "$";
const DEFAULT_PLACEHOLDER: &str = "–";
const DEFAULT_MAX_FRACTION_DIGITS: usize = 3;

/// Rendering knobs for [`format_value`], loaded from the `[format]` section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FormatConfig {
    pub currency_symbol: String,
    /// Shown when a value is absent.
    pub placeholder: String,
    /// Fractional digits kept before trailing zeros are trimmed.
    pub max_fraction_digits: usize,
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self {
            currency_symbol: DEFAULT_CURRENCY_SYMBOL.to_string(),
            placeholder: DEFAULT_PLACEHOLDER.to_string(),
            max_fraction_digits: DEFAULT_MAX_FRACTION_DIGITS,
        }
    }
}

/// Renders a value with its unit and optional trailing label.
///
/// - `None` (or a non-finite value) renders the placeholder alone.
/// - Currency: `-$1,234.5 label`.
/// - Percentage: `42% label`, without digit grouping.
/// - Number: `1,234 label`.
pub fn format_value(
    value: Option<f64>,
    unit_type: UnitType,
    label: Option<&str>,
    config: &FormatConfig,
) -> String {
    let Some(value) = value.filter(|value| value.is_finite()) else {
        return config.placeholder.clone();
    };

    let digits = trimmed_fixed(value.abs(), config.max_fraction_digits);
    let sign = if value < 0.0 && digits != "0" { "-" } else { "" };

    let mut rendered = match unit_type {
        UnitType::Currency => {
            format!("{sign}{}{}", config.currency_symbol, group_thousands(&digits))
        }
        UnitType::Percentage => format!("{sign}{digits}%"),
        UnitType::Number => format!("{sign}{}", group_thousands(&digits)),
    };

    if let Some(label) = label.map(str::trim).filter(|label| !label.is_empty()) {
        rendered.push(' ');
        rendered.push_str(label);
    }
    rendered
}

/// Fixed-point rendering with trailing fractional zeros removed.
fn trimmed_fixed(magnitude: f64, max_fraction_digits: usize) -> String {
    let fixed = format!("{magnitude:.max_fraction_digits$}");
    if !fixed.contains('.') {
        return fixed;
    }
    fixed.trim_end_matches('0').trim_end_matches('.').to_string()
}

fn group_thousands(digits: &str) -> String {
    let (integer, fraction) = match digits.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (digits, None),
    };

    let mut grouped = String::with_capacity(integer.len() + integer.len() / 3 + 4);
    for (index, ch) in integer.chars().enumerate() {
        if index > 0 && (integer.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if let Some(fraction) = fraction {
        grouped.push('.');
        grouped.push_str(fraction);
    }
    grouped
}
