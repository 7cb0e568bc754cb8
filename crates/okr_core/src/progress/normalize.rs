//! Progress percentage from a baseline/current/target triple.
//!
//! # Invariants
//! - Output is always within `0..=100`.
//! - Rounding is half away from zero.
//! - A zero target (increase) or non-positive current (decrease) yields `0`.

use crate::model::key_result::Direction;

/// Computes the normalized progress of a key result.
///
/// Increase: baseline-relative when a baseline differs from the target, with
/// a fallback to `current / target` while the metric has moved (`current > 0`)
/// but not yet cleared the baseline. Decrease: baseline-relative when the
/// baseline sits above the target, otherwise `target / current`.
pub fn progress(current: f64, target: f64, baseline: Option<f64>, direction: Direction) -> u8 {
    match direction {
        Direction::Increase => increase_progress(current, target, baseline),
        Direction::Decrease => decrease_progress(current, target, baseline),
    }
}

/// Rounded mean of several progress values; `0` for an empty set.
pub fn mean_progress(values: impl IntoIterator<Item = u8>) -> u8 {
    let (sum, count) = values
        .into_iter()
        .fold((0_u32, 0_u32), |(sum, count), value| {
            (sum + u32::from(value), count + 1)
        });
    if count == 0 {
        return 0;
    }
    to_percent(f64::from(sum) / f64::from(count))
}

fn increase_progress(current: f64, target: f64, baseline: Option<f64>) -> u8 {
    if target == 0.0 {
        return 0;
    }

    match baseline {
        Some(baseline) if target != baseline => {
            let relative = (current - baseline) / (target - baseline) * 100.0;
            if relative <= 0.0 && current > 0.0 && target > baseline {
                simple_ratio(current, target)
            } else if relative < 0.0 {
                0
            } else {
                to_percent(relative)
            }
        }
        _ => simple_ratio(current, target),
    }
}

fn decrease_progress(current: f64, target: f64, baseline: Option<f64>) -> u8 {
    if current <= 0.0 {
        return 0;
    }

    match baseline {
        Some(baseline) if baseline > target => {
            to_percent((baseline - current) / (baseline - target) * 100.0)
        }
        _ => to_percent(target / current * 100.0),
    }
}

fn simple_ratio(current: f64, target: f64) -> u8 {
    to_percent(current / target * 100.0)
}

fn to_percent(value: f64) -> u8 {
    if value.is_nan() {
        return 0;
    }
    // Clamped into 0..=100 first, so the cast cannot truncate.
    value.clamp(0.0, 100.0).round() as u8
}
