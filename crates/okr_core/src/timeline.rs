//! Month bucketing and bar geometry for the Gantt timeline.
//!
//! # Responsibility
//! - Compute the visible month window around "today" that contains every
//!   dated item.
//! - Convert item date spans into left/width percentages of that window.
//!
//! # Invariants
//! - The window starts on the first day of a month and ends on the last day
//!   of a month.
//! - The window always covers at least the configured default span.
//! - Bar geometry satisfies `0 <= left`, `width >= MIN_BAR_WIDTH_PERCENT`
//!   and `left + width <= 100`.

use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};

/// Narrowest bar drawn, so same-day spans stay visible.
pub const MIN_BAR_WIDTH_PERCENT: f64 = 1.0;

/// Default window around today, loaded from the `[timeline]` section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TimelineConfig {
    /// Whole months shown before the current month.
    pub lookback_months: u32,
    /// Whole months shown after the current month.
    pub lookahead_months: u32,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            lookback_months: 1,
            lookahead_months: 6,
        }
    }
}

/// Dated input to bucketing; children are nested sub-items such as tasks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimelineItem {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub children: Vec<TimelineItem>,
}

impl TimelineItem {
    pub fn new(start_date: Option<NaiveDate>, end_date: Option<NaiveDate>) -> Self {
        Self {
            start_date,
            end_date,
            children: Vec::new(),
        }
    }
}

/// One calendar month column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthBucket {
    pub first_day: NaiveDate,
    pub last_day: NaiveDate,
    /// Short label such as `Jan '25`.
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimelineRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub months: Vec<MonthBucket>,
}

impl TimelineRange {
    pub fn bar(&self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Option<BarPosition> {
        bar_position(start, end, self.start, self.end)
    }

    pub fn today_marker(&self, today: NaiveDate) -> Option<f64> {
        today_marker(today, self.start, self.end)
    }
}

/// Horizontal placement of one bar, in percent of the window width.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BarPosition {
    pub left_percent: f64,
    pub width_percent: f64,
}

/// Computes the month window covering the default span and every dated item.
pub fn compute_range(
    items: &[TimelineItem],
    today: NaiveDate,
    config: &TimelineConfig,
) -> TimelineRange {
    let current_month = month_start(today);
    let mut start = current_month
        .checked_sub_months(Months::new(config.lookback_months))
        .unwrap_or(current_month);
    let mut end = current_month
        .checked_add_months(Months::new(config.lookahead_months))
        .map_or(month_end(current_month), month_end);

    let mut pending: Vec<&TimelineItem> = items.iter().collect();
    while let Some(item) = pending.pop() {
        if let Some(item_start) = item.start_date.filter(|date| *date < start) {
            start = month_start(item_start);
        }
        if let Some(item_end) = item.end_date.filter(|date| *date > end) {
            end = month_end(item_end);
        }
        pending.extend(item.children.iter());
    }

    TimelineRange {
        start,
        end,
        months: month_buckets(start, end),
    }
}

/// Places an item span inside the window; `None` when either date is missing.
pub fn bar_position(
    item_start: Option<NaiveDate>,
    item_end: Option<NaiveDate>,
    range_start: NaiveDate,
    range_end: NaiveDate,
) -> Option<BarPosition> {
    let (item_start, item_end) = (item_start?, item_end?);
    let total_days = window_days(range_start, range_end);

    let offset_days = (item_start - range_start).num_days().max(0);
    let left = (offset_days as f64 / total_days * 100.0).min(100.0 - MIN_BAR_WIDTH_PERCENT);

    let span_days = (item_end - item_start).num_days().max(1);
    let width = (span_days as f64 / total_days * 100.0)
        .min(100.0 - left)
        .max(MIN_BAR_WIDTH_PERCENT);

    Some(BarPosition {
        left_percent: left,
        width_percent: width,
    })
}

/// Position of `today` in percent of the window; `None` when outside it.
pub fn today_marker(today: NaiveDate, range_start: NaiveDate, range_end: NaiveDate) -> Option<f64> {
    let percent =
        (today - range_start).num_days() as f64 / window_days(range_start, range_end) * 100.0;
    (0.0..=100.0).contains(&percent).then_some(percent)
}

fn window_days(range_start: NaiveDate, range_end: NaiveDate) -> f64 {
    (range_end - range_start).num_days().max(1) as f64
}

fn month_buckets(start: NaiveDate, end: NaiveDate) -> Vec<MonthBucket> {
    let mut months = Vec::new();
    let mut cursor = month_start(start);
    while cursor <= end {
        months.push(MonthBucket {
            first_day: cursor,
            last_day: month_end(cursor),
            label: cursor.format("%b '%y").to_string(),
        });
        match cursor.checked_add_months(Months::new(1)) {
            Some(next) => cursor = next,
            None => break,
        }
    }
    months
}

fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

fn month_end(date: NaiveDate) -> NaiveDate {
    month_start(date)
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .unwrap_or(date)
}
