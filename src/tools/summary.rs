// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Weekly and monthly running summaries
//!
//! Weeks run Monday to Sunday. A monthly summary also breaks the month into
//! 7-day chunks counted from the 1st and compares against the month before.

use chrono::{Datelike, Days, Local, Months, NaiveDate};
use serde::Serialize;
use serde_json::Value;

use super::activities::activity_list;
use super::args;
use super::{ToolContext, ToolError};
use crate::constants::json_fields::{END_DATE, MONTH, WEEKS, YEAR};
use crate::constants::limits::{DEFAULT_SUMMARY_WEEKS, MAX_SUMMARY_WEEKS};
use crate::constants::tools::{GET_MONTHLY_RUNNING_SUMMARY, GET_WEEKLY_RUNNING_SUMMARY};
use crate::normalize::{activity_date, is_running, RunningSummary};

/// Inclusive calendar range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

#[derive(Debug, Serialize)]
struct WeekSummary {
    #[serde(flatten)]
    summary: RunningSummary,
    week_start: NaiveDate,
    week_end: NaiveDate,
}

#[derive(Debug, Serialize)]
struct MonthWeekSummary {
    #[serde(flatten)]
    summary: RunningSummary,
    week_number: usize,
    week_start: NaiveDate,
    week_end: NaiveDate,
}

#[derive(Debug, Serialize)]
struct MonthComparison {
    /// Null when the previous month had no distance
    distance_change_pct: Option<f64>,
    runs_change: i64,
    previous_month_distance_km: f64,
    previous_month_runs: usize,
}

#[derive(Debug, Serialize)]
struct MonthSummary {
    year: i32,
    month: u32,
    #[serde(flatten)]
    summary: RunningSummary,
    weekly_breakdown: Vec<MonthWeekSummary>,
    vs_previous_month: MonthComparison,
}

fn out_of_range(what: &str) -> ToolError {
    ToolError::InvalidArguments(format!("{what} is outside the supported calendar"))
}

/// The Monday-to-Sunday week containing `anchor`, then the `weeks - 1`
/// weeks before it, newest first
pub fn week_ranges(anchor: NaiveDate, weeks: u32) -> Option<Vec<DateRange>> {
    (0..weeks)
        .map(|back| {
            let day = anchor.checked_sub_days(Days::new(7 * u64::from(back)))?;
            let start = day.checked_sub_days(Days::new(u64::from(day.weekday().num_days_from_monday())))?;
            let end = start.checked_add_days(Days::new(6))?;
            Some(DateRange { start, end })
        })
        .collect()
}

/// First to last day of a calendar month
pub fn month_range(year: i32, month: u32) -> Option<DateRange> {
    let start = NaiveDate::from_ymd_opt(year, month, 1)?;
    let end = start.checked_add_months(Months::new(1))?.pred_opt()?;
    Some(DateRange { start, end })
}

/// 7-day chunks from the 1st, the last one clipped to the month end
pub fn month_weeks(month: DateRange) -> Vec<DateRange> {
    let mut weeks = Vec::new();
    let mut start = month.start;
    while start <= month.end {
        let end = start
            .checked_add_days(Days::new(6))
            .map_or(month.end, |end| end.min(month.end));
        weeks.push(DateRange { start, end });
        match end.succ_opt() {
            Some(next) => start = next,
            None => break,
        }
    }
    weeks
}

async fn runs_between(ctx: &ToolContext, tool: &'static str, range: DateRange) -> Result<Vec<Value>, ToolError> {
    let raw = ctx
        .api()
        .get_activities_by_date(range.start, range.end, Some("running"))
        .await?;
    Ok(activity_list(tool, raw)?.into_iter().filter(is_running).collect())
}

fn to_json<T: Serialize>(value: &T) -> Result<Value, ToolError> {
    serde_json::to_value(value).map_err(ToolError::from)
}

/// One summary per week, newest first, ending with the week of `end_date`
pub async fn get_weekly_running_summary(ctx: &ToolContext, arguments: &Value) -> Result<Value, ToolError> {
    let anchor = args::optional_date(arguments, END_DATE)?.unwrap_or_else(|| Local::now().date_naive());
    let weeks = args::count(arguments, WEEKS, DEFAULT_SUMMARY_WEEKS, MAX_SUMMARY_WEEKS)?;
    let ranges = week_ranges(anchor, weeks).ok_or_else(|| out_of_range("end_date"))?;

    let mut summaries = Vec::with_capacity(ranges.len());
    for range in ranges {
        let runs = runs_between(ctx, GET_WEEKLY_RUNNING_SUMMARY, range).await?;
        summaries.push(WeekSummary {
            summary: RunningSummary::from_activities(&runs),
            week_start: range.start,
            week_end: range.end,
        });
    }
    to_json(&summaries)
}

pub async fn get_monthly_running_summary(ctx: &ToolContext, arguments: &Value) -> Result<Value, ToolError> {
    let today = Local::now().date_naive();
    let year = match args::optional_in_range(arguments, YEAR, 1..=9999)? {
        Some(year) => i32::try_from(year).map_err(|_| out_of_range("year"))?,
        None => today.year(),
    };
    let month = args::optional_in_range(arguments, MONTH, 1..=12)?.unwrap_or_else(|| today.month());

    let current = month_range(year, month).ok_or_else(|| out_of_range("year/month"))?;
    let previous = current
        .start
        .checked_sub_months(Months::new(1))
        .and_then(|start| month_range(start.year(), start.month()))
        .ok_or_else(|| out_of_range("previous month"))?;

    let runs = runs_between(ctx, GET_MONTHLY_RUNNING_SUMMARY, current).await?;
    let previous_runs = runs_between(ctx, GET_MONTHLY_RUNNING_SUMMARY, previous).await?;

    let weekly_breakdown = month_weeks(current)
        .into_iter()
        .enumerate()
        .map(|(index, week)| {
            let in_week: Vec<Value> = runs
                .iter()
                .filter(|run| activity_date(run).is_some_and(|date| week.contains(date)))
                .cloned()
                .collect();
            MonthWeekSummary {
                summary: RunningSummary::from_activities(&in_week),
                week_number: index + 1,
                week_start: week.start,
                week_end: week.end,
            }
        })
        .collect();

    let summary = RunningSummary::from_activities(&runs);
    let before = RunningSummary::from_activities(&previous_runs);
    #[allow(clippy::cast_possible_wrap)]
    let runs_change = summary.total_runs as i64 - before.total_runs as i64;

    to_json(&MonthSummary {
        year,
        month,
        vs_previous_month: MonthComparison {
            distance_change_pct: summary.distance_change_pct(&before),
            runs_change,
            previous_month_distance_km: before.total_distance_km,
            previous_month_runs: before.total_runs,
        },
        summary,
        weekly_breakdown,
    })
}
