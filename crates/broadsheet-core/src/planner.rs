//! Query planning: which months to ask for and which collections to ask.

use chrono::{Datelike, Months, NaiveDate};
use serde::Serialize;

use crate::analytics::CollectionEntry;

/// Upper bound on the number of months in one broadsheet.
pub const MAX_BUCKETS: usize = 12;

/// One closed calendar-month query window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct MonthBucket {
    pub start: NaiveDate,
    /// Last day of the same calendar month.
    pub end: NaiveDate,
}

impl MonthBucket {
    /// The bucket covering the month that contains `day`.
    pub fn containing(day: NaiveDate) -> Self {
        let start = first_of_month(day);
        let end = start
            .checked_add_months(Months::new(1))
            .and_then(|next| next.pred_opt())
            .unwrap_or(start);
        Self { start, end }
    }

    /// `(start, end)` as `YYYYMMDD` strings for query payloads.
    pub fn api_period(&self) -> (String, String) {
        (
            self.start.format("%Y%m%d").to_string(),
            self.end.format("%Y%m%d").to_string(),
        )
    }

    /// Axis label such as `March 2026`.
    pub fn label(&self) -> String {
        self.start.format("%B %Y").to_string()
    }

    /// Date in the `YYYY/MM/DD` form expected by time axes.
    pub fn axis_date(&self) -> String {
        self.start.format("%Y/%m/%d").to_string()
    }
}

pub fn first_of_month(day: NaiveDate) -> NaiveDate {
    day.with_day(1).unwrap_or(day)
}

/// Whole calendar months from `start`'s month to `end`'s month.
pub fn months_between(start: NaiveDate, end: NaiveDate) -> i32 {
    (end.year() - start.year()) * 12 + end.month() as i32 - start.month() as i32
}

/// Plan the month buckets for a tenant, oldest first.
///
/// Only complete months are planned: the current month (the one containing
/// `today`) is never included, and when analytics data starts part-way
/// through a month that month is skipped too. At most [`MAX_BUCKETS`] of the
/// most recent complete months are returned. `earliest = None` means the
/// start of the data is unknown and a full window is planned.
pub fn plan_buckets(today: NaiveDate, earliest: Option<NaiveDate>) -> Vec<MonthBucket> {
    let current_month = first_of_month(today);
    let window_start = current_month
        .checked_sub_months(Months::new(MAX_BUCKETS as u32))
        .unwrap_or(current_month);

    let first_full_month = match earliest {
        Some(day) if day.day() == 1 => day,
        Some(day) => first_of_month(day)
            .checked_add_months(Months::new(1))
            .unwrap_or(current_month),
        None => window_start,
    };

    let mut cursor = first_full_month.max(window_start);
    let mut buckets = Vec::with_capacity(MAX_BUCKETS);
    while cursor < current_month {
        buckets.push(MonthBucket::containing(cursor));
        match cursor.checked_add_months(Months::new(1)) {
            Some(next) => cursor = next,
            None => break,
        }
    }
    buckets
}

/// The analytics collection queried for visits, with its conversion side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalyticsCollection {
    pub id: String,
    pub conversion_collection: String,
    pub transaction_field: String,
    /// First day the integration has data for, when the platform reports it.
    pub date_start: Option<NaiveDate>,
}

impl AnalyticsCollection {
    pub fn from_entry(entry: &CollectionEntry) -> Self {
        let (conversion_collection, transaction_field) = if entry.id == "visits.adobe" {
            ("conversion", "orders")
        } else {
            ("conversion.dip", "transactions")
        };
        Self {
            id: entry.id.clone(),
            conversion_collection: conversion_collection.to_string(),
            transaction_field: transaction_field.to_string(),
            date_start: entry.date_start.as_deref().and_then(parse_collection_date),
        }
    }
}

/// Pick the first collection whose id mentions `visit`.
pub fn select_collection(entries: &[CollectionEntry]) -> Option<AnalyticsCollection> {
    entries
        .iter()
        .find(|e| e.id.contains("visit"))
        .map(AnalyticsCollection::from_entry)
}

fn parse_collection_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    let date_part = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(raw, "%Y%m%d"))
        .ok()
}
