//! Order statistics aggregation.
//!
//! Pure functions over already-loaded orders; the handler fetches, this
//! module only counts. Periods are calendar-anchored in UTC: the current
//! week starting Monday 00:00, the current month from its first day, or
//! the current year from January 1.

use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Utc, Weekday};
use rust_decimal::Decimal;
use serde::Serialize;
use tienda_core::OrderStatus;

use crate::models::Order;

/// Reporting window anchored to the calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    #[default]
    Week,
    Month,
    Year,
}

impl FromStr for Period {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "week" => Ok(Self::Week),
            "month" => Ok(Self::Month),
            "year" => Ok(Self::Year),
            _ => Err(format!("invalid period: {s} (expected week, month, or year)")),
        }
    }
}

/// Aggregates for one calendar day.
#[derive(Debug, Clone, Serialize)]
pub struct DaySummary {
    pub date: NaiveDate,
    pub total: Decimal,
    pub count: u64,
    pub pending: u64,
    pub completed: u64,
    pub cancelled: u64,
}

impl DaySummary {
    const fn new(date: NaiveDate) -> Self {
        Self {
            date,
            total: Decimal::ZERO,
            count: 0,
            pending: 0,
            completed: 0,
            cancelled: 0,
        }
    }

    fn record(&mut self, order: &Order) {
        self.total += order.total;
        self.count += 1;
        match order.status {
            OrderStatus::Pending => self.pending += 1,
            OrderStatus::Completed => self.completed += 1,
            OrderStatus::Cancelled => self.cancelled += 1,
        }
    }
}

/// Aggregates for a whole reporting window.
#[derive(Debug, Serialize)]
pub struct OrdersSummary {
    pub period: Period,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub total_orders: u64,
    pub total_sales: Decimal,
    pub pending: u64,
    pub completed: u64,
    pub cancelled: u64,
    pub per_day: Vec<DaySummary>,
}

/// First instant of the reporting window containing `now`.
#[must_use]
pub fn start_of(period: Period, now: DateTime<Utc>) -> DateTime<Utc> {
    let today = now.date_naive();
    let date = match period {
        Period::Week => today.week(Weekday::Mon).first_day(),
        // Day 1 / ordinal 1 always exist; the fallback never fires
        Period::Month => today.with_day(1).unwrap_or(today),
        Period::Year => today.with_ordinal(1).unwrap_or(today),
    };
    date.and_time(NaiveTime::MIN).and_utc()
}

/// Tally the orders placed within `[start_of(period, now), now]`.
///
/// Sales totals stay exact decimals; per-day rows come back sorted by
/// date ascending.
#[must_use]
pub fn summarize(orders: &[Order], period: Period, now: DateTime<Utc>) -> OrdersSummary {
    let start = start_of(period, now);

    let mut days: BTreeMap<NaiveDate, DaySummary> = BTreeMap::new();
    let mut total_orders: u64 = 0;
    let mut total_sales = Decimal::ZERO;
    let mut pending: u64 = 0;
    let mut completed: u64 = 0;
    let mut cancelled: u64 = 0;

    for order in orders {
        if order.placed_at < start || order.placed_at > now {
            continue;
        }

        total_orders += 1;
        total_sales += order.total;
        match order.status {
            OrderStatus::Pending => pending += 1,
            OrderStatus::Completed => completed += 1,
            OrderStatus::Cancelled => cancelled += 1,
        }

        let date = order.placed_at.date_naive();
        days.entry(date)
            .or_insert_with(|| DaySummary::new(date))
            .record(order);
    }

    OrdersSummary {
        period,
        start,
        end: now,
        total_orders,
        total_sales,
        pending,
        completed,
        cancelled,
        per_day: days.into_values().collect(),
    }
}
