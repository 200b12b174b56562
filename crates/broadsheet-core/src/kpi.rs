//! Per-month KPIs and the aggregates derived from them.

use serde::Serialize;

use crate::format::round2;
use crate::planner::MonthBucket;

/// Sentinel reported when no month has at least two visits per order.
pub const NO_MIN_VISITS_PER_ORDER: i64 = -1;

/// The six scalars tracked for one month.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct MonthlyKpi {
    pub orders: u64,
    pub revenue: u64,
    /// `revenue / orders`, 0 without orders.
    pub order_value: u64,
    pub visits: u64,
    /// `revenue / visits` rounded to two decimals, 0 without visits.
    pub visit_value: f64,
    /// `visits / orders`, 0 without orders.
    pub visits_per_order: u64,
}

impl MonthlyKpi {
    pub fn from_totals(orders: u64, revenue: u64, visits: u64) -> Self {
        let order_value = if orders > 0 { revenue / orders } else { 0 };
        let visits_per_order = if orders > 0 { visits / orders } else { 0 };
        let visit_value = if visits > 0 {
            round2(revenue as f64 / visits as f64)
        } else {
            0.0
        };
        Self {
            orders,
            revenue,
            order_value,
            visits,
            visit_value,
            visits_per_order,
        }
    }
}

/// One bucket together with its KPIs. Keeping both in one row means the
/// date vectors and the KPI vectors can never drift apart.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MonthlyRow {
    pub bucket: MonthBucket,
    pub kpi: MonthlyKpi,
}

/// Months where a metric came back as zero, detected before cleaning.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DataIssues {
    pub revenue: bool,
    pub visits: bool,
    pub orders: bool,
}

impl DataIssues {
    pub fn detect(rows: &[MonthlyRow]) -> Self {
        rows.iter().fold(Self::default(), |acc, row| Self {
            revenue: acc.revenue || row.kpi.revenue == 0,
            visits: acc.visits || row.kpi.visits == 0,
            orders: acc.orders || row.kpi.orders == 0,
        })
    }

    pub fn any(&self) -> bool {
        self.revenue || self.visits || self.orders
    }

    /// Names of the affected series, in display order.
    pub fn affected(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.revenue {
            names.push("revenue data");
        }
        if self.visits {
            names.push("visits data");
        }
        if self.orders {
            names.push("orders data");
        }
        names
    }
}

/// Drop every month without revenue.
pub fn clean(rows: Vec<MonthlyRow>) -> Vec<MonthlyRow> {
    rows.into_iter().filter(|row| row.kpi.revenue > 0).collect()
}

/// Compound monthly growth rate, `(last / first)^(1/n) - 1`.
///
/// Returns 0 for fewer than two values or when the first value is 0.
pub fn cmgr(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return 0.0;
    }
    let first = values[0];
    let last = values[n - 1];
    if first == 0.0 {
        return 0.0;
    }
    (last / first).powf(1.0 / n as f64) - 1.0
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct CmgrSet {
    pub revenue: f64,
    pub visits: f64,
    pub visit_value: f64,
    pub orders: f64,
    pub order_value: f64,
}

impl CmgrSet {
    pub fn from_rows(rows: &[MonthlyRow]) -> Self {
        let series = |f: fn(&MonthlyKpi) -> f64| -> Vec<f64> {
            rows.iter().map(|row| f(&row.kpi)).collect()
        };
        Self {
            revenue: cmgr(&series(|k| k.revenue as f64)),
            visits: cmgr(&series(|k| k.visits as f64)),
            visit_value: cmgr(&series(|k| k.visit_value)),
            orders: cmgr(&series(|k| k.orders as f64)),
            order_value: cmgr(&series(|k| k.order_value as f64)),
        }
    }
}

/// Totals, averages and growth over the cleaned months.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Aggregates {
    pub total_visits: u64,
    pub total_orders: u64,
    pub total_revenue: u64,
    /// Mean of the monthly order values.
    pub average_order_value: u64,
    /// Mean of the monthly visit values.
    pub average_visit_value: f64,
    /// Mean of the monthly visits per order.
    pub average_visits_per_order: u64,
    pub max_visits_per_order: u64,
    /// Smallest monthly value that is at least 2.
    pub min_visits_per_order: Option<u64>,
    pub cmgr: CmgrSet,
}

impl Aggregates {
    pub fn compute(rows: &[MonthlyRow]) -> Self {
        let n = rows.len() as u64;
        if n == 0 {
            return Self::default();
        }
        let kpis = rows.iter().map(|r| &r.kpi);

        let total_visits = kpis.clone().map(|k| k.visits).sum();
        let total_orders = kpis.clone().map(|k| k.orders).sum();
        let total_revenue = kpis.clone().map(|k| k.revenue).sum();
        let sum_order_value: u64 = kpis.clone().map(|k| k.order_value).sum();
        let sum_visit_value: f64 = kpis.clone().map(|k| k.visit_value).sum();
        let sum_vpo: u64 = kpis.clone().map(|k| k.visits_per_order).sum();

        Self {
            total_visits,
            total_orders,
            total_revenue,
            average_order_value: sum_order_value / n,
            average_visit_value: sum_visit_value / n as f64,
            average_visits_per_order: sum_vpo / n,
            max_visits_per_order: kpis.clone().map(|k| k.visits_per_order).max().unwrap_or(0),
            min_visits_per_order: kpis.map(|k| k.visits_per_order).filter(|v| *v >= 2).min(),
            cmgr: CmgrSet::from_rows(rows),
        }
    }

    /// Min visits per order with the `-1` sentinel when undefined.
    pub fn min_visits_per_order_or_sentinel(&self) -> i64 {
        self.min_visits_per_order
            .map(|v| v as i64)
            .unwrap_or(NO_MIN_VISITS_PER_ORDER)
    }
}

/// One row of the revenue forecast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ForecastStep {
    pub visits: u64,
    pub revenue: u64,
}

/// Projected revenue for `0, increment, 2*increment, ..` up to `max_visits`.
pub fn forecast_ladder(
    increment: u64,
    max_visits: u64,
    average_visits_per_order: u64,
    average_order_value: u64,
) -> Vec<ForecastStep> {
    if increment == 0 {
        return Vec::new();
    }
    (0..=max_visits / increment)
        .map(|k| {
            let visits = k * increment;
            ForecastStep {
                visits,
                revenue: projected_revenue(visits, average_visits_per_order, average_order_value),
            }
        })
        .collect()
}

pub fn projected_revenue(visits: u64, average_visits_per_order: u64, average_order_value: u64) -> u64 {
    if average_visits_per_order == 0 {
        return 0;
    }
    (visits as f64 / average_visits_per_order as f64 * average_order_value as f64).round() as u64
}
