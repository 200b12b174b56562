//! Drives the planner and an [`AnalyticsSource`] to build one tenant's insights.

use chrono::NaiveDate;
use serde::Serialize;

use crate::analytics::{AnalyticsSource, ProgressSink, QueryRow, Tenant};
use crate::config::InsightsSettings;
use crate::currency::CustomerProfile;
use crate::error::InsightsError;
use crate::kpi::{self, Aggregates, DataIssues, ForecastStep, MonthlyKpi, MonthlyRow};
use crate::planner::{self, AnalyticsCollection, MonthBucket};
use crate::query;

pub const STATUS_REVENUE_ACQUIRED: &str = "Revenue data acquired";
pub const STATUS_KEYWORDS_ACQUIRED: &str = "Keyword data acquired";

/// One keyword of a monthly distribution.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeywordStat {
    pub keyword: String,
    pub clicks: u64,
    /// Click-through rate as a percentage.
    pub ctr: f64,
    pub avg_position: f64,
}

impl KeywordStat {
    fn from_row(row: &QueryRow) -> Option<Self> {
        let keyword = row.dimensions.first()?.as_str()?.trim();
        if keyword.is_empty() {
            return None;
        }
        Some(Self {
            keyword: keyword.to_string(),
            clicks: non_negative(row.metric(query::KEYWORD_CLICKS)),
            ctr: row.metric(query::KEYWORD_CTR),
            avg_position: row.metric(query::KEYWORD_AVG_POSITION),
        })
    }
}

/// Percentage by which the top keyword out-clicks the runner-up.
///
/// `None` when there is no runner-up or it has no clicks.
pub fn click_gap(keywords: &[KeywordStat]) -> Option<i64> {
    match keywords {
        [first, second, ..] if second.clicks > 0 => {
            let gap = (first.clicks as f64 - second.clicks as f64) / second.clicks as f64;
            Some((gap * 100.0) as i64)
        }
        _ => None,
    }
}

/// Everything the report needs for one tenant.
#[derive(Debug, Clone, Serialize)]
pub struct InsightsBundle {
    pub tenant: Tenant,
    pub profile: CustomerProfile,
    pub collection: AnalyticsCollection,
    /// Months queried, before cleaning.
    pub planned_months: usize,
    /// Months with revenue, oldest first.
    pub rows: Vec<MonthlyRow>,
    pub issues: DataIssues,
    /// Month the keyword distributions were taken from.
    pub keyword_month: MonthBucket,
    pub branded: Vec<KeywordStat>,
    pub non_branded: Vec<KeywordStat>,
    pub aggregates: Aggregates,
    pub forecast_increment: u64,
    pub forecast: Vec<ForecastStep>,
}

impl InsightsBundle {
    pub fn months(&self) -> usize {
        self.rows.len()
    }

    /// Orders expected from one forecast increment of visits.
    pub fn orders_per_increment(&self) -> u64 {
        match self.aggregates.average_visits_per_order {
            0 => 0,
            vpo => self.forecast_increment / vpo,
        }
    }
}

/// Collect a tenant's insights.
///
/// Calls are issued in a fixed order: analyses listing, collections
/// listing, one revenue query per planned month (oldest first), then the
/// branded and non-branded keyword queries for the most recent month.
/// Milestones and the failure status, if any, are reported to `sink`.
pub async fn collect<S>(
    source: &S,
    tenant: &Tenant,
    settings: &InsightsSettings,
    today: NaiveDate,
    sink: &dyn ProgressSink,
) -> Result<InsightsBundle, InsightsError>
where
    S: AnalyticsSource + ?Sized,
{
    let mut analytics_id = String::new();
    let result = run(source, tenant, settings, today, sink, &mut analytics_id).await;
    if let Err(err) = &result {
        tracing::warn!(
            organisation = %tenant.organisation,
            project = %tenant.project,
            error = %err,
            "insights collection failed"
        );
        sink.progress(&analytics_id, err.status()).await;
    }
    result
}

async fn run<S>(
    source: &S,
    tenant: &Tenant,
    settings: &InsightsSettings,
    today: NaiveDate,
    sink: &dyn ProgressSink,
    analytics_id: &mut String,
) -> Result<InsightsBundle, InsightsError>
where
    S: AnalyticsSource + ?Sized,
{
    let listing = source.list_analyses(tenant).await?;
    if listing.count == 0 || listing.results.is_empty() {
        return Err(InsightsError::NoProjectFound);
    }
    let profile = CustomerProfile::from_listing(&listing, &tenant.organisation);
    tracing::debug!(currency = %profile.currency_code, "currency resolved");

    let collections = source.list_collections(tenant).await?;
    let collection =
        planner::select_collection(&collections).ok_or(InsightsError::NoAnalyticsIntegrated)?;
    analytics_id.clone_from(&collection.id);

    let buckets = planner::plan_buckets(today, collection.date_start);
    let (Some(first), Some(latest)) = (buckets.first().copied(), buckets.last().copied()) else {
        return Err(InsightsError::NoEngagementAnalyticsConfigured);
    };
    tracing::info!(
        analytics_id = %collection.id,
        months = buckets.len(),
        from = %first.label(),
        to = %latest.label(),
        "buckets planned"
    );

    let mut monthly = Vec::with_capacity(buckets.len());
    for (index, bucket) in buckets.iter().enumerate() {
        let body = query::revenue_query(&collection, bucket);
        let response = source.execute_query(tenant, &body, None).await?;
        let kpi = match response.results.first() {
            Some(row) => MonthlyKpi::from_totals(
                non_negative(row.metric(query::REVENUE_ORDERS)),
                non_negative(row.metric(query::REVENUE_REVENUE)),
                non_negative(row.metric(query::REVENUE_VISITS)),
            ),
            None if index == 0 => return Err(InsightsError::NoEngagementAnalyticsConfigured),
            None => MonthlyKpi::default(),
        };
        tracing::debug!(
            month = %bucket.label(),
            orders = kpi.orders,
            revenue = kpi.revenue,
            visits = kpi.visits,
            order_value = kpi.order_value,
            visit_value = kpi.visit_value,
            visits_per_order = kpi.visits_per_order,
            "month collected"
        );
        monthly.push(MonthlyRow {
            bucket: *bucket,
            kpi,
        });
    }
    sink.progress(&collection.id, STATUS_REVENUE_ACQUIRED).await;

    let branded = keywords(source, tenant, &latest, true, settings.keywords_in_cloud).await?;
    let non_branded = keywords(source, tenant, &latest, false, settings.keywords_in_cloud).await?;
    sink.progress(&collection.id, STATUS_KEYWORDS_ACQUIRED).await;

    let planned_months = monthly.len();
    let issues = DataIssues::detect(&monthly);
    if issues.any() {
        tracing::warn!(affected = ?issues.affected(), "possible data quality issues");
    }
    let rows = kpi::clean(monthly);
    if rows.is_empty() {
        return Err(InsightsError::NoEngagementAnalyticsConfigured);
    }

    let aggregates = Aggregates::compute(&rows);
    let forecast = kpi::forecast_ladder(
        settings.forecast_increment,
        settings.forecast_max_visits,
        aggregates.average_visits_per_order,
        aggregates.average_order_value,
    );

    Ok(InsightsBundle {
        tenant: tenant.clone(),
        profile,
        collection,
        planned_months,
        rows,
        issues,
        keyword_month: latest,
        branded,
        non_branded,
        aggregates,
        forecast_increment: settings.forecast_increment,
        forecast,
    })
}

async fn keywords<S>(
    source: &S,
    tenant: &Tenant,
    bucket: &MonthBucket,
    branded: bool,
    limit: u32,
) -> Result<Vec<KeywordStat>, InsightsError>
where
    S: AnalyticsSource + ?Sized,
{
    let body = query::keyword_query(bucket, branded);
    let response = source.execute_query(tenant, &body, Some(limit)).await?;
    let stats: Vec<KeywordStat> = response
        .results
        .iter()
        .filter_map(KeywordStat::from_row)
        .collect();
    if stats.is_empty() {
        return Err(InsightsError::NoKeywordsConfigured);
    }
    tracing::debug!(branded, keywords = stats.len(), "keywords collected");
    Ok(stats)
}

fn non_negative(value: f64) -> u64 {
    if value.is_finite() && value > 0.0 {
        value as u64
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stat(keyword: &str, clicks: u64) -> KeywordStat {
        KeywordStat {
            keyword: keyword.to_string(),
            clicks,
            ctr: 1.0,
            avg_position: 1.0,
        }
    }

    #[test]
    fn click_gap_compares_the_top_two() {
        assert_eq!(click_gap(&[stat("a", 1_000), stat("b", 500)]), Some(100));
        assert_eq!(click_gap(&[stat("a", 750), stat("b", 500), stat("c", 1)]), Some(50));
        assert_eq!(click_gap(&[stat("a", 1_000)]), None);
        assert_eq!(click_gap(&[stat("a", 10), stat("b", 0)]), None);
    }

    #[test]
    fn keyword_rows_need_a_text_dimension() {
        let row: QueryRow = serde_json::from_str(
            r#"{"dimensions": ["running shoes"], "metrics": [120.0, 3.4, 5.5]}"#,
        )
        .expect("row");
        let stat = KeywordStat::from_row(&row).expect("stat");
        assert_eq!(stat.clicks, 120);
        assert_eq!(stat.avg_position, 3.4);
        assert_eq!(stat.ctr, 5.5);

        let row: QueryRow =
            serde_json::from_str(r#"{"dimensions": [42], "metrics": [1.0]}"#).expect("row");
        assert!(KeywordStat::from_row(&row).is_none());
    }

    #[test]
    fn negative_and_nan_metrics_clamp_to_zero() {
        assert_eq!(non_negative(-4.0), 0);
        assert_eq!(non_negative(f64::NAN), 0);
        assert_eq!(non_negative(12.9), 12);
    }
}
