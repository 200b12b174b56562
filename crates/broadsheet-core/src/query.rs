//! Request bodies for the platform's query endpoint.

use serde_json::{json, Value};

use crate::planner::{AnalyticsCollection, MonthBucket};

pub const KEYWORD_COLLECTION: &str = "search_console_by_property";

/// Metric positions in a revenue response.
pub const REVENUE_ORDERS: usize = 0;
pub const REVENUE_REVENUE: usize = 1;
pub const REVENUE_VISITS: usize = 2;

/// Metric positions in a keyword response.
pub const KEYWORD_CLICKS: usize = 0;
pub const KEYWORD_AVG_POSITION: usize = 1;
pub const KEYWORD_CTR: usize = 2;

/// Organic orders, revenue and visits for one month.
pub fn revenue_query(collection: &AnalyticsCollection, bucket: &MonthBucket) -> Value {
    let (start, end) = bucket.api_period();
    let conv = &collection.conversion_collection;
    let visits = &collection.id;
    json!({
        "collections": [conv, visits],
        "periods": [[start, end]],
        "query": {
            "dimensions": [],
            "metrics": [
                format!("{conv}.period_0.{}", collection.transaction_field),
                format!("{conv}.period_0.revenue"),
                format!("{visits}.period_0.nb"),
            ],
            "filters": {
                "and": [
                    {"field": format!("{conv}.period_0.medium"), "predicate": "eq", "value": "organic"},
                    {"field": format!("{visits}.period_0.medium"), "predicate": "eq", "value": "organic"},
                ]
            }
        }
    })
}

/// Keywords of one month, most clicked first, filtered on the branded flag.
pub fn keyword_query(bucket: &MonthBucket, branded: bool) -> Value {
    let (start, end) = bucket.api_period();
    json!({
        "collections": [KEYWORD_COLLECTION],
        "periods": [[start, end]],
        "query": {
            "dimensions": ["keyword"],
            "metrics": [
                format!("{KEYWORD_COLLECTION}.period_0.count_clicks"),
                format!("{KEYWORD_COLLECTION}.period_0.avg_position"),
                format!("{KEYWORD_COLLECTION}.period_0.ctr"),
            ],
            "sort": [{"index": 0, "type": "metrics", "order": "desc"}],
            "filters": {
                "and": [
                    {"field": "keyword_meta.branded", "predicate": "eq", "value": branded},
                ]
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::analytics::CollectionEntry;

    fn september() -> MonthBucket {
        MonthBucket::containing(NaiveDate::from_ymd_opt(2026, 9, 14).expect("date"))
    }

    #[test]
    fn revenue_query_targets_both_collections() {
        let collection = AnalyticsCollection::from_entry(&CollectionEntry {
            id: "visits.dip".to_string(),
            date_start: None,
        });
        let body = revenue_query(&collection, &september());
        assert_eq!(body["collections"], json!(["conversion.dip", "visits.dip"]));
        assert_eq!(body["periods"], json!([["20260901", "20260930"]]));
        assert_eq!(
            body["query"]["metrics"],
            json!([
                "conversion.dip.period_0.transactions",
                "conversion.dip.period_0.revenue",
                "visits.dip.period_0.nb"
            ])
        );
        let filters = body["query"]["filters"]["and"].as_array().expect("filters");
        assert_eq!(filters.len(), 2);
        assert!(filters.iter().all(|f| f["value"] == "organic"));
    }

    #[test]
    fn adobe_revenue_query_counts_orders() {
        let collection = AnalyticsCollection::from_entry(&CollectionEntry {
            id: "visits.adobe".to_string(),
            date_start: None,
        });
        let body = revenue_query(&collection, &september());
        assert_eq!(body["query"]["metrics"][0], "conversion.period_0.orders");
    }

    #[test]
    fn keyword_query_sorts_by_clicks_and_filters_branding() {
        let body = keyword_query(&september(), false);
        assert_eq!(body["query"]["dimensions"], json!(["keyword"]));
        assert_eq!(body["query"]["sort"][0]["order"], "desc");
        assert_eq!(body["query"]["filters"]["and"][0]["value"], json!(false));
        assert_eq!(
            body["query"]["metrics"][KEYWORD_CLICKS],
            "search_console_by_property.period_0.count_clicks"
        );
    }
}
