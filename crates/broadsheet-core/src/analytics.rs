//! Analytics platform abstraction.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::InsightsError;

/// A customer workspace on the remote platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tenant {
    pub organisation: String,
    pub project: String,
}

impl Tenant {
    /// Both parts are trimmed and must be non-empty.
    pub fn new(organisation: &str, project: &str) -> Result<Self, InsightsError> {
        let organisation = organisation.trim();
        let project = project.trim();
        if organisation.is_empty() || project.is_empty() {
            return Err(InsightsError::MissingTenant);
        }
        Ok(Self {
            organisation: organisation.to_string(),
            project: project.to_string(),
        })
    }
}

/// `GET /analyses/<org>/<project>?page=1&only_success=true`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnalysesListing {
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub results: Vec<AnalysisSummary>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnalysisSummary {
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub owner: Option<AnalysisOwner>,
    #[serde(default)]
    pub features: Option<AnalysisFeatures>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnalysisOwner {
    #[serde(default, rename = "firstName", alias = "first_name")]
    pub first_name: Option<String>,
    #[serde(default, rename = "companyName", alias = "company_name")]
    pub company_name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnalysisFeatures {
    #[serde(default)]
    pub semantic_metadata: Option<SemanticMetadata>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SemanticMetadata {
    #[serde(default)]
    pub structured_data: Option<StructuredData>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StructuredData {
    #[serde(default)]
    pub currencies: Option<Currencies>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Currencies {
    #[serde(default)]
    pub offer: Vec<String>,
}

impl AnalysisSummary {
    /// Currency codes seen in product offers during the latest analysis.
    pub fn offer_currencies(&self) -> &[String] {
        self.features
            .as_ref()
            .and_then(|f| f.semantic_metadata.as_ref())
            .and_then(|s| s.structured_data.as_ref())
            .and_then(|d| d.currencies.as_ref())
            .map(|c| c.offer.as_slice())
            .unwrap_or(&[])
    }
}

/// One entry of `GET /projects/<org>/<project>/collections`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CollectionEntry {
    pub id: String,
    #[serde(default)]
    pub date_start: Option<String>,
}

/// Response of `POST /projects/<org>/<project>/query`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QueryResponse {
    #[serde(default)]
    pub results: Vec<QueryRow>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct QueryRow {
    #[serde(default)]
    pub dimensions: Vec<Value>,
    #[serde(default)]
    pub metrics: Vec<Option<f64>>,
}

impl QueryRow {
    /// Metric at `index`, treating a missing or null value as zero.
    pub fn metric(&self, index: usize) -> f64 {
        self.metrics.get(index).copied().flatten().unwrap_or(0.0)
    }
}

/// Remote analytics platform as seen by the insights collector.
///
/// The production implementation is an authenticated HTTP client; tests
/// substitute an in-memory fake. Implementations must be safe to share
/// across concurrent submissions.
#[async_trait]
pub trait AnalyticsSource: Send + Sync + 'static {
    async fn list_analyses(&self, tenant: &Tenant) -> Result<AnalysesListing, InsightsError>;

    async fn list_collections(
        &self,
        tenant: &Tenant,
    ) -> Result<Vec<CollectionEntry>, InsightsError>;

    /// Run one analytical query. `page_size` becomes `?size=<n>`.
    async fn execute_query(
        &self,
        tenant: &Tenant,
        body: &Value,
        page_size: Option<u32>,
    ) -> Result<QueryResponse, InsightsError>;
}

/// Receives progress milestones of a collection run, in order.
///
/// `progress` resolves once the milestone has been recorded.
#[async_trait]
pub trait ProgressSink: Send + Sync {
    async fn progress(&self, analytics_id: &str, status: &str);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tenant_requires_both_parts() {
        assert_eq!(Tenant::new("acme", " "), Err(InsightsError::MissingTenant));
        assert_eq!(Tenant::new("", "demo"), Err(InsightsError::MissingTenant));
        let tenant = Tenant::new(" acme ", "demo").expect("tenant");
        assert_eq!(tenant.organisation, "acme");
    }

    #[test]
    fn analyses_listing_decodes_nested_currency() {
        let raw = r#"{
            "count": 1,
            "results": [{
                "slug": "20261001",
                "owner": {"firstName": "Jo Ann", "companyName": ""},
                "features": {"semantic_metadata": {"structured_data": {"currencies": {"offer": ["EUR"]}}}}
            }]
        }"#;
        let listing: AnalysesListing = serde_json::from_str(raw).expect("decode");
        assert_eq!(listing.count, 1);
        assert_eq!(listing.results[0].offer_currencies(), ["EUR".to_string()]);
    }

    #[test]
    fn null_metrics_read_as_zero() {
        let row: QueryRow =
            serde_json::from_str(r#"{"dimensions": [], "metrics": [12.0, null]}"#).expect("row");
        assert_eq!(row.metric(0), 12.0);
        assert_eq!(row.metric(1), 0.0);
        assert_eq!(row.metric(5), 0.0);
    }
}
