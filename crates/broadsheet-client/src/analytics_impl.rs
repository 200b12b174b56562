use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::Value;

use broadsheet_core::analytics::{
    AnalysesListing, AnalyticsSource, CollectionEntry, QueryResponse, Tenant,
};
use broadsheet_core::error::InsightsError;

use crate::client::{ApiClient, ApiError};

impl From<ApiError> for InsightsError {
    fn from(err: ApiError) -> Self {
        InsightsError::Transport(err.to_string())
    }
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, ApiError> {
    Ok(serde_json::from_slice(bytes)?)
}

#[async_trait]
impl AnalyticsSource for ApiClient {
    async fn list_analyses(&self, tenant: &Tenant) -> Result<AnalysesListing, InsightsError> {
        let bytes = match self.analyses_bytes(tenant).await {
            Ok(bytes) => bytes,
            Err(err) if err.status() == Some(StatusCode::NOT_FOUND) => {
                return Err(InsightsError::NoProjectFound)
            }
            Err(err) => {
                tracing::error!(error = %err, "analyses listing failed");
                return Err(err.into());
            }
        };
        Ok(decode(&bytes)?)
    }

    async fn list_collections(
        &self,
        tenant: &Tenant,
    ) -> Result<Vec<CollectionEntry>, InsightsError> {
        let bytes = self.collections_bytes(tenant).await.inspect_err(|err| {
            tracing::error!(error = %err, "collections listing failed");
        })?;
        Ok(decode(&bytes)?)
    }

    async fn execute_query(
        &self,
        tenant: &Tenant,
        body: &Value,
        page_size: Option<u32>,
    ) -> Result<QueryResponse, InsightsError> {
        let bytes = self
            .execute_query_bytes(tenant, body, page_size)
            .await
            .inspect_err(|err| tracing::error!(error = %err, "query failed"))?;
        Ok(decode(&bytes)?)
    }
}
