use contracts::domain::a001_quality_domain::{Indicator, QualityDomain};

use crate::shared::api_client::{ApiClient, ApiError};

const API_BASE: &str = "/qualitative/domains";

/// All quality domains
pub async fn fetch_domains(client: &ApiClient) -> Result<Vec<QualityDomain>, ApiError> {
    client.get_json(API_BASE).await
}

/// Indicators of one domain
pub async fn fetch_indicators(
    client: &ApiClient,
    domain_id: i64,
) -> Result<Vec<Indicator>, ApiError> {
    let indicators: Vec<Indicator> = client
        .get_json(&format!("{}/{}/indicators", API_BASE, domain_id))
        .await?;
    // Keep only rows that really belong to the requested domain
    Ok(indicators
        .into_iter()
        .filter(|indicator| indicator.domain == domain_id)
        .collect())
}
