use contracts::dashboards::d400_program_results::schema::{
    parse_domain_scores, parse_domain_weights, parse_weighted_result,
};
use contracts::dashboards::d400_program_results::{DomainScore, DomainWeight, WeightedResult};

use crate::shared::api_client::{ApiClient, ApiError};
use crate::shared::api_utils::with_query;

const API_BASE: &str = "/results";

/// Domain weights, shared by all programs
pub async fn fetch_domain_weights(client: &ApiClient) -> Result<Vec<DomainWeight>, ApiError> {
    let payload = client
        .get_value(&format!("{}/domain-weights", API_BASE))
        .await?;
    Ok(parse_domain_weights(&payload)?)
}

/// Per-domain scores of one program
pub async fn fetch_domain_scores(
    client: &ApiClient,
    program_id: i64,
) -> Result<Vec<DomainScore>, ApiError> {
    let path = with_query(
        &format!("{}/domain-scores", API_BASE),
        &[("program_id", program_id.to_string())],
    );
    let payload = client.get_value(&path).await?;
    Ok(parse_domain_scores(&payload)?)
}

/// Final weighted result as computed by the server
pub async fn fetch_weighted_result(
    client: &ApiClient,
    program_id: i64,
) -> Result<WeightedResult, ApiError> {
    let path = with_query(
        &format!("{}/weighted-results", API_BASE),
        &[("program_id", program_id.to_string())],
    );
    let payload = client.get_value(&path).await?;
    Ok(parse_weighted_result(&payload)?)
}
