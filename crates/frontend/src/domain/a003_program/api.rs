use contracts::domain::a003_program::Program;

use crate::shared::api_client::{ApiClient, ApiError};

/// Programs visible to the signed-in user
pub async fn fetch_programs(client: &ApiClient) -> Result<Vec<Program>, ApiError> {
    client.get_json("/programs").await
}
