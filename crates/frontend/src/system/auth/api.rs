use contracts::system::auth::UserInfo;

use crate::shared::api_client::{ApiClient, ApiError};

/// Get current user info for the session's token
pub async fn get_current_user(client: &ApiClient) -> Result<UserInfo, ApiError> {
    client.get_json("/auth/me").await
}
