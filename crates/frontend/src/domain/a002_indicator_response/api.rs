use contracts::domain::a002_indicator_response::{IndicatorResponse, SaveResponseRequest};
use leptos::prelude::*;

use crate::shared::api_client::{ApiClient, ApiError};
use crate::shared::api_utils::with_query;
use crate::shared::state::response_store::{ResponseKey, ResponseStore};

const API_BASE: &str = "/qualitative/responses";

pub async fn fetch_responses(
    client: &ApiClient,
    program_id: i64,
) -> Result<Vec<IndicatorResponse>, ApiError> {
    client
        .get_json(&with_query(API_BASE, &[("program_id", program_id.to_string())]))
        .await
}

/// Creates the response or updates the existing one for the same program + indicator
pub async fn submit_response(
    client: &ApiClient,
    request: &SaveResponseRequest,
) -> Result<IndicatorResponse, ApiError> {
    client.post_json(API_BASE, request).await
}

pub async fn delete_response(client: &ApiClient, id: i64) -> Result<(), ApiError> {
    client.delete(&format!("{}/{}", API_BASE, id)).await
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SaveReport {
    pub saved: usize,
    pub failed: Vec<(ResponseKey, String)>,
}

impl SaveReport {
    /// Message for the user, `None` when everything was saved
    pub fn error_message(&self) -> Option<String> {
        if self.failed.is_empty() {
            return None;
        }
        let details = self
            .failed
            .iter()
            .map(|(key, message)| format!("{}: {}", key, message))
            .collect::<Vec<_>>()
            .join("; ");
        Some(format!(
            "{} of {} responses were not saved ({})",
            self.failed.len(),
            self.failed.len() + self.saved,
            details
        ))
    }
}

/// Submits every unsaved entry (or only `keys`). Successful entries get their
/// server ids; failed ones stay unsaved with the error attached.
pub async fn save_all(
    client: &ApiClient,
    store: RwSignal<ResponseStore>,
    keys: Option<Vec<ResponseKey>>,
) -> SaveReport {
    let pending = store
        .try_update(|s| s.begin_save(keys.as_deref()))
        .unwrap_or_default();
    let mut report = SaveReport::default();

    for item in pending {
        match submit_response(client, &item.request).await {
            Ok(record) => {
                let orphan = store
                    .try_update(|s| s.complete_save(&item.key, item.revision, &record))
                    .flatten();
                if let Some(server_id) = orphan {
                    // Removed locally while the save was in flight
                    if let Err(err) = delete_response(client, server_id).await {
                        log::warn!("Failed to delete orphaned response {}: {}", server_id, err);
                    }
                }
                report.saved += 1;
            }
            Err(err) => {
                let message = err.to_string();
                log::warn!("Saving response {} failed: {}", item.key, message);
                store.update(|s| s.fail_save(&item.key, message.clone()));
                report.failed.push((item.key, message));
            }
        }
    }

    if report.saved > 0 {
        log::info!("Saved {} responses", report.saved);
    }
    report
}

/// Removes a response locally and, if the server knows it, deletes it there
/// too. The local entry is gone whatever the server says.
pub async fn remove_response(
    client: &ApiClient,
    store: RwSignal<ResponseStore>,
    key: ResponseKey,
) -> Result<(), ApiError> {
    let server_id = store.try_update(|s| s.remove(&key)).flatten();
    match server_id {
        Some(id) => delete_response(client, id).await,
        None => Ok(()),
    }
}
