use contracts::domain::a002_indicator_response::evidence::{
    normalize_url_input, validate_batch, AddEvidenceUrlRequest, Evidence, EvidenceCandidate,
    EvidenceError,
};
use web_sys::{File, FormData};

use crate::shared::api_client::{ApiClient, ApiError};
use crate::shared::api_utils::with_query;
use crate::shared::export::download_blob;

const API_BASE: &str = "/qualitative/evidence";

/// Indicator response the evidence belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvidenceTarget {
    pub program_id: i64,
    pub domain_id: i64,
    pub indicator_id: i64,
}

pub async fn fetch_evidence(
    client: &ApiClient,
    target: EvidenceTarget,
) -> Result<Vec<Evidence>, ApiError> {
    let path = with_query(
        API_BASE,
        &[
            ("program_id", target.program_id.to_string()),
            ("indicator_id", target.indicator_id.to_string()),
        ],
    );
    client.get_json(&path).await
}

fn describe_file(file: &File) -> EvidenceCandidate {
    EvidenceCandidate {
        name: file.name(),
        mime_type: file.type_(),
        size_bytes: file.size().max(0.0) as u64,
    }
}

#[derive(Debug, Default)]
pub struct UploadReport {
    pub uploaded: Vec<Evidence>,
    /// Client-side rejections and failed uploads, one message for the user
    pub errors: Vec<String>,
}

/// Uploads a batch of files. Files that fail validation are reported
/// together and skipped; the valid ones are still uploaded.
pub async fn upload_evidence_files(
    client: &ApiClient,
    target: EvidenceTarget,
    files: Vec<File>,
) -> UploadReport {
    let batch = validate_batch(files, describe_file);
    let mut report = UploadReport::default();
    if let Some(message) = batch.rejection_message() {
        log::warn!("{}", message);
        report.errors.push(message);
    }

    for file in batch.accepted {
        match upload_one(client, target, &file).await {
            Ok(evidence) => report.uploaded.push(evidence),
            Err(err) => {
                log::warn!("Upload of {} failed: {}", file.name(), err);
                report.errors.push(format!("{}: {}", file.name(), err));
            }
        }
    }
    report
}

async fn upload_one(
    client: &ApiClient,
    target: EvidenceTarget,
    file: &File,
) -> Result<Evidence, ApiError> {
    let form = FormData::new().map_err(|e| ApiError::Network(format!("{:?}", e)))?;
    let fields = [
        ("program_id", target.program_id),
        ("domain_id", target.domain_id),
        ("indicator_id", target.indicator_id),
    ];
    for (name, value) in fields {
        form.append_with_str(name, &value.to_string())
            .map_err(|e| ApiError::Network(format!("{:?}", e)))?;
    }
    form.append_with_blob_and_filename("file", file, &file.name())
        .map_err(|e| ApiError::Network(format!("{:?}", e)))?;
    client.post_form(API_BASE, &form).await
}

/// Checks that `raw` is an absolute URL using the browser's own parser
pub fn parse_absolute_url(raw: &str) -> Result<String, EvidenceError> {
    let candidate = normalize_url_input(raw)?;
    web_sys::Url::new(&candidate)
        .map(|url| url.href())
        .map_err(|_| EvidenceError::InvalidUrl(candidate))
}

/// Stores a link as evidence. Validation happens before any request is made.
pub async fn add_evidence_url(
    client: &ApiClient,
    target: EvidenceTarget,
    raw_url: &str,
    name: &str,
) -> Result<Evidence, ApiError> {
    let url = parse_absolute_url(raw_url)?;
    let name = match name.trim() {
        "" => url.clone(),
        given => given.to_string(),
    };
    let request = AddEvidenceUrlRequest {
        program_id: target.program_id,
        domain_id: target.domain_id,
        indicator_id: target.indicator_id,
        url,
        name,
    };
    client.post_json("/qualitative/evidence-url", &request).await
}

pub async fn delete_evidence(client: &ApiClient, id: i64) -> Result<(), ApiError> {
    client.delete(&format!("{}/{}", API_BASE, id)).await
}

/// Fetches a stored file and hands it to the browser as a download
pub async fn download_evidence(client: &ApiClient, evidence: &Evidence) -> Result<(), ApiError> {
    let id = evidence.download_id()?;
    let blob = client
        .get_blob(&format!("{}/{}/download", API_BASE, id))
        .await?;
    download_blob(&blob, &evidence.name).map_err(ApiError::Decode)
}
