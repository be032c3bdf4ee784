//! Evidence attached to an indicator response: uploaded files or plain URLs.
//!
//! File batches are validated on the client before upload. Rejected files are
//! reported together; accepted files in the same batch still go through.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Upload limit per file (10 MiB)
pub const MAX_EVIDENCE_BYTES: u64 = 10 * 1024 * 1024;

/// MIME types accepted for file evidence
pub const ALLOWED_MIME_TYPES: &[&str] = &[
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "application/vnd.ms-excel",
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    "application/vnd.ms-powerpoint",
    "application/vnd.openxmlformats-officedocument.presentationml.presentation",
    "text/plain",
    "image/jpeg",
    "image/png",
    "image/gif",
    "image/webp",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvidenceKind {
    File,
    Url,
}

/// Persisted evidence record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evidence {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: EvidenceKind,
    /// Server storage path for files, the target address for URLs
    pub location: String,
    pub name: String,
}

impl Evidence {
    /// Id to pass to the download endpoint. URL evidence has nothing to download.
    pub fn download_id(&self) -> Result<i64, EvidenceError> {
        match self.kind {
            EvidenceKind::File => Ok(self.id),
            EvidenceKind::Url => Err(EvidenceError::NotDownloadable(self.name.clone())),
        }
    }
}

/// Body of `POST qualitative/evidence-url`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddEvidenceUrlRequest {
    pub program_id: i64,
    pub domain_id: i64,
    pub indicator_id: i64,
    pub url: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvidenceError {
    #[error("Evidence \"{0}\" is a link and cannot be downloaded")]
    NotDownloadable(String),
    #[error("Please enter a URL")]
    EmptyUrl,
    #[error("\"{0}\" is not a valid absolute URL")]
    InvalidUrl(String),
}

/// What the browser tells us about a file picked for upload
#[derive(Debug, Clone, PartialEq)]
pub struct EvidenceCandidate {
    pub name: String,
    /// MIME type reported by the browser; may be empty
    pub mime_type: String,
    pub size_bytes: u64,
}

impl EvidenceCandidate {
    /// Reported MIME type, or a guess from the file extension when the browser
    /// left it empty.
    pub fn resolved_mime(&self) -> String {
        let reported = self.mime_type.trim();
        if !reported.is_empty() {
            return reported.to_ascii_lowercase();
        }
        mime_guess::from_path(&self.name)
            .first_raw()
            .unwrap_or_default()
            .to_string()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RejectionReason {
    UnsupportedType { mime_type: String },
    TooLarge { size_bytes: u64 },
    Empty,
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectionReason::UnsupportedType { mime_type } if mime_type.is_empty() => {
                write!(f, "unknown file type is not allowed")
            }
            RejectionReason::UnsupportedType { mime_type } => {
                write!(f, "file type {} is not allowed", mime_type)
            }
            RejectionReason::TooLarge { size_bytes } => write!(
                f,
                "file is {} MB, the limit is {} MB",
                format_megabytes(*size_bytes),
                format_megabytes(MAX_EVIDENCE_BYTES)
            ),
            RejectionReason::Empty => write!(f, "file is empty"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RejectedFile {
    pub name: String,
    pub reason: RejectionReason,
}

/// Outcome of validating one upload batch. `T` is whatever handle the caller
/// carries for each file (a browser `File`, a test fixture, ...).
#[derive(Debug)]
pub struct BatchValidation<T> {
    pub accepted: Vec<T>,
    pub rejected: Vec<RejectedFile>,
}

impl<T> BatchValidation<T> {
    /// One message listing every rejected file by name and reason
    pub fn rejection_message(&self) -> Option<String> {
        if self.rejected.is_empty() {
            return None;
        }
        let details = self
            .rejected
            .iter()
            .map(|r| format!("{} ({})", r.name, r.reason))
            .collect::<Vec<_>>()
            .join("; ");
        let noun = if self.rejected.len() == 1 { "file was" } else { "files were" };
        Some(format!("{} {} rejected: {}", self.rejected.len(), noun, details))
    }
}

pub fn check_candidate(candidate: &EvidenceCandidate) -> Result<(), RejectionReason> {
    let mime = candidate.resolved_mime();
    if !ALLOWED_MIME_TYPES.contains(&mime.as_str()) {
        return Err(RejectionReason::UnsupportedType { mime_type: mime });
    }
    if candidate.size_bytes == 0 {
        return Err(RejectionReason::Empty);
    }
    if candidate.size_bytes > MAX_EVIDENCE_BYTES {
        return Err(RejectionReason::TooLarge {
            size_bytes: candidate.size_bytes,
        });
    }
    Ok(())
}

pub fn validate_batch<T, F>(items: Vec<T>, describe: F) -> BatchValidation<T>
where
    F: Fn(&T) -> EvidenceCandidate,
{
    let mut accepted = Vec::new();
    let mut rejected = Vec::new();
    for item in items {
        let candidate = describe(&item);
        match check_candidate(&candidate) {
            Ok(()) => accepted.push(item),
            Err(reason) => rejected.push(RejectedFile {
                name: candidate.name,
                reason,
            }),
        }
    }
    BatchValidation { accepted, rejected }
}

/// Trims user input for URL evidence. Absolute-URL parsing itself is left to
/// the caller (the browser `URL` parser on the frontend).
pub fn normalize_url_input(raw: &str) -> Result<String, EvidenceError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(EvidenceError::EmptyUrl);
    }
    if trimmed.chars().any(char::is_whitespace) {
        return Err(EvidenceError::InvalidUrl(trimmed.to_string()));
    }
    Ok(trimmed.to_string())
}

fn format_megabytes(bytes: u64) -> String {
    let mb = bytes as f64 / (1024.0 * 1024.0);
    if mb.fract() == 0.0 {
        format!("{:.0}", mb)
    } else {
        format!("{:.1}", mb)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(name: &str, mime: &str, size_bytes: u64) -> EvidenceCandidate {
        EvidenceCandidate {
            name: name.to_string(),
            mime_type: mime.to_string(),
            size_bytes,
        }
    }

    #[test]
    fn test_batch_rejects_oversized_pdf_and_keeps_small_png() {
        let batch = vec![
            file("self-study.pdf", "application/pdf", 15 * 1024 * 1024),
            file("chart.png", "image/png", 2 * 1024 * 1024),
        ];
        let result = validate_batch(batch, |c| c.clone());

        assert_eq!(result.accepted.len(), 1);
        assert_eq!(result.accepted[0].name, "chart.png");
        assert_eq!(result.rejected.len(), 1);
        assert_eq!(result.rejected[0].name, "self-study.pdf");
        assert_eq!(
            result.rejected[0].reason,
            RejectionReason::TooLarge {
                size_bytes: 15 * 1024 * 1024
            }
        );

        let message = result.rejection_message().unwrap();
        assert!(message.contains("self-study.pdf"));
        assert!(message.contains("15 MB"));
        assert!(!message.contains("chart.png"));
    }

    #[test]
    fn test_rejection_message_lists_every_file() {
        let batch = vec![
            file("setup.exe", "application/x-msdownload", 1024),
            file("empty.txt", "text/plain", 0),
        ];
        let result = validate_batch(batch, |c| c.clone());
        assert!(result.accepted.is_empty());
        let message = result.rejection_message().unwrap();
        assert!(message.starts_with("2 files were rejected"));
        assert!(message.contains("setup.exe (file type application/x-msdownload is not allowed)"));
        assert!(message.contains("empty.txt (file is empty)"));
    }

    #[test]
    fn test_exact_limit_is_accepted() {
        assert!(check_candidate(&file("a.pdf", "application/pdf", MAX_EVIDENCE_BYTES)).is_ok());
        assert!(
            check_candidate(&file("a.pdf", "application/pdf", MAX_EVIDENCE_BYTES + 1)).is_err()
        );
    }

    #[test]
    fn test_missing_mime_is_guessed_from_extension() {
        let candidate = file("minutes.docx", "", 2048);
        assert_eq!(
            candidate.resolved_mime(),
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
        );
        assert!(check_candidate(&candidate).is_ok());
        assert!(check_candidate(&file("noext", "", 10)).is_err());
    }

    #[test]
    fn test_url_evidence_is_not_downloadable() {
        let evidence = Evidence {
            id: 3,
            kind: EvidenceKind::Url,
            location: "https://example.edu/report".to_string(),
            name: "Annual report".to_string(),
        };
        assert!(evidence.download_id().is_err());

        let file = Evidence {
            kind: EvidenceKind::File,
            ..evidence
        };
        assert_eq!(file.download_id(), Ok(3));
    }

    #[test]
    fn test_normalize_url_input() {
        assert_eq!(normalize_url_input("  https://a.edu/x "), Ok("https://a.edu/x".to_string()));
        assert_eq!(normalize_url_input("   "), Err(EvidenceError::EmptyUrl));
        assert!(normalize_url_input("https://a.edu/x y").is_err());
    }

    #[test]
    fn test_evidence_kind_wire_name() {
        let evidence: Evidence = serde_json::from_str(
            r#"{"id":1,"type":"file","location":"uploads/1.pdf","name":"1.pdf"}"#,
        )
        .unwrap();
        assert_eq!(evidence.kind, EvidenceKind::File);
    }
}
