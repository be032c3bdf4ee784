pub mod aggregate;
pub mod evidence;
pub mod progress;

pub use aggregate::{Evaluation, IndicatorResponse, SaveResponseRequest};
pub use evidence::{Evidence, EvidenceKind};
pub use progress::{domain_progress, DomainProgress, ProgressSummary};
