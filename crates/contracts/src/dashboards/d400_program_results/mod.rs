pub mod aggregator;
pub mod analysis;
pub mod dto;
pub mod export;
pub mod grading;
pub mod schema;

pub use aggregator::{aggregate, check_weight_total, ResultsError, WeightTotal};
pub use analysis::{AnalysisWarning, DomainResultRow, ProgramAnalysis};
pub use dto::{DomainScore, DomainWeight, DomainWeightedScore, WeightedResult};
pub use grading::{Grade, GradeView};
