use serde::{Deserialize, Serialize};

/// Row of `GET results/domain-weights`.
/// `domain_weight = 100 × indicator_count / Σ indicator_count`, computed server-side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainWeight {
    pub domain_id: i64,
    pub domain_ar: String,
    pub domain_en: String,
    pub indicator_count: u32,
    pub domain_weight: f64,
}

/// Row of `GET results/domain-scores?program_id=`; `domain_score` is a percentage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainScore {
    pub domain_id: i64,
    #[serde(default)]
    pub domain_ar: String,
    #[serde(default)]
    pub domain_en: String,
    pub indicator_count: u32,
    pub domain_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainWeightedScore {
    pub domain_id: i64,
    pub domain_weight: f64,
    pub domain_score: f64,
    /// `domain_weight × domain_score / 100`
    pub domain_weighted_score: f64,
}

/// Payload of `GET results/weighted-results?program_id=`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightedResult {
    pub program_id: i64,
    pub result_by_domain: Vec<DomainWeightedScore>,
    /// Σ `domain_weighted_score`
    pub final_program_score: f64,
}
