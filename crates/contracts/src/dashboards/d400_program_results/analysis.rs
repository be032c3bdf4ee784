use super::aggregator::{aggregate, check_weight_total, ResultsError, WeightTotal};
use super::dto::{DomainScore, DomainWeight, WeightedResult};
use super::grading::Grade;
use crate::shared::lang::{pick_label, Lang};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::fmt;

/// Allowed difference between the server's final score and the local one
pub const RECONCILE_TOLERANCE: f64 = 0.01;

/// One domain line of the results table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DomainResultRow {
    pub domain_id: i64,
    pub domain_ar: String,
    pub domain_en: String,
    pub indicator_count: u32,
    pub domain_weight: f64,
    pub domain_score: f64,
    pub domain_weighted_score: f64,
    pub grade: Grade,
}

impl DomainResultRow {
    pub fn label(&self, lang: Lang) -> &str {
        pick_label(lang, &self.domain_ar, &self.domain_en)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnalysisWarning {
    /// Backend weights do not add up to 100
    WeightTotalOff { total: f64 },
    /// Domain has a weight but no score, or the other way round
    UnmatchedDomain { domain_id: i64 },
    /// Final score left the `[0, 100]` range
    ScoreOutOfRange { score: f64 },
    /// Server-computed final score disagrees with the local computation
    ServerMismatch { server: f64, local: f64 },
}

impl fmt::Display for AnalysisWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalysisWarning::WeightTotalOff { total } => {
                write!(f, "Domain weights add up to {:.2} instead of 100", total)
            }
            AnalysisWarning::UnmatchedDomain { domain_id } => {
                write!(f, "Domain {} has no matching weight or score", domain_id)
            }
            AnalysisWarning::ScoreOutOfRange { score } => {
                write!(f, "Final score {:.2} is outside 0–100", score)
            }
            AnalysisWarning::ServerMismatch { server, local } => write!(
                f,
                "Server final score {:.2} differs from computed {:.2}",
                server, local
            ),
        }
    }
}

/// Everything the results dashboard and the exports show for one program
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgramAnalysis {
    pub program_id: i64,
    pub rows: Vec<DomainResultRow>,
    pub final_program_score: f64,
    pub final_grade: Grade,
    pub weight_total: WeightTotal,
    pub warnings: Vec<AnalysisWarning>,
}

impl ProgramAnalysis {
    /// Builds the analysis from the two read endpoints. When the server's own
    /// `WeightedResult` is available it is cross-checked, not trusted.
    pub fn build(
        program_id: i64,
        weights: &[DomainWeight],
        scores: &[DomainScore],
        server: Option<&WeightedResult>,
    ) -> Result<Self, ResultsError> {
        let result = aggregate(weights, scores, program_id)?;
        let weight_total = check_weight_total(weights);
        let mut warnings = Vec::new();

        if !weight_total.within_tolerance {
            warnings.push(AnalysisWarning::WeightTotalOff {
                total: weight_total.total,
            });
        }

        let matched: HashSet<i64> = result.result_by_domain.iter().map(|r| r.domain_id).collect();
        let mut unmatched: Vec<i64> = weights
            .iter()
            .map(|w| w.domain_id)
            .chain(scores.iter().map(|s| s.domain_id))
            .filter(|id| !matched.contains(id))
            .collect();
        unmatched.sort_unstable();
        unmatched.dedup();
        warnings.extend(
            unmatched
                .into_iter()
                .map(|domain_id| AnalysisWarning::UnmatchedDomain { domain_id }),
        );

        let final_program_score = result.final_program_score;
        if !(0.0..=100.0).contains(&final_program_score) {
            warnings.push(AnalysisWarning::ScoreOutOfRange {
                score: final_program_score,
            });
        }
        if let Some(server) = server {
            if (server.final_program_score - final_program_score).abs() > RECONCILE_TOLERANCE {
                warnings.push(AnalysisWarning::ServerMismatch {
                    server: server.final_program_score,
                    local: final_program_score,
                });
            }
        }

        let rows = result
            .result_by_domain
            .iter()
            .filter_map(|row| {
                let weight = weights.iter().find(|w| w.domain_id == row.domain_id)?;
                Some(DomainResultRow {
                    domain_id: row.domain_id,
                    domain_ar: weight.domain_ar.clone(),
                    domain_en: weight.domain_en.clone(),
                    indicator_count: weight.indicator_count,
                    domain_weight: row.domain_weight,
                    domain_score: row.domain_score,
                    domain_weighted_score: row.domain_weighted_score,
                    grade: Grade::from_score(row.domain_score),
                })
            })
            .collect();

        Ok(Self {
            program_id,
            rows,
            final_program_score,
            final_grade: Grade::from_score(final_program_score),
            weight_total,
            warnings,
        })
    }

    /// Domain with the highest score
    pub fn strongest(&self) -> Option<&DomainResultRow> {
        self.rows
            .iter()
            .max_by(|a, b| a.domain_score.total_cmp(&b.domain_score))
    }

    /// Domain with the lowest score
    pub fn weakest(&self) -> Option<&DomainResultRow> {
        self.rows
            .iter()
            .min_by(|a, b| a.domain_score.total_cmp(&b.domain_score))
    }

    pub fn grade_distribution(&self) -> BTreeMap<Grade, usize> {
        let mut counts: BTreeMap<Grade, usize> = Grade::ALL.iter().map(|g| (*g, 0)).collect();
        for row in &self.rows {
            *counts.entry(row.grade).or_insert(0) += 1;
        }
        counts
    }

    pub fn total_indicators(&self) -> u32 {
        self.rows.iter().map(|r| r.indicator_count).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboards::d400_program_results::aggregator::tests::{score, weight};
    use crate::dashboards::d400_program_results::dto::DomainWeightedScore;

    #[test]
    fn test_build_grades_rows_and_final_score() {
        let weights = vec![weight(1, 25.42), weight(2, 74.58)];
        let scores = vec![score(1, 85.33), score(2, 90.00)];
        let analysis = ProgramAnalysis::build(7, &weights, &scores, None).unwrap();

        assert_eq!(analysis.rows[0].grade, Grade::Good);
        assert_eq!(analysis.rows[1].grade, Grade::Excellent);
        assert_eq!(analysis.final_grade, Grade::Good);
        assert!(analysis.warnings.is_empty(), "{:?}", analysis.warnings);
        assert_eq!(analysis.strongest().unwrap().domain_id, 2);
        assert_eq!(analysis.weakest().unwrap().domain_id, 1);
        assert_eq!(analysis.total_indicators(), 20);

        let distribution = analysis.grade_distribution();
        assert_eq!(distribution[&Grade::Good], 1);
        assert_eq!(distribution[&Grade::Excellent], 1);
        assert_eq!(distribution[&Grade::Poor], 0);
    }

    #[test]
    fn test_build_flags_bad_weight_total_and_unmatched_domains() {
        let weights = vec![weight(1, 40.0), weight(2, 40.0)];
        let scores = vec![score(1, 50.0), score(3, 70.0)];
        let analysis = ProgramAnalysis::build(1, &weights, &scores, None).unwrap();

        assert!(analysis
            .warnings
            .contains(&AnalysisWarning::WeightTotalOff { total: 80.0 }));
        assert!(analysis
            .warnings
            .contains(&AnalysisWarning::UnmatchedDomain { domain_id: 2 }));
        assert!(analysis
            .warnings
            .contains(&AnalysisWarning::UnmatchedDomain { domain_id: 3 }));
        assert_eq!(analysis.rows.len(), 1);
    }

    #[test]
    fn test_build_reports_server_mismatch() {
        let weights = vec![weight(1, 100.0)];
        let scores = vec![score(1, 80.0)];
        let server = WeightedResult {
            program_id: 1,
            result_by_domain: vec![DomainWeightedScore {
                domain_id: 1,
                domain_weight: 100.0,
                domain_score: 80.0,
                domain_weighted_score: 82.0,
            }],
            final_program_score: 82.0,
        };
        let analysis = ProgramAnalysis::build(1, &weights, &scores, Some(&server)).unwrap();
        assert_eq!(
            analysis.warnings,
            vec![AnalysisWarning::ServerMismatch {
                server: 82.0,
                local: 80.0
            }]
        );
        assert_eq!(
            analysis.warnings[0].to_string(),
            "Server final score 82.00 differs from computed 80.00"
        );
    }

    #[test]
    fn test_build_flags_out_of_range_final_score() {
        let weights = vec![weight(1, 100.0)];
        let scores = vec![score(1, 120.0)];
        let analysis = ProgramAnalysis::build(1, &weights, &scores, None).unwrap();
        assert!(analysis
            .warnings
            .contains(&AnalysisWarning::ScoreOutOfRange { score: 120.0 }));
    }
}
