//! Completion tracking for the evaluation form.

use crate::domain::a001_quality_domain::{Indicator, QualityDomain};
use std::collections::{BTreeSet, HashMap, HashSet};

/// Percentage of `indicators` that have a recorded answer.
///
/// `None` means the indicator list has not been loaded yet and reads as 0%.
/// An empty list is also 0%.
pub fn domain_progress(answered: &HashSet<i64>, indicators: Option<&[Indicator]>) -> f64 {
    let Some(indicators) = indicators else {
        return 0.0;
    };
    if indicators.is_empty() {
        return 0.0;
    }
    let done = indicators
        .iter()
        .filter(|indicator| answered.contains(&indicator.id))
        .count();
    (100.0 * done as f64 / indicators.len() as f64).clamp(0.0, 100.0)
}

#[derive(Debug, Clone, PartialEq)]
pub struct DomainProgress {
    pub domain_id: i64,
    pub answered: usize,
    pub total: usize,
    pub percent: f64,
    pub loaded: bool,
}

impl DomainProgress {
    pub fn is_complete(&self) -> bool {
        self.loaded && self.total > 0 && self.answered >= self.total
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProgressSummary {
    pub domains: Vec<DomainProgress>,
    /// Domains where every indicator is answered
    pub completed: BTreeSet<i64>,
    /// Completion over all loaded indicators
    pub overall: f64,
}

impl ProgressSummary {
    /// `indicators` holds only the domains whose lists have been loaded.
    /// `answered` maps a domain id to the indicator ids with a response.
    pub fn compute(
        domains: &[QualityDomain],
        indicators: &HashMap<i64, Vec<Indicator>>,
        answered: &HashMap<i64, HashSet<i64>>,
    ) -> Self {
        let empty = HashSet::new();
        let mut summary = ProgressSummary::default();
        let mut answered_total = 0usize;
        let mut indicator_total = 0usize;

        for domain in domains {
            let list = indicators.get(&domain.id).map(Vec::as_slice);
            let answered_ids = answered.get(&domain.id).unwrap_or(&empty);
            let total = list.map(<[Indicator]>::len).unwrap_or(0);
            let done = list
                .map(|l| l.iter().filter(|i| answered_ids.contains(&i.id)).count())
                .unwrap_or(0);

            let progress = DomainProgress {
                domain_id: domain.id,
                answered: done,
                total,
                percent: domain_progress(answered_ids, list),
                loaded: list.is_some(),
            };
            if progress.is_complete() {
                summary.completed.insert(domain.id);
            }
            answered_total += done;
            indicator_total += total;
            summary.domains.push(progress);
        }

        summary.overall = if indicator_total == 0 {
            0.0
        } else {
            100.0 * answered_total as f64 / indicator_total as f64
        };
        summary
    }

    pub fn completed_count(&self) -> usize {
        self.completed.len()
    }

    pub fn is_completed(&self, domain_id: i64) -> bool {
        self.completed.contains(&domain_id)
    }

    pub fn progress_for(&self, domain_id: i64) -> f64 {
        self.domains
            .iter()
            .find(|d| d.domain_id == domain_id)
            .map(|d| d.percent)
            .unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn indicators(domain: i64, ids: &[i64]) -> Vec<Indicator> {
        ids.iter()
            .map(|&id| Indicator {
                id,
                text: format!("Indicator {}", id),
                domain,
            })
            .collect()
    }

    fn domain(id: i64) -> QualityDomain {
        QualityDomain {
            id,
            domain_ar: String::new(),
            domain_en: format!("Domain {}", id),
        }
    }

    #[test]
    fn test_empty_indicator_list_is_zero() {
        let answered: HashSet<i64> = [1, 2].into_iter().collect();
        let list: Vec<Indicator> = Vec::new();
        let progress = domain_progress(&answered, Some(list.as_slice()));
        assert_eq!(progress, 0.0);
        assert!(!progress.is_nan());
    }

    #[test]
    fn test_unloaded_list_is_zero() {
        let answered: HashSet<i64> = [1].into_iter().collect();
        assert_eq!(domain_progress(&answered, None), 0.0);
    }

    #[test]
    fn test_partial_progress_ignores_foreign_answers() {
        let list = indicators(1, &[10, 11, 12, 13]);
        // 99 belongs to another domain and must not count
        let answered: HashSet<i64> = [10, 12, 99].into_iter().collect();
        assert_eq!(domain_progress(&answered, Some(list.as_slice())), 50.0);
    }

    #[test]
    fn test_summary_tracks_completed_domains() {
        let domains = vec![domain(1), domain(2), domain(3)];
        let mut lists = HashMap::new();
        lists.insert(1, indicators(1, &[10, 11]));
        lists.insert(2, indicators(2, &[20, 21, 22, 23]));
        lists.insert(3, Vec::new());

        let mut answered = HashMap::new();
        answered.insert(1, [10, 11].into_iter().collect::<HashSet<_>>());
        answered.insert(2, [20].into_iter().collect::<HashSet<_>>());

        let summary = ProgressSummary::compute(&domains, &lists, &answered);
        assert_eq!(summary.completed_count(), 1);
        assert!(summary.is_completed(1));
        assert!(!summary.is_completed(3), "a domain without indicators is never complete");
        assert_eq!(summary.progress_for(1), 100.0);
        assert_eq!(summary.progress_for(2), 25.0);
        assert_eq!(summary.progress_for(3), 0.0);
        assert_eq!(summary.overall, 50.0);
    }

    #[test]
    fn test_summary_with_nothing_loaded() {
        let summary = ProgressSummary::compute(&[domain(1)], &HashMap::new(), &HashMap::new());
        assert_eq!(summary.overall, 0.0);
        assert!(!summary.domains[0].loaded);
        assert_eq!(summary.completed_count(), 0);
    }
}
