use serde::{Deserialize, Serialize};

/// Qualitative bucket for a percentage score.
///
/// Applied the same way to a single domain score and to the final program score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Grade {
    Excellent,
    Good,
    Acceptable,
    Poor,
}

impl Grade {
    pub const ALL: [Grade; 4] = [Grade::Excellent, Grade::Good, Grade::Acceptable, Grade::Poor];

    /// `≥ 90` excellent, `≥ 75` good, `≥ 60` acceptable, otherwise poor.
    /// A non-finite score is poor.
    pub fn from_score(score: f64) -> Self {
        if !score.is_finite() {
            Grade::Poor
        } else if score >= 90.0 {
            Grade::Excellent
        } else if score >= 75.0 {
            Grade::Good
        } else if score >= 60.0 {
            Grade::Acceptable
        } else {
            Grade::Poor
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Grade::Excellent => "Excellent",
            Grade::Good => "Good",
            Grade::Acceptable => "Acceptable",
            Grade::Poor => "Poor",
        }
    }

    pub fn label_ar(&self) -> &'static str {
        match self {
            Grade::Excellent => "ممتاز",
            Grade::Good => "جيد",
            Grade::Acceptable => "مقبول",
            Grade::Poor => "ضعيف",
        }
    }

    pub fn color_class(&self) -> &'static str {
        match self {
            Grade::Excellent => "grade--excellent",
            Grade::Good => "grade--good",
            Grade::Acceptable => "grade--acceptable",
            Grade::Poor => "grade--poor",
        }
    }

    /// Badge variant used by the UI kit
    pub fn badge_variant(&self) -> &'static str {
        match self {
            Grade::Excellent => "success",
            Grade::Good => "primary",
            Grade::Acceptable => "warning",
            Grade::Poor => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GradeView {
    pub grade: Grade,
    pub label: &'static str,
    pub label_ar: &'static str,
    pub color_class: &'static str,
    pub percentage: String,
}

impl GradeView {
    pub fn from_score(score: f64) -> Self {
        let grade = Grade::from_score(score);
        Self {
            grade,
            label: grade.label(),
            label_ar: grade.label_ar(),
            color_class: grade.color_class(),
            percentage: format_percentage(score),
        }
    }
}

pub fn format_percentage(score: f64) -> String {
    if score.is_finite() {
        format!("{:.2}%", score)
    } else {
        "—".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boundaries_are_exact() {
        assert_eq!(Grade::from_score(89.99), Grade::Good);
        assert_eq!(Grade::from_score(90.00), Grade::Excellent);
        assert_eq!(Grade::from_score(74.99), Grade::Acceptable);
        assert_eq!(Grade::from_score(75.00), Grade::Good);
        assert_eq!(Grade::from_score(59.99), Grade::Poor);
        assert_eq!(Grade::from_score(60.00), Grade::Acceptable);
        assert_eq!(Grade::from_score(100.0), Grade::Excellent);
        assert_eq!(Grade::from_score(0.0), Grade::Poor);
    }

    #[test]
    fn test_grading_is_monotonic() {
        let mut previous = Grade::from_score(0.0);
        let mut score = 0.0;
        while score <= 100.0 {
            let grade = Grade::from_score(score);
            // Ord runs Excellent < ... < Poor, so a rising score never yields a later variant
            assert!(grade <= previous, "score {} went from {:?} to {:?}", score, previous, grade);
            previous = grade;
            score += 0.25;
        }
    }

    #[test]
    fn test_non_finite_is_poor() {
        assert_eq!(Grade::from_score(f64::NAN), Grade::Poor);
        assert_eq!(Grade::from_score(f64::INFINITY), Grade::Poor);
        assert_eq!(GradeView::from_score(f64::NAN).percentage, "—");
    }

    #[test]
    fn test_view_for_domain_and_final_score_match() {
        let domain = GradeView::from_score(88.812886);
        let final_score = GradeView::from_score(88.812886);
        assert_eq!(domain, final_score);
        assert_eq!(domain.label, "Good");
        assert_eq!(domain.color_class, "grade--good");
        assert_eq!(domain.percentage, "88.81%");
    }
}
