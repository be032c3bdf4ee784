use crate::shared::lang::{pick_label, Lang};
use serde::{Deserialize, Serialize};

/// Top-level quality category grouping indicators
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityDomain {
    pub id: i64,
    #[serde(default)]
    pub domain_ar: String,
    #[serde(default)]
    pub domain_en: String,
}

impl QualityDomain {
    pub fn label(&self, lang: Lang) -> &str {
        pick_label(lang, &self.domain_ar, &self.domain_en)
    }
}

/// A checkable quality criterion belonging to one domain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Indicator {
    pub id: i64,
    pub text: String,
    /// Owning domain id
    pub domain: i64,
}
