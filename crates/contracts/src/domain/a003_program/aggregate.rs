use crate::shared::lang::{pick_label, Lang};
use serde::{Deserialize, Serialize};

/// Academic program under assessment (leaf of university → college → department → program)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
    pub id: i64,
    #[serde(default)]
    pub name_ar: String,
    #[serde(default)]
    pub name_en: String,
    #[serde(default)]
    pub department_id: Option<i64>,
}

impl Program {
    pub fn label(&self, lang: Lang) -> &str {
        pick_label(lang, &self.name_ar, &self.name_en)
    }
}
