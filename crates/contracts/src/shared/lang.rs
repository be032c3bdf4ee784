use serde::{Deserialize, Serialize};

/// Display language for bilingual (Arabic / English) labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lang {
    #[default]
    En,
    Ar,
}

impl Lang {
    pub fn code(&self) -> &'static str {
        match self {
            Lang::En => "en",
            Lang::Ar => "ar",
        }
    }

    /// Text direction attribute for the `dir` HTML attribute
    pub fn dir(&self) -> &'static str {
        match self {
            Lang::En => "ltr",
            Lang::Ar => "rtl",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_ascii_lowercase().as_str() {
            "en" => Some(Lang::En),
            "ar" => Some(Lang::Ar),
            _ => None,
        }
    }
}

/// Picks the label for `lang`, falling back to the other language when empty.
pub fn pick_label<'a>(lang: Lang, ar: &'a str, en: &'a str) -> &'a str {
    let (preferred, fallback) = match lang {
        Lang::Ar => (ar, en),
        Lang::En => (en, ar),
    };
    if preferred.trim().is_empty() {
        fallback
    } else {
        preferred
    }
}
