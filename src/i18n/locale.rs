use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Ja,
}

impl Locale {
    pub fn tag(self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Ja => "ja",
        }
    }

    /// Picks Japanese when the first set of `LANG`, `LC_ALL`, `LC_MESSAGES` starts with `ja`.
    pub fn detect() -> Self {
        let lang = ["LANG", "LC_ALL", "LC_MESSAGES"]
            .iter()
            .filter_map(|var| std::env::var(var).ok())
            .find(|value| !value.is_empty())
            .unwrap_or_default();
        Self::from_lang(&lang)
    }

    fn from_lang(lang: &str) -> Self {
        if lang.to_lowercase().starts_with("ja") {
            Locale::Ja
        } else {
            Locale::En
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "en" => Ok(Locale::En),
            "ja" => Ok(Locale::Ja),
            other => Err(format!("unsupported locale '{}', expected 'en' or 'ja'", other)),
        }
    }
}
