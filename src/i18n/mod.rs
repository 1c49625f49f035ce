//! Message catalogs for the two supported locales.
//!
//! Catalogs are TOML files compiled into the binary. Nested tables flatten
//! into dotted ids (`[zone1] ls_at_root` becomes `zone1.ls_at_root`).
//! Lookups never fail: a missing id falls back to English, then to the id.

mod locale;

use std::collections::HashMap;
use std::fmt::Display;

pub use locale::Locale;

const EN: &str = include_str!("messages/en.toml");
const JA: &str = include_str!("messages/ja.toml");

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("message catalog '{locale}' is malformed: {source}")]
    Parse {
        locale: Locale,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone)]
pub struct Catalog {
    tables: HashMap<Locale, HashMap<String, String>>,
}

impl Catalog {
    pub fn embedded() -> Result<Self, CatalogError> {
        let mut tables = HashMap::new();
        for (locale, source) in [(Locale::En, EN), (Locale::Ja, JA)] {
            tables.insert(locale, Self::parse(locale, source)?);
        }
        Ok(Catalog { tables })
    }

    fn parse(locale: Locale, source: &str) -> Result<HashMap<String, String>, CatalogError> {
        let table: toml::Table =
            toml::from_str(source).map_err(|source| CatalogError::Parse { locale, source })?;
        let mut flat = HashMap::new();
        flatten("", &table, &mut flat);
        Ok(flat)
    }

    pub fn get_message(&self, locale: Locale, key: &str) -> String {
        self.lookup(locale, key)
            .or_else(|| self.lookup(Locale::En, key))
            .map(str::to_string)
            .unwrap_or_else(|| key.to_string())
    }

    /// Like [`get_message`](Self::get_message) with `{name}` placeholders filled in.
    pub fn format(&self, locale: Locale, key: &str, args: &[(&str, &dyn Display)]) -> String {
        let mut message = self.get_message(locale, key);
        for (name, value) in args {
            message = message.replace(&format!("{{{}}}", name), &value.to_string());
        }
        message
    }

    pub fn contains(&self, locale: Locale, key: &str) -> bool {
        self.lookup(locale, key).is_some()
    }

    fn lookup(&self, locale: Locale, key: &str) -> Option<&str> {
        self.tables
            .get(&locale)
            .and_then(|table| table.get(key))
            .map(String::as_str)
    }
}

fn flatten(prefix: &str, table: &toml::Table, out: &mut HashMap<String, String>) {
    for (key, value) in table {
        let id = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{}.{}", prefix, key)
        };
        match value {
            toml::Value::Table(inner) => flatten(&id, inner, out),
            toml::Value::String(text) => {
                out.insert(id, text.clone());
            }
            other => {
                out.insert(id, other.to_string());
            }
        }
    }
}
