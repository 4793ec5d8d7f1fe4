//! Presenter catalog
//!
//! A presenter is the avatar the provider animates. Requests must name one of
//! the ids in the catalog.

use serde::{Deserialize, Serialize};

/// Presenter ids available when nothing else is configured
pub const DEFAULT_PRESENTERS: &[&str] = &["emma", "marcus", "aiko", "leo"];

/// The set of presenter ids a request may use
///
/// Never empty; deserialization goes through [`PresenterCatalog::new`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct PresenterCatalog {
    ids: Vec<String>,
}

impl PresenterCatalog {
    /// Builds a catalog from ids, trimming and dropping blanks and duplicates
    ///
    /// Returns `None` when nothing usable is left.
    pub fn new<I, S>(ids: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut unique: Vec<String> = Vec::new();
        for id in ids {
            let id = id.as_ref().trim();
            if !id.is_empty() && !unique.iter().any(|known| known == id) {
                unique.push(id.to_string());
            }
        }

        if unique.is_empty() {
            None
        } else {
            Some(Self { ids: unique })
        }
    }

    /// Parses a comma-separated list such as `"emma, leo"`
    pub fn parse_list(list: &str) -> Option<Self> {
        Self::new(list.split(','))
    }

    /// Exact match; callers trim user input first
    pub fn contains(&self, id: &str) -> bool {
        self.ids.iter().any(|known| known == id)
    }

    /// First id in the catalog, used when the user does not pick one
    pub fn default_id(&self) -> &str {
        &self.ids[0]
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }
}

impl TryFrom<Vec<String>> for PresenterCatalog {
    type Error = String;

    fn try_from(ids: Vec<String>) -> Result<Self, Self::Error> {
        Self::new(ids).ok_or_else(|| "presenter catalog must not be empty".to_string())
    }
}

impl From<PresenterCatalog> for Vec<String> {
    fn from(catalog: PresenterCatalog) -> Self {
        catalog.ids
    }
}

impl Default for PresenterCatalog {
    fn default() -> Self {
        Self {
            ids: DEFAULT_PRESENTERS.iter().map(|id| id.to_string()).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_catalog() {
        let catalog = PresenterCatalog::default();
        assert!(catalog.contains("emma"));
        assert!(!catalog.contains(" leo "));
        assert!(!catalog.contains("Emma"));
        assert_eq!(catalog.default_id(), "emma");
    }

    #[test]
    fn test_parse_list_drops_blanks_and_duplicates() {
        let catalog = PresenterCatalog::parse_list("nova, ,nova,  kai").unwrap();
        assert_eq!(catalog.ids(), &["nova".to_string(), "kai".to_string()]);
    }

    #[test]
    fn test_empty_catalog_is_rejected() {
        assert!(PresenterCatalog::parse_list("").is_none());
        assert!(PresenterCatalog::parse_list(" , ,").is_none());
        assert!(PresenterCatalog::new(Vec::<String>::new()).is_none());
    }

    #[test]
    fn test_deserialize_goes_through_new() {
        let catalog: PresenterCatalog =
            serde_json::from_str(r#"["nova", " kai ", "nova"]"#).unwrap();
        assert_eq!(catalog.ids(), &["nova".to_string(), "kai".to_string()]);
        assert_eq!(serde_json::to_string(&catalog).unwrap(), r#"["nova","kai"]"#);

        assert!(serde_json::from_str::<PresenterCatalog>("[]").is_err());
        assert!(serde_json::from_str::<PresenterCatalog>(r#"["  "]"#).is_err());
    }
}
