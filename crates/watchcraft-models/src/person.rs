use serde::{Deserialize, Serialize};
use std::fmt;

use crate::ModelError;

/// Name of a recommender, co-viewer or viewing partner
///
/// Names are trimmed and must not be empty. Comparison is case-sensitive,
/// so "alex" and "Alex" are two different people.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PersonName(String);

impl PersonName {
    pub fn new(name: impl AsRef<str>) -> Result<Self, ModelError> {
        let trimmed = name.as_ref().trim();
        if trimmed.is_empty() {
            return Err(ModelError::EmptyName);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PersonName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PersonName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for PersonName {
    type Error = ModelError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        PersonName::new(value)
    }
}

impl From<PersonName> for String {
    fn from(name: PersonName) -> Self {
        name.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_person_name_is_trimmed() {
        let name = PersonName::new("  Alex ").unwrap();
        assert_eq!(name.as_str(), "Alex");
    }

    #[test]
    fn test_empty_person_name_is_rejected() {
        assert_eq!(PersonName::new(""), Err(ModelError::EmptyName));
        assert_eq!(PersonName::new("   "), Err(ModelError::EmptyName));
    }

    #[test]
    fn test_names_are_case_sensitive() {
        assert_ne!(PersonName::new("alex").unwrap(), PersonName::new("Alex").unwrap());
    }
}
