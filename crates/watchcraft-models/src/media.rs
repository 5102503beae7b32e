use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::ModelError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Movie,
    Tv,
}

impl MediaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Movie => "movie",
            MediaType::Tv => "tv",
        }
    }

    pub fn is_tv(&self) -> bool {
        matches!(self, MediaType::Tv)
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediaType {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "movie" => Ok(MediaType::Movie),
            "tv" => Ok(MediaType::Tv),
            _ => Err(ModelError::UnknownMediaType(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_type_serialization() {
        assert_eq!(serde_json::to_string(&MediaType::Movie).unwrap(), "\"movie\"");
        assert_eq!(serde_json::to_string(&MediaType::Tv).unwrap(), "\"tv\"");
    }

    #[test]
    fn test_media_type_rejects_unknown_values() {
        assert_eq!("TV".parse::<MediaType>(), Ok(MediaType::Tv));
        assert!("series".parse::<MediaType>().is_err());
        assert!(serde_json::from_str::<MediaType>("\"podcast\"").is_err());
    }
}
