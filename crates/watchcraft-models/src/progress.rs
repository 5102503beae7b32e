use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::PersonName;

/// A season/episode position, both 1-based
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "RawEpisodePosition")]
pub struct EpisodePosition {
    pub season: u32,
    pub episode: u32,
}

impl EpisodePosition {
    /// Build a position, replacing any non-positive component with 1
    pub fn coerced(season: i64, episode: i64) -> Self {
        Self {
            season: coerce_component(season),
            episode: coerce_component(episode),
        }
    }
}

impl Default for EpisodePosition {
    fn default() -> Self {
        Self { season: 1, episode: 1 }
    }
}

impl fmt::Display for EpisodePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "S{}E{}", self.season, self.episode)
    }
}

fn coerce_component(value: i64) -> u32 {
    if value < 1 {
        1
    } else {
        u32::try_from(value).unwrap_or(u32::MAX)
    }
}

// Stored documents may carry zero or negative positions written by older clients
#[derive(Deserialize)]
struct RawEpisodePosition {
    #[serde(default = "one")]
    season: i64,
    #[serde(default = "one")]
    episode: i64,
}

fn one() -> i64 {
    1
}

impl From<RawEpisodePosition> for EpisodePosition {
    fn from(raw: RawEpisodePosition) -> Self {
        EpisodePosition::coerced(raw.season, raw.episode)
    }
}

/// Per-partner positions on a TV entry, kept in insertion order
///
/// Serialized as a JSON object keyed by partner name; key order survives a
/// round trip so compact displays stay stable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewingProgress {
    entries: Vec<(PersonName, EpisodePosition)>,
}

impl ViewingProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&EpisodePosition> {
        self.entries
            .iter()
            .find(|(partner, _)| partner.as_str() == name)
            .map(|(_, position)| position)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Insert or overwrite a partner's position; an existing partner keeps its place
    pub fn insert(&mut self, name: PersonName, position: EpisodePosition) -> Option<EpisodePosition> {
        match self.entries.iter_mut().find(|(partner, _)| *partner == name) {
            Some((_, existing)) => Some(std::mem::replace(existing, position)),
            None => {
                self.entries.push((name, position));
                None
            }
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<EpisodePosition> {
        let index = self.entries.iter().position(|(partner, _)| partner.as_str() == name)?;
        Some(self.entries.remove(index).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PersonName, &EpisodePosition)> {
        self.entries.iter().map(|(name, position)| (name, position))
    }

    pub fn names(&self) -> impl Iterator<Item = &PersonName> {
        self.entries.iter().map(|(name, _)| name)
    }
}

impl FromIterator<(PersonName, EpisodePosition)> for ViewingProgress {
    fn from_iter<I: IntoIterator<Item = (PersonName, EpisodePosition)>>(iter: I) -> Self {
        let mut progress = ViewingProgress::new();
        for (name, position) in iter {
            progress.insert(name, position);
        }
        progress
    }
}

impl Serialize for ViewingProgress {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, position) in &self.entries {
            map.serialize_entry(name.as_str(), position)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ViewingProgress {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ProgressVisitor;

        impl<'de> Visitor<'de> for ProgressVisitor {
            type Value = ViewingProgress;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of partner name to season/episode")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut progress = ViewingProgress::new();
                while let Some((name, position)) = access.next_entry::<PersonName, EpisodePosition>()? {
                    progress.insert(name, position);
                }
                Ok(progress)
            }
        }

        deserializer.deserialize_map(ProgressVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(s: &str) -> PersonName {
        PersonName::new(s).unwrap()
    }

    #[test]
    fn test_coerced_replaces_non_positive_values() {
        assert_eq!(EpisodePosition::coerced(0, -3), EpisodePosition { season: 1, episode: 1 });
        assert_eq!(EpisodePosition::coerced(2, 7), EpisodePosition { season: 2, episode: 7 });
    }

    #[test]
    fn test_position_display() {
        assert_eq!(EpisodePosition { season: 3, episode: 12 }.to_string(), "S3E12");
    }

    #[test]
    fn test_deserialize_coerces_stored_zero() {
        let position: EpisodePosition = serde_json::from_str(r#"{"season":0,"episode":4}"#).unwrap();
        assert_eq!(position, EpisodePosition { season: 1, episode: 4 });
    }

    #[test]
    fn test_insert_overwrites_in_place() {
        let mut progress = ViewingProgress::new();
        progress.insert(name("Sam"), EpisodePosition::default());
        progress.insert(name("Alex"), EpisodePosition::default());
        let previous = progress.insert(name("Sam"), EpisodePosition::coerced(2, 3));

        assert_eq!(previous, Some(EpisodePosition::default()));
        let names: Vec<&str> = progress.names().map(|n| n.as_str()).collect();
        assert_eq!(names, vec!["Sam", "Alex"]);
        assert_eq!(progress.get("Sam"), Some(&EpisodePosition::coerced(2, 3)));
    }

    #[test]
    fn test_remove_missing_partner_is_none() {
        let mut progress = ViewingProgress::new();
        assert_eq!(progress.remove("Nobody"), None);
    }

    #[test]
    fn test_serde_preserves_key_order() {
        let json = r#"{"Zoe":{"season":1,"episode":2},"Alex":{"season":3,"episode":4}}"#;
        let progress: ViewingProgress = serde_json::from_str(json).unwrap();
        let names: Vec<&str> = progress.names().map(|n| n.as_str()).collect();
        assert_eq!(names, vec!["Zoe", "Alex"]);
        assert_eq!(serde_json::to_string(&progress).unwrap(), json);
    }
}
