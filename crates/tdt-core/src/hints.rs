//! Caller-supplied hints (`taglength`, `filter`, `gs1companyprefixlength`,
//! `companyprefixlength`, and any scheme-specific `optionKey`) used by the
//! scheme selector (§4.4, §6). All values are kept as strings; numeric ones are
//! parsed on demand.

use std::collections::HashMap;

use crate::errors::{Result, TdtError};

#[derive(Debug, Clone, Default)]
pub struct Hints(HashMap<String, String>);

impl Hints {
    pub fn new() -> Self {
        Hints(HashMap::new())
    }

    pub fn from_map(map: HashMap<String, String>) -> Self {
        Hints(map)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn tag_length(&self) -> Option<usize> {
        self.get("taglength").and_then(|v| v.parse().ok())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.0.iter()
    }

    /// Parses the convenience `;`-separated `key=value` hints string (§6):
    /// empty pairs are ignored, keys and values are trimmed.
    pub fn parse(hints_str: &str) -> Result<Self> {
        let mut map = HashMap::new();

        for pair in hints_str.split(';') {
            let pair = pair.trim();
            if pair.is_empty() {
                continue;
            }

            let (key, value) = pair.split_once('=').ok_or_else(|| {
                TdtError::InvalidArgument(format!("malformed hint pair {pair:?}, expected key=value"))
            })?;

            map.insert(key.trim().to_string(), value.trim().to_string());
        }

        Ok(Hints(map))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic() {
        let hints = Hints::parse("taglength=96;filter=3;gs1companyprefixlength=7").unwrap();
        assert_eq!(hints.tag_length(), Some(96));
        assert_eq!(hints.get("filter"), Some("3"));
        assert_eq!(hints.get("gs1companyprefixlength"), Some("7"));
    }

    #[test]
    fn test_parse_ignores_empty_pairs_and_trims() {
        let hints = Hints::parse(" taglength = 96 ;; filter=3; ").unwrap();
        assert_eq!(hints.tag_length(), Some(96));
        assert_eq!(hints.get("filter"), Some("3"));
    }

    #[test]
    fn test_parse_malformed_pair() {
        assert!(Hints::parse("taglength").is_err());
    }

    #[test]
    fn test_parse_empty_string() {
        let hints = Hints::parse("").unwrap();
        assert_eq!(hints.tag_length(), None);
    }
}
