use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::info;

use super::{is_synset_id, StoreError};

/// WordNet noun synset ids and their lemmas.
///
/// Read from an ImageNet style mapping file, one synset per line:
/// `n01440764 tench, Tinca tinca`.
#[derive(Debug, Default, Clone)]
pub struct SynsetMap {
    lemmas: HashMap<String, String>,
}

impl SynsetMap {
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        let content = fs::read_to_string(path)?;
        let map = Self::parse(&content)?;
        info!("Loaded {} synsets from {}", map.len(), path.display());
        Ok(map)
    }

    pub fn parse(content: &str) -> Result<Self, StoreError> {
        let mut lemmas = HashMap::new();
        for (number, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let (id, words) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
            let words = words.trim();
            if !is_synset_id(id) || words.is_empty() {
                return Err(StoreError::Corrupt(format!(
                    "synset mapping line {} is not `<synset id> <lemmas>`: {:?}",
                    number + 1,
                    line
                )));
            }
            lemmas.insert(id.to_string(), words.to_string());
        }
        Ok(Self { lemmas })
    }

    /// Comma separated lemmas of a synset, most common first.
    pub fn lemmas(&self, id: &str) -> Option<&str> {
        self.lemmas.get(id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.lemmas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lemmas.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_mapping() {
        let map = SynsetMap::parse("n01440764 tench, Tinca tinca\n\nn02084071 dog, domestic dog\n").unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map.lemmas("n02084071"), Some("dog, domestic dog"));
        assert_eq!(map.lemmas("n99999999"), None);
    }

    #[test]
    fn test_parse_rejects_malformed_lines() {
        assert!(matches!(SynsetMap::parse("dog n02084071"), Err(StoreError::Corrupt(_))));
        assert!(matches!(SynsetMap::parse("n02084071"), Err(StoreError::Corrupt(_))));
    }
}
