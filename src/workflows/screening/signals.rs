use std::collections::BTreeSet;

/// Fixed, extensible vocabulary of suspicious-wording markers scanned for in
/// tender specifications (brand-locking phrases, single-source qualifiers).
#[derive(Debug, Clone)]
pub struct Vocabulary {
    markers: Vec<String>,
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self::new([
            "exclusively",
            "sole supplier",
            "only supplier",
            "specific brand",
            "specific model",
            "no equivalent accepted",
            "original manufacturer only",
            "mandatory brand",
            "compatible only with",
        ])
    }
}

impl Vocabulary {
    pub fn new<I, S>(markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            markers: markers
                .into_iter()
                .map(|marker| marker.into().trim().to_lowercase())
                .filter(|marker| !marker.is_empty())
                .collect(),
        }
    }

    pub fn markers(&self) -> &[String] {
        &self.markers
    }

    /// Scan a specification for matched markers. Pure and idempotent:
    /// case-insensitive substring matching over the lowercased text, returning
    /// a set so vocabulary order and repeated occurrences never matter.
    pub fn extract(&self, specification: &str) -> BTreeSet<String> {
        let text = specification.to_lowercase();
        self.markers
            .iter()
            .filter(|marker| text.contains(marker.as_str()))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matching_is_case_insensitive() {
        let vocabulary = Vocabulary::default();
        let matches = vocabulary.extract("Equipment EXCLUSIVELY from a Specific Brand");
        assert!(matches.contains("exclusively"));
        assert!(matches.contains("specific brand"));
        assert_eq!(matches.len(), 2);
    }

    #[test]
    fn repeated_occurrences_count_once() {
        let vocabulary = Vocabulary::default();
        let matches = vocabulary.extract("sole supplier, again the sole supplier");
        assert_eq!(matches.len(), 1);
    }

    #[test]
    fn clean_text_produces_empty_set() {
        let vocabulary = Vocabulary::default();
        assert!(vocabulary.extract("400 laptops, 16GB RAM, 3-year warranty").is_empty());
    }

    #[test]
    fn extraction_is_idempotent() {
        let vocabulary = Vocabulary::default();
        let text = "mandatory brand, no equivalent accepted";
        assert_eq!(vocabulary.extract(text), vocabulary.extract(text));
    }
}
