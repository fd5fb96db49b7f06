//! Keyword classifier - maps vulnerability text onto the attack-type taxonomy

use raengine_common::{AttackTable, AttackType};

/// Attack types matched for one vulnerability, in taxonomy order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TypeMatches {
    matches: Vec<(String, f64)>,
}

impl TypeMatches {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a match; a type already present is ignored
    pub fn insert(&mut self, name: impl Into<String>, score: f64) {
        let name = name.into();
        if !self.contains(&name) {
            self.matches.push((name, score));
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.matches.iter().any(|(n, _)| n == name)
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    pub fn len(&self) -> usize {
        self.matches.len()
    }

    /// Matched type names in matching order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.matches.iter().map(|(n, _)| n.as_str())
    }

    /// Base scores in matching order
    pub fn scores(&self) -> impl Iterator<Item = f64> + '_ {
        self.matches.iter().map(|(_, s)| *s)
    }
}

impl<S: Into<String>> FromIterator<(S, f64)> for TypeMatches {
    fn from_iter<I: IntoIterator<Item = (S, f64)>>(iter: I) -> Self {
        let mut matches = TypeMatches::new();
        for (name, score) in iter {
            matches.insert(name, score);
        }
        matches
    }
}

/// Case-insensitive substring matcher over the configured attack table
pub struct KeywordClassifier {
    table: AttackTable,
}

impl KeywordClassifier {
    pub fn new(table: AttackTable) -> Self {
        Self { table }
    }

    /// Match a vulnerability description (threat + impact text)
    pub fn classify(&self, description: &str) -> TypeMatches {
        let haystack = description.to_lowercase();

        self.table
            .iter()
            .filter(|attack| Self::hits(attack, &haystack))
            .map(|attack| (attack.name.as_str(), attack.score))
            .collect()
    }

    fn hits(attack: &AttackType, haystack: &str) -> bool {
        attack.keywords.iter().any(|kw| haystack.contains(kw.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> AttackTable {
        AttackTable::new(vec![
            AttackType::new("xss", "cross-site scripting, XSS", 6.0),
            AttackType::new("rce", "remote code execution, arbitrary code", 10.0),
            AttackType::new("dos", "denial of service,crash", 4.0),
        ])
    }

    #[test]
    fn test_case_insensitive_match() {
        let classifier = KeywordClassifier::new(table());
        let matches = classifier.classify("Allows Remote Code Execution via crafted packet");
        assert_eq!(matches.names().collect::<Vec<_>>(), vec!["rce"]);
        assert_eq!(matches.scores().collect::<Vec<_>>(), vec![10.0]);
    }

    #[test]
    fn test_type_matches_once() {
        let classifier = KeywordClassifier::new(table());
        let matches = classifier.classify("remote code execution leading to arbitrary code");
        assert_eq!(matches.len(), 1);
    }

    #[test]
    fn test_matches_follow_table_order() {
        let classifier = KeywordClassifier::new(table());
        let matches = classifier.classify("a crash (denial of service) or XSS");
        assert_eq!(matches.names().collect::<Vec<_>>(), vec!["xss", "dos"]);
    }

    #[test]
    fn test_no_match() {
        let classifier = KeywordClassifier::new(table());
        assert!(classifier.classify("information disclosure").is_empty());
        assert!(classifier.classify("").is_empty());
    }

    #[test]
    fn test_blank_keywords_never_match() {
        let classifier = KeywordClassifier::new(AttackTable::new(vec![AttackType::new(
            "trailing",
            "sql injection, ",
            9.0,
        )]));
        assert!(classifier.classify("nothing relevant here").is_empty());
    }
}
