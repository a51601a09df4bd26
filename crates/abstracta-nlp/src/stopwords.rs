//! Stopword list: the standard English list plus configured entries.

use std::collections::HashSet;

use stop_words::{get, LANGUAGE};

#[derive(Debug, Clone)]
pub struct Stopwords {
    words: HashSet<String>,
}

impl Stopwords {
    /// NLTK English list.
    pub fn english() -> Self {
        Self {
            words: get(LANGUAGE::English).iter().map(|w| w.to_lowercase()).collect(),
        }
    }

    /// English list extended with `custom`, compared case-insensitively.
    pub fn with_custom<I, S>(custom: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut list = Self::english();
        list.words
            .extend(custom.into_iter().map(|w| w.as_ref().trim().to_lowercase()));
        list
    }

    /// `word` must already be lowercase.
    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl Default for Stopwords {
    fn default() -> Self {
        Self::english()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_english_list_covers_function_words() {
        let s = Stopwords::english();
        assert!(s.len() > 100);
        for w in ["the", "and", "of", "ourselves", "between", "were"] {
            assert!(s.contains(w), "{w} should be a stopword");
        }
        assert!(!s.contains("venture"));
    }

    #[test]
    fn test_custom_entries_lowercased() {
        let s = Stopwords::with_custom(["Paper", " Study "]);
        assert!(s.contains("paper"));
        assert!(s.contains("study"));
        assert!(s.contains("the"));
        assert!(!s.contains("firm"));
    }
}
