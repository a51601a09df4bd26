//! Token exclusion and normalisation.

use abstracta_common::settings::PreprocessSettings;

use crate::annotate::AnnotatedToken;
use crate::stopwords::Stopwords;

/// Independently toggleable exclusion rules applied to annotated tokens.
#[derive(Debug, Clone)]
pub struct TokenFilter {
    pub remove_non_word_categories: bool,
    pub remove_stopwords: bool,
    pub lemmatize: bool,
    /// Forms shorter than this are dropped; 0 disables the rule.
    pub min_token_len: usize,
    pub stopwords: Stopwords,
}

impl TokenFilter {
    pub fn from_settings(cfg: &PreprocessSettings) -> Self {
        Self {
            remove_non_word_categories: cfg.remove_non_word_categories,
            remove_stopwords: cfg.remove_stopwords,
            lemmatize: cfg.lemmatize,
            min_token_len: cfg.min_token_len,
            stopwords: Stopwords::with_custom(&cfg.custom_stopwords),
        }
    }

    /// Lowercased, trimmed forms of the tokens that survive every enabled
    /// rule, in input order.
    pub fn filter(&self, tokens: &[AnnotatedToken]) -> Vec<String> {
        tokens
            .iter()
            .filter(|t| !(self.remove_non_word_categories && t.category.is_non_word()))
            .filter_map(|t| {
                let form = if self.lemmatize { &t.lemma } else { &t.text };
                if form.chars().count() < self.min_token_len {
                    return None;
                }
                let form = form.to_lowercase();
                if self.remove_stopwords && self.stopwords.contains(&form) {
                    return None;
                }
                Some(form.trim().to_string())
            })
            .collect()
    }
}

impl Default for TokenFilter {
    fn default() -> Self {
        Self::from_settings(&PreprocessSettings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotate::TokenCategory;
    use pretty_assertions::assert_eq;

    fn sample() -> Vec<AnnotatedToken> {
        use TokenCategory::*;
        vec![
            AnnotatedToken::new("Venture", "venture", Word),
            AnnotatedToken::new(",", ",", Punct),
            AnnotatedToken::new("capital", "capital", Word),
            AnnotatedToken::new("2019", "2019", Num),
            AnnotatedToken::new("funds", "fund", Word),
            AnnotatedToken::new(".", ".", Punct),
        ]
    }

    fn permissive() -> TokenFilter {
        TokenFilter {
            remove_non_word_categories: false,
            remove_stopwords: false,
            lemmatize: false,
            min_token_len: 0,
            stopwords: Stopwords::english(),
        }
    }

    #[test]
    fn test_category_exclusion_toggle() {
        let mut f = permissive();
        assert_eq!(
            f.filter(&sample()),
            vec!["venture", ",", "capital", "2019", "funds", "."]
        );
        f.remove_non_word_categories = true;
        assert_eq!(f.filter(&sample()), vec!["venture", "capital", "funds"]);
    }

    #[test]
    fn test_length_and_stopword_rules() {
        use TokenCategory::*;
        let tokens = vec![
            AnnotatedToken::new("The", "the", Word),
            AnnotatedToken::new("AI", "ai", Word),
            AnnotatedToken::new("Paper", "paper", Word),
            AnnotatedToken::new("studies", "study", Word),
        ];
        let f = TokenFilter {
            min_token_len: 3,
            remove_stopwords: true,
            lemmatize: true,
            stopwords: Stopwords::with_custom(["paper"]),
            ..permissive()
        };
        assert_eq!(f.filter(&tokens), vec!["study"]);
    }

    #[test]
    fn test_surface_form_when_not_lemmatizing() {
        let f = TokenFilter {
            remove_non_word_categories: true,
            ..permissive()
        };
        assert_eq!(f.filter(&sample())[2], "funds");
    }
}
