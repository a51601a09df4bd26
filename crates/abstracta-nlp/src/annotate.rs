//! Linguistic annotation: tokens with a coarse grammatical category and a
//! lemma.

use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

/// Coarse token category, a subset of the universal POS tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenCategory {
    Word,
    Punct,
    Sym,
    Num,
    Part,
    X,
}

impl TokenCategory {
    /// Categories that carry no lexical content.
    pub fn is_non_word(&self) -> bool {
        !matches!(self, TokenCategory::Word)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TokenCategory::Word => "WORD",
            TokenCategory::Punct => "PUNCT",
            TokenCategory::Sym => "SYM",
            TokenCategory::Num => "NUM",
            TokenCategory::Part => "PART",
            TokenCategory::X => "X",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotatedToken {
    pub text: String,
    pub lemma: String,
    pub category: TokenCategory,
}

impl AnnotatedToken {
    pub fn new(text: impl Into<String>, lemma: impl Into<String>, category: TokenCategory) -> Self {
        Self {
            text: text.into(),
            lemma: lemma.into(),
            category,
        }
    }
}

/// Splits a cleaned abstract into annotated tokens.
pub trait Annotator: Send + Sync {
    fn annotate(&self, text: &str) -> Vec<AnnotatedToken>;
}

/// Unicode word-boundary segmentation with character-class tagging and a
/// suffix-rule lemmatiser for English.
#[derive(Debug, Default, Clone, Copy)]
pub struct RuleAnnotator;

impl RuleAnnotator {
    pub fn new() -> Self {
        Self
    }
}

impl Annotator for RuleAnnotator {
    fn annotate(&self, text: &str) -> Vec<AnnotatedToken> {
        let mut out = Vec::new();
        for segment in text.split_word_bounds() {
            if segment.trim().is_empty() {
                continue;
            }
            if segment.chars().any(char::is_alphanumeric) {
                push_word(segment, &mut out);
            } else {
                out.push(AnnotatedToken::new(segment, segment, symbol_category(segment)));
            }
        }
        out
    }
}

fn punct_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\p{P}+$").expect("punctuation pattern compiles"))
}

fn sym_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\p{S}+$").expect("symbol pattern compiles"))
}

/// Category of a segment with no letters or digits.
fn symbol_category(segment: &str) -> TokenCategory {
    if punct_regex().is_match(segment) {
        TokenCategory::Punct
    } else if sym_regex().is_match(segment) {
        TokenCategory::Sym
    } else {
        TokenCategory::X
    }
}

const CLITICS: &[&str] = &["'s", "'re", "'ve", "'ll", "'d", "'m"];

/// Push a word-like match, splitting negation and English clitics off.
fn push_word(raw: &str, out: &mut Vec<AnnotatedToken>) {
    if is_number(raw) {
        out.push(AnnotatedToken::new(raw, raw, TokenCategory::Num));
        return;
    }

    let normalised = raw.replace('’', "'");
    let lower = normalised.to_lowercase();

    if lower.len() > 3 && lower.ends_with("n't") {
        let split = raw.len() - suffix_byte_len(raw, 3);
        push_plain_word(&raw[..split], out);
        out.push(AnnotatedToken::new(&raw[split..], "not", TokenCategory::Part));
        return;
    }

    if let Some(pos) = lower.find('\'') {
        let clitic = &lower[pos..];
        if pos > 0 && CLITICS.contains(&clitic) {
            let split = raw.len() - suffix_byte_len(raw, clitic.chars().count());
            push_plain_word(&raw[..split], out);
            let category = if clitic == "'s" { TokenCategory::Part } else { TokenCategory::Word };
            out.push(AnnotatedToken::new(&raw[split..], lemmatize(clitic), category));
            return;
        }
    }

    push_plain_word(raw, out);
}

fn push_plain_word(word: &str, out: &mut Vec<AnnotatedToken>) {
    let lower = word.to_lowercase();
    let category = if lower == "not" { TokenCategory::Part } else { TokenCategory::Word };
    out.push(AnnotatedToken::new(word, lemmatize(&lower), category));
}

/// Byte length of the last `n` chars of `s`.
fn suffix_byte_len(s: &str, n: usize) -> usize {
    s.chars().rev().take(n).map(char::len_utf8).sum()
}

fn is_number(s: &str) -> bool {
    s.chars().next().is_some_and(|c| c.is_numeric())
        && s.chars().all(|c| c.is_numeric() || c == '.' || c == ',')
}

fn irregular_lemmas() -> &'static HashMap<&'static str, &'static str> {
    static MAP: OnceLock<HashMap<&'static str, &'static str>> = OnceLock::new();
    MAP.get_or_init(|| {
        HashMap::from([
            ("am", "be"), ("is", "be"), ("are", "be"), ("was", "be"), ("were", "be"),
            ("been", "be"), ("being", "be"), ("'re", "be"), ("'m", "be"),
            ("has", "have"), ("had", "have"), ("having", "have"), ("'ve", "have"),
            ("does", "do"), ("did", "do"), ("done", "do"), ("doing", "do"),
            ("goes", "go"), ("went", "go"), ("gone", "go"),
            ("'ll", "will"), ("'d", "would"),
            ("made", "make"), ("found", "find"), ("shown", "show"), ("showed", "show"),
            ("took", "take"), ("taken", "take"), ("gave", "give"), ("given", "give"),
            ("children", "child"), ("men", "man"), ("women", "woman"), ("feet", "foot"),
            ("lives", "life"), ("wives", "wife"),
            ("criteria", "criterion"), ("phenomena", "phenomenon"),
            ("analyses", "analysis"), ("hypotheses", "hypothesis"), ("theses", "thesis"),
            ("crises", "crisis"), ("bases", "basis"), ("syntheses", "synthesis"),
            ("emphases", "emphasis"),
        ])
    })
}

/// Words ending in "s" that are not plurals.
const NON_PLURALS: &[&str] = &[
    "always", "perhaps", "whereas", "thus", "various", "news", "series", "species",
    "economics", "politics", "ethics", "mathematics", "physics", "dynamics",
    "logistics", "analytics", "lens", "bias", "gas", "yes", "less", "unless",
    "across", "towards", "afterwards", "besides", "sometimes", "nevertheless",
    "regardless", "its", "this", "his", "hers", "ours", "yours", "theirs",
];

/// Lemma of a lowercase word: irregular forms, then noun plural rules.
pub fn lemmatize(lower: &str) -> String {
    if let Some(lemma) = irregular_lemmas().get(lower) {
        return lemma.to_string();
    }
    if lower.chars().count() <= 3 || NON_PLURALS.contains(&lower) {
        return lower.to_string();
    }

    if let Some(stem) = lower.strip_suffix("ies") {
        if stem.chars().count() >= 2 {
            return format!("{stem}y");
        }
    }
    if lower.ends_with("sses") {
        return lower[..lower.len() - 2].to_string();
    }
    for suffix in ["xes", "ches", "shes", "zzes"] {
        if lower.ends_with(suffix) {
            return lower[..lower.len() - 2].to_string();
        }
    }
    if lower.ends_with('s') && !["ss", "us", "is", "ous"].iter().any(|s| lower.ends_with(s)) {
        return lower[..lower.len() - 1].to_string();
    }
    lower.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn categories(text: &str) -> Vec<(String, TokenCategory)> {
        RuleAnnotator::new()
            .annotate(text)
            .into_iter()
            .map(|t| (t.text, t.category))
            .collect()
    }

    #[test]
    fn test_categories_assigned() {
        use TokenCategory::*;
        let got = categories("Growth rates, 3.5% higher (n = 120).");
        let want: Vec<(String, TokenCategory)> = [
            ("Growth", Word), ("rates", Word), (",", Punct), ("3.5", Num), ("%", Punct),
            ("higher", Word), ("(", Punct), ("n", Word), ("=", Sym), ("120", Num),
            (")", Punct), (".", Punct),
        ]
        .into_iter()
        .map(|(t, c)| (t.to_string(), c))
        .collect();
        assert_eq!(got, want);
    }

    #[test]
    fn test_clitics_split() {
        let tokens = RuleAnnotator::new().annotate("Founders don't share the firm's equity");
        let texts: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["Founders", "do", "n't", "share", "the", "firm", "'s", "equity"]);
        assert_eq!(tokens[2].category, TokenCategory::Part);
        assert_eq!(tokens[2].lemma, "not");
        assert_eq!(tokens[6].category, TokenCategory::Part);
        assert_eq!(tokens[0].lemma, "founder");
    }

    #[test]
    fn test_unicode_words_and_hyphens() {
        let got = categories("Café owners’ venture-backed firms…");
        let texts: Vec<&str> = got.iter().map(|(t, _)| t.as_str()).collect();
        assert_eq!(texts, vec!["Café", "owners", "’", "venture", "-", "backed", "firms", "…"]);
        assert_eq!(got[2].1, TokenCategory::Punct);
        assert_eq!(got[7].1, TokenCategory::Punct);
    }

    #[test]
    fn test_whitespace_only_yields_nothing() {
        assert!(RuleAnnotator::new().annotate(" \n\t ").is_empty());
    }

    #[test]
    fn test_lemmatize_plurals() {
        assert_eq!(lemmatize("studies"), "study");
        assert_eq!(lemmatize("businesses"), "business");
        assert_eq!(lemmatize("approaches"), "approach");
        assert_eq!(lemmatize("firms"), "firm");
        assert_eq!(lemmatize("business"), "business");
        assert_eq!(lemmatize("status"), "status");
        assert_eq!(lemmatize("analysis"), "analysis");
        assert_eq!(lemmatize("previous"), "previous");
        assert_eq!(lemmatize("always"), "always");
        assert_eq!(lemmatize("was"), "be");
        assert_eq!(lemmatize("hypotheses"), "hypothesis");
    }
}
