use super::*;
use pretty_assertions::assert_eq;

const MINIMAL: &str = r#"
[crossref]
user_agent = "abstracta-tests/0.1 (mailto:tests@example.org)"

[journals]
"Journal of Business Venturing" = ["0883-9026", "1873-2003"]
"Strategic Entrepreneurship Journal" = ["1932-4391"]
"Small Business Economics" = ["0921-898X"]

[journal_sample]
journals = ["Journal of Business Venturing", "Small Business Economics"]
start_year = 2014

[[scholars]]
first_name = "Ada"
last_name = "Lovelace"
start_year = 2010

[embedding]
model = "nomic-embed-text"
"#;

#[test]
fn test_minimal_settings_fill_defaults() {
    let s = Settings::from_toml_str(MINIMAL).unwrap();
    assert_eq!(s.crossref.page_size, 1000);
    assert_eq!(s.crossref.author_timeout_secs, 30);
    assert_eq!(s.crossref.journal_timeout_secs, 100);
    assert_eq!(s.embedding.chunk_size, 10);
    assert_eq!(s.embedding.max_retries, 5);
    assert_eq!(s.embedding.retry_backoff_secs, 20);
    assert_eq!(s.tsne.seed, 24601);
    assert_eq!(s.preprocess.min_token_len, 3);
    assert_eq!(s.preprocess.phrase_min_count, 3);
    assert_eq!(s.contrast.authors.minimum_term_frequency, 2);
    assert_eq!(s.contrast.journals.minimum_term_frequency, 20);
    assert_eq!(s.contrast.citations.exclude_from_year, Some(2024));
    assert_eq!(s.paths.on_existing, OnExisting::Overwrite);
    assert_eq!(s.paths.vector_store_on_existing, OnExisting::Reuse);
}

#[test]
fn test_issn_list_for_all_and_sampled_journals() {
    let s = Settings::from_toml_str(MINIMAL).unwrap();
    let all = s.issn_list(None);
    assert_eq!(all.len(), 4);
    assert_eq!(
        s.sample_issns(),
        vec!["0883-9026".to_string(), "1873-2003".to_string(), "0921-898X".to_string()]
    );
}

#[test]
fn test_placeholder_user_agent_rejected() {
    let doc = MINIMAL.replace("tests@example.org", "YourEmailHere");
    let err = Settings::from_toml_str(&doc).unwrap_err();
    assert!(matches!(err, AbstractaError::Config(ref m) if m.contains("email")));
}

#[test]
fn test_unknown_sample_journal_rejected() {
    let doc = MINIMAL.replace("\"Small Business Economics\"]", "\"Nonexistent Review\"]");
    let err = Settings::from_toml_str(&doc).unwrap_err();
    assert!(matches!(err, AbstractaError::Config(ref m) if m.contains("Nonexistent Review")));
}

#[test]
fn test_missing_required_section_is_parse_error() {
    let doc = MINIMAL.replace("[embedding]\nmodel = \"nomic-embed-text\"\n", "");
    assert!(matches!(Settings::from_toml_str(&doc), Err(AbstractaError::Toml(_))));
}

#[test]
fn test_empty_document_rejected() {
    assert!(matches!(Settings::from_toml_str("  \n"), Err(AbstractaError::Config(_))));
}

#[test]
fn test_quantile_out_of_range_rejected() {
    let doc = format!("{MINIMAL}\n[contrast.citations]\nhigh_quantile = 1.5\n");
    assert!(matches!(Settings::from_toml_str(&doc), Err(AbstractaError::Config(_))));
}

#[test]
fn test_on_existing_parses_snake_case() {
    let doc = format!("{MINIMAL}\n[paths]\non_existing = \"fail\"\nvector_store_on_existing = \"overwrite\"\n");
    let s = Settings::from_toml_str(&doc).unwrap();
    assert_eq!(s.paths.on_existing, OnExisting::Fail);
    assert_eq!(s.paths.vector_store_on_existing, OnExisting::Overwrite);
}

#[test]
fn test_load_missing_file_is_config_error() {
    let err = Settings::load("/definitely/not/here/abstracta.toml").unwrap_err();
    assert!(matches!(err, AbstractaError::Config(_)));
}
