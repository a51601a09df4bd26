//! JATS abstract markup stripping.
//!
//! CrossRef abstracts arrive as JATS fragments such as
//! `<jats:title>Abstract</jats:title><jats:p>Text…</jats:p>`. Titles are
//! dropped and paragraph texts are joined with a single space. Text outside
//! any paragraph is discarded. Only the ends of the result are trimmed;
//! whitespace inside paragraphs is stored as published.

use std::sync::OnceLock;

use quick_xml::events::Event;
use quick_xml::reader::Reader;
use regex::Regex;
use tracing::debug;

fn tag_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"</?[A-Za-z][^<>]*>").expect("tag pattern compiles"))
}

fn paragraph_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)<(?:[\w-]+:)?p(?:\s[^<>]*)?>(.*?)</(?:[\w-]+:)?p\s*>")
            .expect("paragraph pattern compiles")
    })
}

/// Plain text of a JATS abstract, or `None` when nothing textual remains.
///
/// Text without tags passes through trimmed, so the function is idempotent
/// on its own output. Markup without any paragraph yields `None`.
pub fn strip_markup(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    let text = if tag_regex().is_match(raw) {
        match paragraph_text(raw) {
            Ok(text) => text,
            Err(e) => {
                debug!(error = %e, "Malformed abstract markup; matching paragraphs by pattern");
                paragraph_text_by_pattern(raw)
            }
        }
    } else {
        raw.to_string()
    };

    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

/// Walk the fragment as a tag tree: skip `title` subtrees, collect the text
/// of each top-level `p`. Fragments without paragraphs yield an empty
/// string.
fn paragraph_text(raw: &str) -> Result<String, quick_xml::Error> {
    let wrapped = format!("<abstract>{raw}</abstract>");
    let mut reader = Reader::from_str(&wrapped);
    reader.config_mut().check_end_names = false;

    let mut paragraphs: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut title_depth = 0usize;
    let mut p_depth = 0usize;

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"title" => title_depth += 1,
                b"p" => {
                    p_depth += 1;
                    if p_depth == 1 {
                        current.clear();
                    }
                }
                _ => {}
            },
            Event::End(e) => match e.local_name().as_ref() {
                b"title" => title_depth = title_depth.saturating_sub(1),
                b"p" if p_depth > 0 => {
                    p_depth -= 1;
                    if p_depth == 0 {
                        paragraphs.push(std::mem::take(&mut current));
                    }
                }
                _ => {}
            },
            Event::Text(t) if title_depth == 0 => {
                let text = match t.unescape() {
                    Ok(s) => s.into_owned(),
                    Err(_) => String::from_utf8_lossy(&t).into_owned(),
                };
                if p_depth > 0 {
                    current.push_str(&text);
                }
            }
            Event::CData(t) if title_depth == 0 => {
                let text = String::from_utf8_lossy(&t).into_owned();
                if p_depth > 0 {
                    current.push_str(&text);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if p_depth > 0 {
        paragraphs.push(current);
    }

    Ok(paragraphs.join(" "))
}

/// Fallback for fragments the reader rejects.
fn paragraph_text_by_pattern(raw: &str) -> String {
    paragraph_regex()
        .captures_iter(raw)
        .filter_map(|caps| caps.get(1))
        .map(|m| tag_regex().replace_all(m.as_str(), "").into_owned())
        .collect::<Vec<_>>()
        .join(" ")
}
