//! Upload parsing into storable texts

use regex::Regex;
use std::sync::OnceLock;

use crate::error::{Error, Result};

fn hyphenated_break() -> &'static Regex {
    static BREAK: OnceLock<Regex> = OnceLock::new();
    BREAK.get_or_init(|| Regex::new(r"(\w)-[ \t]*\r?\n[ \t]*(\w)").expect("valid regex"))
}

fn horizontal_space() -> &'static Regex {
    static SPACE: OnceLock<Regex> = OnceLock::new();
    SPACE.get_or_init(|| Regex::new(r"[ \t]+").expect("valid regex"))
}

/// Split a JSON upload into texts
///
/// Arrays yield one text per element: strings verbatim, anything else as
/// compact JSON. Any other value becomes a single text.
pub fn parse_json(data: &[u8]) -> Result<Vec<String>> {
    let value: serde_json::Value =
        serde_json::from_slice(data).map_err(|e| Error::InvalidJson(e.to_string()))?;

    let texts = match value {
        serde_json::Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                serde_json::Value::String(s) => s,
                other => other.to_string(),
            })
            .collect(),
        other => vec![other.to_string()],
    };

    Ok(drop_blank(texts))
}

/// A Markdown upload is stored whole
pub fn parse_markdown(data: &[u8]) -> Vec<String> {
    drop_blank(vec![String::from_utf8_lossy(data).into_owned()])
}

/// Normalize extracted PDF page texts, dropping blank pages
pub fn pages_to_texts(pages: &[String]) -> Vec<String> {
    drop_blank(pages.iter().map(|p| cleanup_pdf_text(p)).collect())
}

fn drop_blank(texts: Vec<String>) -> Vec<String> {
    texts.into_iter().filter(|t| !t.trim().is_empty()).collect()
}

/// Clean up text produced by PDF extraction
///
/// Expands ligatures and maps typographic punctuation to ASCII. Words split
/// by a hyphenated line break are rejoined, runs of spaces and tabs become
/// one space and runs of blank lines become one.
pub fn cleanup_pdf_text(text: &str) -> String {
    let replaced = text
        .replace('\0', "")
        .replace('\u{00A0}', " ") // Non-breaking space
        .replace('\u{2010}', "-") // Hyphen
        .replace('\u{2011}', "-") // Non-breaking hyphen
        .replace('\u{2013}', "-") // En dash
        .replace('\u{2014}', "--") // Em dash
        .replace(['\u{2018}', '\u{2019}'], "'")
        .replace(['\u{201C}', '\u{201D}'], "\"")
        .replace('\u{2022}', "* ") // Bullet
        .replace('\u{2026}', "...")
        .replace('\u{FB00}', "ff")
        .replace('\u{FB01}', "fi")
        .replace('\u{FB02}', "fl")
        .replace('\u{FB03}', "ffi")
        .replace('\u{FB04}', "ffl");
    let joined = hyphenated_break().replace_all(&replaced, "$1$2");
    let collapsed = horizontal_space().replace_all(&joined, " ");

    let mut cleaned = String::with_capacity(replaced.len());
    let mut blank_run = 0;
    for line in collapsed.lines() {
        let line = line.trim();
        if line.is_empty() {
            blank_run += 1;
            if blank_run > 1 {
                continue;
            }
        } else {
            blank_run = 0;
        }
        cleaned.push_str(line);
        cleaned.push('\n');
    }

    cleaned.trim().to_string()
}
