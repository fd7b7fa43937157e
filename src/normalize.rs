use std::sync::LazyLock;

use regex::Regex;

use crate::models::{NormalizedRow, RawRow};

static YEAR_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|[^0-9])([0-9]{4})(?:[^0-9]|$)").expect("year token regex should compile")
});
static TRAILING_PARENTHETICAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\s*\([^()]*\)\s*$").expect("trailing parenthetical regex should compile")
});
static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace regex should compile"));

#[derive(Clone, Copy, Debug)]
pub struct NormalizeOptions {
    pub strip_title_annotations: bool,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self { strip_title_annotations: true }
    }
}

pub fn normalize(raw: &RawRow, opts: NormalizeOptions) -> NormalizedRow {
    NormalizedRow {
        title: normalize_title(&raw.title, opts.strip_title_annotations),
        poster: raw.poster.trim().to_string(),
        year: normalize_year(&raw.year),
        director: raw.director.trim().to_string(),
        country: raw.country.trim().to_string(),
    }
}

pub fn normalize_title(raw: &str, strip_annotations: bool) -> String {
    let mut title = WHITESPACE_RUN.replace_all(raw.trim(), " ").into_owned();
    if strip_annotations {
        // "Foo (Restored) (Director's Cut)" loses both annotations, but a
        // title that is nothing but a parenthetical is left alone.
        loop {
            let stripped = TRAILING_PARENTHETICAL.replace(&title, "");
            if stripped.is_empty() || stripped.len() == title.len() {
                break;
            }
            title = stripped.into_owned();
        }
    }
    title
}

/// First standalone 4-digit run in the text, or the trimmed text itself.
pub fn normalize_year(raw: &str) -> String {
    let trimmed = raw.trim();
    YEAR_TOKEN
        .captures(trimmed)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| trimmed.to_string())
}
