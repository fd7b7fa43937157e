use serde::Serialize;

/// One row as it comes off the listing page, before any cleanup.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RawRow {
    pub title: String,
    pub poster: String,
    pub year: String,
    pub director: String,
    pub country: String,
}

/// Same shape as [`RawRow`], after the normalizer has run. `year` is empty
/// when the source had no year cell at all.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct NormalizedRow {
    pub title: String,
    pub poster: String,
    pub year: String,
    pub director: String,
    pub country: String,
}

/// Attributes returned by the metadata service for a successful match.
/// `None` means the service had no value for that field.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Enrichment {
    pub external_id: String,
    pub overview: Option<String>,
    pub rating: Option<String>,
    pub runtime: Option<String>,
    pub genre: Option<String>,
    pub cast: Vec<String>,
    pub poster: Option<String>,
}

/// Which fallback attempt produced a match.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize)]
pub enum QueryTier {
    TitleAndYear,
    TitleOnly,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resolution {
    Resolved { tier: QueryTier, enrichment: Enrichment },
    Unresolved,
}

/// A film entry. Produced by the merger as a candidate; only candidates that
/// pass [`MovieRecord::missing_fields`] ever reach the database.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MovieRecord {
    pub external_id: Option<String>,
    pub title: String,
    pub poster: String,
    pub year: String,
    pub director: String,
    pub country: String,
    pub overview: Option<String>,
    pub rating: Option<String>,
    pub runtime: Option<String>,
    pub genre: Option<String>,
    pub cast: Vec<String>,
}

impl MovieRecord {
    /// Names of the required fields that are absent or blank.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let external_id = self.external_id.as_deref().unwrap_or_default();
        [
            ("external_id", external_id),
            ("title", self.title.as_str()),
            ("poster", self.poster.as_str()),
            ("year", self.year.as_str()),
            ("director", self.director.as_str()),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect()
    }

    pub fn slug(&self) -> String {
        slugify(&self.title)
    }
}

/// A row the resolver could not match, kept for the side report.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct UnresolvedEntry {
    pub title: String,
    pub year: String,
    pub director: String,
    pub country: String,
    pub poster: String,
}

impl From<&NormalizedRow> for UnresolvedEntry {
    fn from(row: &NormalizedRow) -> Self {
        Self {
            title: row.title.clone(),
            year: row.year.clone(),
            director: row.director.clone(),
            country: row.country.clone(),
            poster: row.poster.clone(),
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum StoreOutcome {
    Inserted,
    Duplicate,
    MissingData,
}

/// Counters for one pipeline run.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub extracted: usize,
    pub extraction_gaps: usize,
    pub resolved_title_and_year: usize,
    pub resolved_title_only: usize,
    pub unresolved: usize,
    pub inserted: usize,
    pub duplicates: usize,
    pub missing_data: usize,
    pub failed_writes: usize,
}

/// Lowercased title with spaces replaced by hyphens. Titles differing only in
/// punctuation or case can map to the same slug.
pub fn slugify(title: &str) -> String {
    title.to_lowercase().replace(' ', "-")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_record() -> MovieRecord {
        MovieRecord {
            external_id: Some("tt0047478".to_string()),
            title: "Seven Samurai".to_string(),
            poster: "http://x/p.jpg".to_string(),
            year: "1954".to_string(),
            director: "Akira Kurosawa".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn complete_record_has_no_missing_fields() {
        assert!(complete_record().missing_fields().is_empty());
    }

    #[test]
    fn country_is_not_required() {
        let record = MovieRecord { country: String::new(), ..complete_record() };
        assert!(record.missing_fields().is_empty());
    }

    #[test]
    fn blank_fields_are_reported() {
        let record = MovieRecord {
            external_id: None,
            director: "   ".to_string(),
            ..complete_record()
        };
        assert_eq!(record.missing_fields(), vec!["external_id", "director"]);
    }

    #[test]
    fn slug_lowercases_and_hyphenates() {
        assert_eq!(slugify("Seven Samurai"), "seven-samurai");
        assert_eq!(slugify("The 400 Blows"), "the-400-blows");
    }
}
