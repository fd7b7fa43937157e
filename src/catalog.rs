//! Serialization boundary for stored records: the flat export document and
//! the Stremio add-on payloads. Absent enrichment values become placeholder
//! strings here and nowhere else.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{error::AppResult, models::MovieRecord};

pub const NO_OVERVIEW: &str = "No overview available.";
pub const NOT_AVAILABLE: &str = "N/A";
pub const UNKNOWN: &str = "Unknown";
pub const DEFAULT_DESCRIPTION: &str = "A film from the Criterion Collection.";
pub const CATALOG_ID: &str = "criterion";

/// One entry of the flat `criterion_movies.json` document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExportedMovie {
    pub id: String,
    pub title: String,
    pub poster: String,
    pub year: String,
    pub director: String,
    pub country: String,
    pub overview: String,
    pub imdb_rating: String,
    pub runtime: String,
    pub genre: String,
    pub cast: Vec<String>,
}

impl From<&MovieRecord> for ExportedMovie {
    fn from(record: &MovieRecord) -> Self {
        Self {
            id: record.external_id.clone().unwrap_or_default(),
            title: record.title.clone(),
            poster: record.poster.clone(),
            year: record.year.clone(),
            director: record.director.clone(),
            country: record.country.clone(),
            overview: record.overview.clone().unwrap_or_else(|| NO_OVERVIEW.to_string()),
            imdb_rating: record.rating.clone().unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            runtime: record.runtime.clone().unwrap_or_else(|| UNKNOWN.to_string()),
            genre: record.genre.clone().unwrap_or_else(|| UNKNOWN.to_string()),
            cast: record.cast.clone(),
        }
    }
}

pub async fn write_json<T: Serialize>(path: &Path, value: &T) -> AppResult<()> {
    let body = serde_json::to_vec_pretty(value)?;
    tokio::fs::write(path, body).await?;
    Ok(())
}

pub async fn export(path: &Path, records: &[MovieRecord]) -> AppResult<()> {
    let doc: Vec<ExportedMovie> = records.iter().map(ExportedMovie::from).collect();
    write_json(path, &doc).await
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    pub id: &'static str,
    pub version: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub resources: [&'static str; 2],
    pub types: [&'static str; 1],
    pub id_prefixes: [&'static str; 1],
    pub catalogs: Vec<ManifestCatalog>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestCatalog {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub id: &'static str,
    pub name: &'static str,
    pub extra: Vec<ManifestExtra>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestExtra {
    pub name: &'static str,
    pub options: Vec<&'static str>,
    pub is_required: bool,
}

pub fn manifest() -> Manifest {
    Manifest {
        id: "stremio-criterion",
        version: env!("CARGO_PKG_VERSION"),
        name: "Criterion Collection",
        description: "Lists Criterion Collection movies with metadata and posters.",
        resources: ["catalog", "meta"],
        types: ["movie"],
        id_prefixes: ["tt"],
        catalogs: vec![ManifestCatalog {
            kind: "movie",
            id: CATALOG_ID,
            name: "Criterion Collection",
            extra: vec![ManifestExtra {
                name: "sort",
                options: SortOrder::ALL.iter().map(|s| s.label()).collect(),
                is_required: false,
            }],
        }],
    }
}

/// A catalog entry as the add-on protocol expects it.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Meta {
    pub id: String,
    pub name: String,
    pub poster: String,
    pub background: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub description: String,
    pub release_info: String,
    pub runtime: String,
    pub genres: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub imdb_rating: Option<String>,
}

impl From<&MovieRecord> for Meta {
    fn from(record: &MovieRecord) -> Self {
        Self {
            id: record.slug(),
            name: record.title.clone(),
            poster: record.poster.clone(),
            background: record.poster.clone(),
            logo: record.external_id.as_deref().map(logo_url),
            kind: "movie",
            description: record.overview.clone().unwrap_or_else(|| DEFAULT_DESCRIPTION.to_string()),
            release_info: if record.year.is_empty() { UNKNOWN.to_string() } else { record.year.clone() },
            runtime: record.runtime.clone().unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            genres: record
                .genre
                .as_deref()
                .map(|g| g.split(',').map(str::trim).filter(|s| !s.is_empty()).map(str::to_string).collect())
                .unwrap_or_default(),
            imdb_rating: record
                .rating
                .as_deref()
                .and_then(|r| r.trim().parse::<f64>().ok())
                .map(|r| format!("{r:.1}")),
        }
    }
}

fn logo_url(imdb_id: &str) -> String {
    format!("https://images.metahub.space/logo/medium/{imdb_id}/img")
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum SortOrder {
    YearAscending,
    #[default]
    YearDescending,
    RatingAscending,
    RatingDescending,
    RuntimeAscending,
    RuntimeDescending,
}

impl SortOrder {
    pub const ALL: [SortOrder; 6] = [
        SortOrder::YearAscending,
        SortOrder::YearDescending,
        SortOrder::RatingAscending,
        SortOrder::RatingDescending,
        SortOrder::RuntimeAscending,
        SortOrder::RuntimeDescending,
    ];

    pub fn label(self) -> &'static str {
        match self {
            SortOrder::YearAscending => "Year Ascending",
            SortOrder::YearDescending => "Year Descending",
            SortOrder::RatingAscending => "Rating Ascending",
            SortOrder::RatingDescending => "Rating Descending",
            SortOrder::RuntimeAscending => "Runtime Ascending",
            SortOrder::RuntimeDescending => "Runtime Descending",
        }
    }

    /// Unknown labels fall back to newest first.
    pub fn from_label(label: &str) -> Self {
        Self::ALL.into_iter().find(|s| s.label() == label.trim()).unwrap_or_default()
    }
}

/// Records sorted for the catalog listing. Values that are not numeric sort
/// as zero; ties keep store order.
pub fn sorted_metas(records: &[MovieRecord], order: SortOrder) -> Vec<Meta> {
    let mut sorted: Vec<&MovieRecord> = records.iter().collect();
    let year = |r: &MovieRecord| leading_int(&r.year);
    let runtime = |r: &MovieRecord| r.runtime.as_deref().map(leading_int).unwrap_or(0);
    let rating = |r: &MovieRecord| {
        r.rating.as_deref().and_then(|s| s.trim().parse::<f64>().ok()).unwrap_or(0.0)
    };

    match order {
        SortOrder::YearAscending => sorted.sort_by_key(|r| year(*r)),
        SortOrder::YearDescending => sorted.sort_by_key(|r| std::cmp::Reverse(year(*r))),
        SortOrder::RuntimeAscending => sorted.sort_by_key(|r| runtime(*r)),
        SortOrder::RuntimeDescending => sorted.sort_by_key(|r| std::cmp::Reverse(runtime(*r))),
        SortOrder::RatingAscending => sorted.sort_by(|a, b| rating(*a).total_cmp(&rating(*b))),
        SortOrder::RatingDescending => sorted.sort_by(|a, b| rating(*b).total_cmp(&rating(*a))),
    }

    sorted.into_iter().map(Meta::from).collect()
}

/// First record whose title slug matches. Colliding slugs resolve to the
/// earliest stored record.
pub fn find_by_slug<'a>(records: &'a [MovieRecord], slug: &str) -> Option<&'a MovieRecord> {
    records.iter().find(|r| r.slug() == slug)
}

fn leading_int(s: &str) -> i64 {
    let digits: String = s.trim().chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(title: &str, year: &str, rating: Option<&str>, runtime: Option<&str>) -> MovieRecord {
        MovieRecord {
            external_id: Some(format!("tt{}", title.len())),
            title: title.to_string(),
            poster: format!("http://x/{title}.jpg"),
            year: year.to_string(),
            director: "Someone".to_string(),
            rating: rating.map(str::to_string),
            runtime: runtime.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn export_renders_placeholders() {
        let exported = ExportedMovie::from(&record("Ran", "1985", None, None));
        assert_eq!(exported.id, "tt3");
        assert_eq!(exported.overview, NO_OVERVIEW);
        assert_eq!(exported.imdb_rating, NOT_AVAILABLE);
        assert_eq!(exported.runtime, UNKNOWN);
        assert_eq!(exported.genre, UNKNOWN);
        assert!(exported.cast.is_empty());
    }

    #[test]
    fn meta_uses_slug_and_formats_rating() {
        let mut r = record("Seven Samurai", "1954", Some("8.6"), Some("207 min"));
        r.genre = Some("Action, Drama".to_string());
        let meta = Meta::from(&r);

        assert_eq!(meta.id, "seven-samurai");
        assert_eq!(meta.description, DEFAULT_DESCRIPTION);
        assert_eq!(meta.imdb_rating.as_deref(), Some("8.6"));
        assert_eq!(meta.genres, vec!["Action", "Drama"]);
        assert_eq!(meta.runtime, "207 min");
        assert_eq!(meta.background, meta.poster);
        assert_eq!(
            meta.logo.as_deref(),
            Some("https://images.metahub.space/logo/medium/tt13/img")
        );
    }

    #[test]
    fn meta_without_id_has_no_logo() {
        let r = MovieRecord { external_id: None, ..record("Ran", "1985", None, None) };
        let json = serde_json::to_value(Meta::from(&r)).unwrap();

        assert!(json.get("logo").is_none());
        assert_eq!(json["background"], "http://x/Ran.jpg");
    }

    #[test]
    fn sorts_by_requested_order() {
        let records = vec![
            record("A", "1960", Some("7.1"), Some("90 min")),
            record("B", "1985", Some("N/A"), Some("160 min")),
            record("C", "1954", Some("8.6"), None),
        ];
        let names = |order| {
            sorted_metas(&records, order).into_iter().map(|m| m.name).collect::<Vec<_>>()
        };

        assert_eq!(names(SortOrder::YearDescending), vec!["B", "A", "C"]);
        assert_eq!(names(SortOrder::YearAscending), vec!["C", "A", "B"]);
        assert_eq!(names(SortOrder::RatingDescending), vec!["C", "A", "B"]);
        assert_eq!(names(SortOrder::RuntimeAscending), vec!["C", "A", "B"]);
    }

    #[test]
    fn unknown_sort_label_defaults_to_newest_first() {
        assert_eq!(SortOrder::from_label("Rating Ascending"), SortOrder::RatingAscending);
        assert_eq!(SortOrder::from_label("bogus"), SortOrder::YearDescending);
    }

    #[test]
    fn slug_lookup_returns_first_collision() {
        let records = vec![record("Ran", "1985", None, None), record("RAN", "2001", None, None)];
        let found = find_by_slug(&records, "ran").unwrap();
        assert_eq!(found.year, "1985");
        assert!(find_by_slug(&records, "kagemusha").is_none());
    }
}
