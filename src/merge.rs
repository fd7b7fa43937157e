use crate::models::{MovieRecord, NormalizedRow, Resolution, UnresolvedEntry};

/// Combine a normalized row with its resolution into one candidate.
///
/// Always returns a candidate; an unresolved row also yields an entry for the
/// side report. Enrichment values the service lacked stay `None` here and are
/// rendered as placeholders by [`crate::catalog`].
pub fn merge(row: NormalizedRow, resolution: Resolution) -> (MovieRecord, Option<UnresolvedEntry>) {
    match resolution {
        Resolution::Resolved { enrichment, .. } => {
            let poster = if row.poster.trim().is_empty() {
                enrichment.poster.unwrap_or_default()
            } else {
                row.poster
            };
            let record = MovieRecord {
                external_id: Some(enrichment.external_id),
                title: row.title,
                poster,
                year: row.year,
                director: row.director,
                country: row.country,
                overview: enrichment.overview,
                rating: enrichment.rating,
                runtime: enrichment.runtime,
                genre: enrichment.genre,
                cast: enrichment.cast,
            };
            (record, None)
        },
        Resolution::Unresolved => {
            let unresolved = UnresolvedEntry::from(&row);
            let record = MovieRecord {
                external_id: None,
                title: row.title,
                poster: row.poster,
                year: row.year,
                director: row.director,
                country: row.country,
                ..Default::default()
            };
            (record, Some(unresolved))
        },
    }
}
