use std::future::Future;

use tracing::{debug, warn};

use crate::{
    error::AppResult,
    models::{Enrichment, QueryTier, Resolution},
};

/// Tiers are tried in this order until one matches.
pub const TIERS: [QueryTier; 2] = [QueryTier::TitleAndYear, QueryTier::TitleOnly];

/// A metadata service that can match a film by title and optional year.
///
/// `Ok(None)` means the service answered and had no match. `Err` is a
/// transport or decoding failure; the resolver treats both the same way.
pub trait MetadataLookup {
    fn lookup(
        &self,
        title: &str,
        year: Option<&str>,
    ) -> impl Future<Output = AppResult<Option<Enrichment>>> + Send;
}

pub struct Resolver<L> {
    lookup: L,
}

impl<L: MetadataLookup> Resolver<L> {
    pub fn new(lookup: L) -> Self {
        Self { lookup }
    }

    /// Each tier is one call with no retry. A title without a usable year
    /// skips straight to the title-only tier.
    pub async fn resolve(&self, title: &str, year: Option<&str>) -> Resolution {
        if title.trim().is_empty() {
            return Resolution::Unresolved;
        }
        let year = year.map(str::trim).filter(|y| !y.is_empty());

        for tier in TIERS {
            let tier_year = match tier {
                QueryTier::TitleAndYear => match year {
                    Some(y) => Some(y),
                    None => {
                        debug!(title = %title, "no year, skipping title+year tier");
                        continue;
                    },
                },
                QueryTier::TitleOnly => None,
            };

            match self.lookup.lookup(title, tier_year).await {
                Ok(Some(enrichment)) => {
                    debug!(title = %title, tier = ?tier, external_id = %enrichment.external_id, "resolved");
                    return Resolution::Resolved { tier, enrichment };
                },
                Ok(None) => {
                    debug!(title = %title, tier = ?tier, "no match");
                },
                Err(err) => {
                    warn!(title = %title, tier = ?tier, error = %err, "lookup failed, treating as no match");
                },
            }
        }

        Resolution::Unresolved
    }
}


#[cfg(test)]
mod tests {
    use super::{
        testing::{ScriptedLookup, enrichment},
        *,
    };

    #[tokio::test]
    async fn first_tier_match_wins() {
        let lookup = ScriptedLookup::default()
            .matching("Seven Samurai", Some("1954"), enrichment("tt0047478"))
            .matching("Seven Samurai", None, enrichment("tt9999999"));
        let resolver = Resolver::new(&lookup);

        let resolution = resolver.resolve("Seven Samurai", Some("1954")).await;

        let Resolution::Resolved { tier, enrichment } = resolution else {
            panic!("expected a match");
        };
        assert_eq!(tier, QueryTier::TitleAndYear);
        assert_eq!(enrichment.external_id, "tt0047478");
        assert_eq!(lookup.calls().len(), 1);
    }

    #[tokio::test]
    async fn falls_back_to_title_only() {
        let lookup =
            ScriptedLookup::default().matching("Stalker", None, enrichment("tt0079944"));
        let resolver = Resolver::new(&lookup);

        let resolution = resolver.resolve("Stalker", Some("2017")).await;

        let Resolution::Resolved { tier, enrichment } = resolution else {
            panic!("expected a title-only match");
        };
        assert_eq!(tier, QueryTier::TitleOnly);
        assert_eq!(enrichment.external_id, "tt0079944");
        assert_eq!(
            lookup.calls(),
            vec![
                ("Stalker".to_string(), Some("2017".to_string())),
                ("Stalker".to_string(), None),
            ]
        );
    }

    #[tokio::test]
    async fn transport_failure_falls_through_without_retry() {
        let lookup = ScriptedLookup::default()
            .failing("Ran", Some("1985"), "connection reset")
            .matching("Ran", None, enrichment("tt0089881"));
        let resolver = Resolver::new(&lookup);

        let resolution = resolver.resolve("Ran", Some("1985")).await;

        assert!(matches!(resolution, Resolution::Resolved { tier: QueryTier::TitleOnly, .. }));
        assert_eq!(lookup.calls().len(), 2);
    }

    #[tokio::test]
    async fn both_tiers_missing_is_unresolved() {
        let lookup = ScriptedLookup::default().failing("Obscure Short", None, "timeout");
        let resolver = Resolver::new(&lookup);

        let resolution = resolver.resolve("Obscure Short", Some("1931")).await;

        assert_eq!(resolution, Resolution::Unresolved);
        assert_eq!(lookup.calls().len(), 2);
    }

    #[tokio::test]
    async fn missing_year_skips_first_tier() {
        let lookup =
            ScriptedLookup::default().matching("Playtime", None, enrichment("tt0062136"));
        let resolver = Resolver::new(&lookup);

        let resolution = resolver.resolve("Playtime", Some("  ")).await;

        assert!(matches!(resolution, Resolution::Resolved { tier: QueryTier::TitleOnly, .. }));
        assert_eq!(lookup.calls(), vec![("Playtime".to_string(), None)]);
    }

    #[tokio::test]
    async fn blank_title_never_queries() {
        let lookup = ScriptedLookup::default();
        let resolver = Resolver::new(&lookup);

        assert_eq!(resolver.resolve("  ", Some("1954")).await, Resolution::Unresolved);
        assert!(lookup.calls().is_empty());
    }
}
