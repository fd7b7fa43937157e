use std::{num::NonZeroU32, sync::Arc};

use governor::{
    Quota, RateLimiter,
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
};
use serde::Deserialize;
use tracing::debug;

use crate::{error::AppResult, models::Enrichment, resolver::MetadataLookup};

/// OMDb writes this in place of any value it does not have.
const OMDB_MISSING: &str = "N/A";

pub struct OmdbClient {
    client: wreq::Client,
    api_key: String,
    base_url: String,
    limiter: Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>,
}

impl OmdbClient {
    pub fn new(client: wreq::Client, api_key: String, base_url: String, rps: u32) -> Self {
        let limiter = Arc::new(RateLimiter::direct(Quota::per_second(
            NonZeroU32::new(rps.max(1)).unwrap_or(NonZeroU32::MIN),
        )));
        Self { client, api_key, base_url, limiter }
    }

    pub async fn fetch_by_title(&self, title: &str, year: Option<&str>) -> AppResult<Option<Enrichment>> {
        self.limiter.until_ready().await;

        let params = query_params(&self.api_key, title, year);
        let resp: OmdbResponse = self
            .client
            .get(&self.base_url)
            .query(&params)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        if resp.response != "True" {
            debug!(title = %title, year = ?year, error = ?resp.error, "OMDb reported no match");
        }
        Ok(resp.into_enrichment())
    }
}

impl MetadataLookup for OmdbClient {
    async fn lookup(&self, title: &str, year: Option<&str>) -> AppResult<Option<Enrichment>> {
        self.fetch_by_title(title, year).await
    }
}

/// Only `t` and optional `y`. No `type` filter: some catalog entries are
/// typed as series by OMDb.
fn query_params<'a>(api_key: &'a str, title: &'a str, year: Option<&'a str>) -> Vec<(&'static str, &'a str)> {
    let mut params = vec![("apikey", api_key), ("t", title)];
    if let Some(year) = year {
        params.push(("y", year));
    }
    params
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct OmdbResponse {
    response: String,
    #[serde(rename = "imdbID")]
    imdb_id: Option<String>,
    plot: Option<String>,
    #[serde(rename = "imdbRating")]
    imdb_rating: Option<String>,
    runtime: Option<String>,
    genre: Option<String>,
    actors: Option<String>,
    poster: Option<String>,
    error: Option<String>,
}

impl OmdbResponse {
    fn into_enrichment(self) -> Option<Enrichment> {
        if self.response != "True" {
            return None;
        }
        let external_id = present(self.imdb_id)?;
        let cast = present(self.actors)
            .map(|actors| {
                actors
                    .split(',')
                    .map(str::trim)
                    .filter(|name| !name.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Some(Enrichment {
            external_id,
            overview: present(self.plot),
            rating: present(self.imdb_rating),
            runtime: present(self.runtime),
            genre: present(self.genre),
            cast,
            poster: present(self.poster),
        })
    }
}

fn present(value: Option<String>) -> Option<String> {
    value.and_then(|s| {
        let s = s.trim();
        (!s.is_empty() && s != OMDB_MISSING).then(|| s.to_string())
    })
}
