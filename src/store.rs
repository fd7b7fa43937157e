use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    sea_query::OnConflict,
};
use tracing::{debug, warn};

use crate::{
    entities::movie,
    error::AppResult,
    models::{MovieRecord, StoreOutcome},
};

/// Insert-or-skip store keyed by IMDb id. Stored rows are never updated.
#[derive(Clone)]
pub struct CatalogStore {
    db: DatabaseConnection,
}

impl CatalogStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn find_by_external_id(&self, external_id: &str) -> AppResult<Option<MovieRecord>> {
        let row = movie::Entity::find()
            .filter(movie::Column::ImdbId.eq(external_id))
            .one(&self.db)
            .await?;
        Ok(row.map(MovieRecord::from))
    }

    /// All stored records in insertion order.
    pub async fn all(&self) -> AppResult<Vec<MovieRecord>> {
        let rows = movie::Entity::find().order_by_asc(movie::Column::Id).all(&self.db).await?;
        Ok(rows.into_iter().map(MovieRecord::from).collect())
    }

    /// Persist `candidate` unless it is incomplete or its id is already
    /// stored. Each insert commits on its own.
    pub async fn insert_if_absent(&self, candidate: &MovieRecord) -> AppResult<StoreOutcome> {
        let missing = candidate.missing_fields();
        let external_id = match candidate.external_id.as_deref() {
            Some(id) if missing.is_empty() => id.trim(),
            _ => {
                warn!(title = %candidate.title, missing = ?missing, "skipped: missing data");
                return Ok(StoreOutcome::MissingData);
            },
        };

        if self.find_by_external_id(external_id).await?.is_some() {
            debug!(external_id = %external_id, title = %candidate.title, "already stored, skipping");
            return Ok(StoreOutcome::Duplicate);
        }

        let cast_json = if candidate.cast.is_empty() {
            None
        } else {
            Some(serde_json::to_string(&candidate.cast)?)
        };

        let model = movie::ActiveModel {
            id: Default::default(),
            imdb_id: Set(external_id.to_string()),
            title: Set(candidate.title.clone()),
            poster: Set(candidate.poster.clone()),
            year: Set(candidate.year.clone()),
            director: Set(candidate.director.clone()),
            country: Set(candidate.country.clone()),
            overview: Set(candidate.overview.clone()),
            rating: Set(candidate.rating.clone()),
            runtime: Set(candidate.runtime.clone()),
            genre: Set(candidate.genre.clone()),
            cast_json: Set(cast_json),
            created_at: Set(jiff::Timestamp::now().as_second()),
        };

        // The unique index turns a racing duplicate into a no-op as well.
        let inserted = movie::Entity::insert(model)
            .on_conflict(OnConflict::column(movie::Column::ImdbId).do_nothing().to_owned())
            .exec_without_returning(&self.db)
            .await?;

        if inserted == 0 {
            debug!(external_id = %external_id, "insert raced with an existing row");
            return Ok(StoreOutcome::Duplicate);
        }

        debug!(external_id = %external_id, title = %candidate.title, "stored");
        Ok(StoreOutcome::Inserted)
    }
}

impl From<movie::Model> for MovieRecord {
    fn from(row: movie::Model) -> Self {
        let cast = row
            .cast_json
            .as_deref()
            .and_then(|json| serde_json::from_str(json).ok())
            .unwrap_or_default();

        Self {
            external_id: Some(row.imdb_id),
            title: row.title,
            poster: row.poster,
            year: row.year,
            director: row.director,
            country: row.country,
            overview: row.overview,
            rating: row.rating,
            runtime: row.runtime,
            genre: row.genre,
            cast,
        }
    }
}
