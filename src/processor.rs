use futures::{StreamExt, stream};
use tracing::{debug, info, warn};

use crate::{
    error::AppResult,
    merge::merge,
    models::{QueryTier, Resolution, RunReport, StoreOutcome, UnresolvedEntry},
    normalize::{NormalizeOptions, normalize},
    resolver::{MetadataLookup, Resolver},
    scraper::Listing,
    store::CatalogStore,
};

#[derive(Clone, Copy, Debug)]
pub struct PipelineOptions {
    pub normalize: NormalizeOptions,
    pub max_concurrent: usize,
}

#[derive(Debug, Default)]
pub struct RunOutput {
    pub report: RunReport,
    pub unresolved: Vec<UnresolvedEntry>,
}

/// Normalize, resolve, merge and store every extracted row.
///
/// Lookups run up to `max_concurrent` at a time but results come back in
/// listing order, and candidates are written one at a time in that order.
/// Per-row failures are logged and counted; only an empty listing is fatal.
pub async fn process<L: MetadataLookup>(
    listing: Listing,
    resolver: &Resolver<L>,
    store: &CatalogStore,
    opts: PipelineOptions,
) -> AppResult<RunOutput> {
    let mut out = RunOutput::default();
    out.report.extracted = listing.rows.len();
    out.report.extraction_gaps = listing.gaps;

    if listing.rows.is_empty() {
        return Err(anyhow::anyhow!(
            "listing produced no rows ({} dropped as incomplete)",
            listing.gaps
        )
        .into());
    }

    debug!(rows = listing.rows.len(), "resolving rows");

    let resolved: Vec<_> = stream::iter(listing.rows)
        .map(|raw| async move {
            let row = normalize(&raw, opts.normalize);
            let resolution = resolver.resolve(&row.title, Some(row.year.as_str())).await;
            (row, resolution)
        })
        .buffered(opts.max_concurrent.max(1))
        .collect()
        .await;

    for (row, resolution) in resolved {
        match &resolution {
            Resolution::Resolved { tier: QueryTier::TitleAndYear, .. } => {
                out.report.resolved_title_and_year += 1
            },
            Resolution::Resolved { tier: QueryTier::TitleOnly, .. } => {
                out.report.resolved_title_only += 1
            },
            Resolution::Unresolved => out.report.unresolved += 1,
        }

        let (candidate, unresolved) = merge(row, resolution);
        if let Some(entry) = unresolved {
            debug!(title = %entry.title, year = %entry.year, "unresolved");
            out.unresolved.push(entry);
        }

        match store.insert_if_absent(&candidate).await {
            Ok(StoreOutcome::Inserted) => out.report.inserted += 1,
            Ok(StoreOutcome::Duplicate) => out.report.duplicates += 1,
            Ok(StoreOutcome::MissingData) => out.report.missing_data += 1,
            Err(err) => {
                warn!(title = %candidate.title, error = %err, "failed to store candidate");
                out.report.failed_writes += 1;
            },
        }
    }

    info!(
        extracted = out.report.extracted,
        gaps = out.report.extraction_gaps,
        unresolved = out.report.unresolved,
        inserted = out.report.inserted,
        duplicates = out.report.duplicates,
        missing_data = out.report.missing_data,
        failed_writes = out.report.failed_writes,
        "pipeline run complete"
    );

    Ok(out)
}
