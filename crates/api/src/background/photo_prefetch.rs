//! One-shot photo cache warm-up at startup.
//!
//! Walks the catalog serially so the Places API sees one request at a time,
//! and stops early when the server begins shutting down.

use std::sync::Arc;

use familygems_core::catalog::Catalog;
use familygems_upstream::photos::{PhotoService, PrefetchReport};
use tokio_util::sync::CancellationToken;

/// Run one prefetch pass over the whole catalog.
pub async fn run(
    photos: Arc<PhotoService>,
    catalog: Arc<Catalog>,
    cancel: CancellationToken,
) -> PrefetchReport {
    tracing::info!(locations = catalog.len(), "Photo prefetch job started");

    let report = photos.prefetch_all(catalog.locations(), &cancel).await;

    if report.cancelled {
        tracing::info!("Photo prefetch job stopped by shutdown");
    }
    report
}
