use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::Mutex;

use audiotour_rs::cache::{CachingFetcher, Gateway};
use audiotour_rs::controller::TourController;
use audiotour_rs::fetch::{Fetcher, NetworkFetcher};
use audiotour_rs::media::MediaRegistry;
use audiotour_rs::model::{AppModel, SectionedTours, WordPressClient};
use audiotour_rs::logging;

#[tokio::main]
async fn main() -> Result<()> {
    if let Err(e) = logging::init_logging() {
        eprintln!("Warning: Failed to initialize logging: {}", e);
    }

    tracing::info!("=== Audio Tour Starting ===");

    let api_base = std::env::var("WORDPRESS_API_URL")
        .context("WORDPRESS_API_URL is not set (e.g. https://cms.example.org/wp-json/wp/v2)")?;
    let app_origin =
        std::env::var("APP_ORIGIN").unwrap_or_else(|_| "http://localhost:5173".to_string());

    // Every request goes through the gateway; the caching fetcher is the
    // installed handler, the bare network client its upstream.
    let network: Arc<dyn Fetcher> = Arc::new(NetworkFetcher::new());
    let gateway = Gateway::new(network.clone());
    let caching = Arc::new(CachingFetcher::new(network, app_origin));
    gateway
        .install(env!("CARGO_PKG_VERSION"), caching, || {
            tracing::info!("Cache layer superseded, host reload requested");
        })
        .await;
    let fetcher: Arc<dyn Fetcher> = Arc::new(gateway);

    let client = WordPressClient::new(fetcher.clone(), api_base);
    let model = Arc::new(Mutex::new(AppModel::new()));
    let (media, events) = MediaRegistry::new();

    let controller = TourController::new(model.clone(), media, fetcher);
    controller.start_media_event_listener(events);

    model.lock().await.set_loading(true).await;
    let tours = match client.fetch_audio_tours().await {
        Ok(tours) => {
            tracing::info!(count = tours.len(), "Audio tours loaded");
            tours
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to load audio tours");
            let guard = model.lock().await;
            guard.set_error(format!("Error: {}", e)).await;
            guard.set_loading(false).await;
            return Err(e);
        }
    };

    // Warm the media cache before the first playback request, the same
    // sweep the page runs right after the data arrives.
    client.preload_media(&tours).await;

    {
        let guard = model.lock().await;
        guard.set_tours(tours.clone()).await;
        guard.set_loading(false).await;
    }

    let grouped = SectionedTours::group(&tours);
    for (section, items) in grouped.iter() {
        tracing::info!(section = section.label(), items = items.len(), "Section ready");
    }
    let queue = grouped.build_queue();
    tracing::info!(
        steps = queue.len(),
        "Play queue ready; waiting for the rendering layer to register media elements"
    );

    Ok(())
}
