use std::sync::Arc;
use std::thread;

use anyhow::Context;
use dexcore_catalog::HttpCatalog;
use dexcore_config::Settings;
use dexd::{LookupService, ServiceHandle};

/// Starts the lookup service on its own thread with a current-thread runtime,
/// so every coordinator update happens on one logical thread.
pub(crate) fn spawn_lookup_worker(settings: &Settings) -> anyhow::Result<ServiceHandle> {
    let catalog = HttpCatalog::new(
        &settings.api_base_url,
        settings.request_timeout(),
        settings.index_limit,
    )
    .context("failed to build catalog client")?;

    let (service, handle) = LookupService::new(settings, Arc::new(catalog));

    thread::Builder::new()
        .name("dex-lookup".to_string())
        .spawn(move || {
            let runtime = match tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
            {
                Ok(runtime) => runtime,
                Err(err) => {
                    tracing::error!(error = %err, "failed to start lookup runtime");
                    return;
                }
            };

            let coordinator = runtime.block_on(service.run());
            tracing::debug!(?coordinator, "lookup worker exited");
        })
        .context("failed to spawn lookup worker thread")?;

    Ok(handle)
}
