//! RustPresence binary entry point

use std::sync::Arc;

use rustpresence::error::AppError;
use rustpresence::{AppState, assets, config, metrics, ops, platform, presence, publisher};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        // Tracing may not be initialized yet when settings fail to load;
        // the diagnostic must still reach the operator.
        eprintln!("rustpresence: {error}");
        std::process::exit(1);
    }
}

/// Daemon entry point
///
/// # Setup
/// 1. Load daemon settings
/// 2. Initialize tracing/logging
/// 3. Initialize metrics
/// 4. Load the presence document and resolve the token
/// 5. Log in to the platform
/// 6. Start the ops listener (optional)
/// 7. Run the publisher until Ctrl-C
async fn run() -> Result<(), AppError> {
    // 1. Load daemon settings (before tracing: the log format comes from them)
    let settings = config::Settings::load()?;

    // 2. Initialize tracing/logging
    init_tracing(&settings.logging);
    tracing::info!("Starting RustPresence...");

    // 3. Initialize metrics
    metrics::init_metrics();

    // 4. Load the presence document and resolve the token
    let document = config::PresenceDocument::load(&settings.presence)?;
    let env_token = std::env::var(config::TOKEN_ENV_VAR).ok();
    let token = document.resolve_token(env_token.as_deref())?;

    // 5. Initialize shared state and log in
    let state = AppState::new(settings)?;
    let session = platform::PlatformSession::login(
        state.http_client.clone(),
        &state.settings.platform,
        &token,
    )
    .await?;
    tracing::info!(
        username = %session.user().username,
        "Authenticated with the platform"
    );

    // 6. Start the ops listener
    if state.settings.ops.enabled {
        ops::spawn(&state.settings.ops).await?;
    }

    // 7. Run the publisher until Ctrl-C fires the token
    let cancel = CancellationToken::new();
    spawn_shutdown_watcher(cancel.clone());

    let resolver = platform::HttpAssetResolver::new(
        state.http_client.clone(),
        &state.settings.platform,
        &token,
    );
    let mapper = assets::AssetMapper::new(Arc::new(resolver), state.asset_cache.clone());
    let mut publisher = publisher::PresencePublisher::new(
        Arc::new(session),
        mapper,
        document.rpc,
        presence::PresenceDefaults::builtin(),
        state.settings.presence.refresh_interval(),
    );

    publisher.run(cancel).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

/// Fire the cancellation token when the process receives Ctrl-C
fn spawn_shutdown_watcher(cancel: CancellationToken) {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::info!("Shutdown signal received");
                cancel.cancel();
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for shutdown signal");
            }
        }
    });
}

fn init_tracing(logging: &config::LoggingSettings) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!(
            "rustpresence={},tower_http=debug",
            logging.level
        ))
    });

    if logging.format == "json" {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }
}
