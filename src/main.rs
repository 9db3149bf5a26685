//! Video Server - serves pre-rendered video segments over HTTP.
//!
//! This binary parses configuration, sets up logging and runs the server.

use clap::Parser;
use std::process::ExitCode;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use video_server::{
    config::Config,
    server::{create_router, install_panic_hook, RouterConfig},
};

#[tokio::main]
async fn main() -> ExitCode {
    let config = Config::parse();

    init_logging(config.verbose);
    install_panic_hook();

    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    if !config.root.is_dir() {
        warn!(
            "Root directory {} does not exist yet; requests will return 404 until it does",
            config.root.display()
        );
    }

    let router_config = RouterConfig::new(config.root.clone()).with_tracing(!config.no_tracing);
    let router = create_router(router_config);

    let addr = config.bind_address();

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("failed to start server: {}", e);
            return ExitCode::FAILURE;
        }
    };

    info!("server starting on port {}", config.port);
    info!("  Serving {} at http://{}/video/", config.root.display(), addr);

    if let Err(e) = axum::serve(listener, router).await {
        error!("Server error: {}", e);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

/// Initialize the tracing/logging subsystem.
fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "video_server=debug,tower_http=debug"
    } else {
        "video_server=info,tower_http=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
