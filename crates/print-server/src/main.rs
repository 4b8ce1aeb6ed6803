use std::sync::Arc;

use eyre::WrapErr;
use print_render::chrome::BrowserEngine;
use print_server::config::ServiceConfig;
use print_server::pipeline::PrintService;
use print_server::state::AppState;
use print_storage::client::build_client;
use print_storage::publisher::AzureBlobPublisher;
use print_template::processor::TemplateProcessor;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let config = ServiceConfig::from_env()?;
    init_tracing(config.is_production());
    tracing::info!(?config, "starting print service");

    tokio::fs::create_dir_all(&config.work_dir)
        .await
        .wrap_err_with(|| format!("creating work dir {}", config.work_dir.display()))?;

    let http = reqwest::Client::new();
    let blob_client = build_client(
        http.clone(),
        &config.account_name,
        &config.account_key,
        config.blob_endpoint.as_deref(),
    )?;

    let engine = Arc::new(BrowserEngine::launch(config.launch_options()).await?);

    let mut templates = TemplateProcessor::new(http, config.work_dir.clone());
    if let Some(root) = &config.template_root {
        templates = templates.with_template_root(root.clone());
    }

    let print = PrintService::new(
        templates,
        engine.clone(),
        Arc::new(AzureBlobPublisher::new(blob_client)),
        config.storage_defaults(),
    );
    let app = print_server::router(
        AppState::new(Arc::new(print)).with_body_limit(config.max_body_bytes),
    );

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port))
        .await
        .wrap_err_with(|| format!("binding port {}", config.port))?;
    tracing::info!(port = config.port, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    engine.shutdown().await;
    Ok(())
}

/// JSON logs in production, human-readable otherwise. `RUST_LOG` wins over
/// the `info` default.
fn init_tracing(production: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if production {
        builder.json().init();
    } else {
        builder.compact().init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}
