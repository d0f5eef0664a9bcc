use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cinda_api::{
    config::Config,
    db::Catalogue,
    routes::{create_router, AppState},
    services::prose::HttpProseGenerator,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cinda_api=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    // A missing or invalid catalogue keeps the server up; /analyze reports it as a 500
    let catalogue = Catalogue::load(&config.catalogue_path).unwrap_or_else(|e| {
        tracing::error!(
            path = %config.catalogue_path,
            error = %e,
            "Failed to load catalogue, serving with an empty one"
        );
        Catalogue::empty()
    });

    let mut state = AppState::new(catalogue);
    match &config.prose_api_url {
        Some(url) => {
            tracing::info!(url = %url, "Prose generation enabled");
            let generator = HttpProseGenerator::new(url.clone(), config.prose_api_key.clone());
            state = state.with_prose(Arc::new(generator), config.prose_timeout());
        }
        None => tracing::info!("PROSE_API_URL not set, using template prose"),
    }

    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_address()).await?;
    tracing::info!(address = %config.bind_address(), "Server listening");
    axum::serve(listener, app).await?;

    Ok(())
}
