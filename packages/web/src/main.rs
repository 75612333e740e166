use api::{AppState, AuthSettings};
use tracing_subscriber::EnvFilter;

const DEFAULT_ADDR: &str = "127.0.0.1:8080";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,api=debug")),
        )
        .init();

    let settings = match AuthSettings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            tracing::error!("Invalid auth configuration: {}", e);
            return Err(e.into());
        }
    };

    tracing::info!(
        api_url = %settings.api_url,
        google = settings.google.is_some(),
        github = settings.github.is_some(),
        "Auth settings loaded"
    );

    let state = AppState::new(settings)?;
    let router = api::app(state);

    let addr = std::env::var("APP_ADDR").unwrap_or_else(|_| DEFAULT_ADDR.to_string());
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, router.into_make_service()).await?;
    Ok(())
}
