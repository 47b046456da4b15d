use balcao_server::api;
use balcao_server::config::Config;
use balcao_server::state::AppState;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    // Load .env file
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "balcao_server=info,tower_http=info".into()),
        )
        .init();

    let config = Config::from_env()?;

    tracing::info!("Starting balcao-server (env: {})", config.environment);

    let state = AppState::new(&config);
    let app = api::create_router(state);

    // Loopback only: this bridge serves the desktop shell on the same machine
    let addr = format!("127.0.0.1:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("balcao-server listening on http://{addr}");

    axum::serve(listener, app).await?;

    Ok(())
}
