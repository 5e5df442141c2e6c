use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;
use lighthouse_analyzer::{
    config::Config,
    api::routes::create_router,
    AppState,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("lighthouse_analyzer=info")),
        )
        .init();

    let config = Config::load()?;
    let server_addr = config.server_addr;
    info!(
        chrome = ?config.chrome_path,
        lighthouse = %config.lighthouse_path.display(),
        timeout = ?config.audit_timeout,
        development = config.development,
        "configuration loaded"
    );

    let app = create_router(AppState::from_config(config));

    let listener = TcpListener::bind(server_addr).await?;
    info!("Server is running on {}", server_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
