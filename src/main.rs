use hurricane_predictor::{bootstrap, router, AppConfig, StartupError};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cfg = AppConfig::from_env();

    let state = match bootstrap(&cfg) {
        Ok(s) => s,
        Err(e @ StartupError::ModelMissing(_)) => {
            tracing::error!("{}", e);
            return Err(e.into());
        }
        Err(e) => return Err(anyhow::Error::new(e).context("startup failed")),
    };

    let app = router(state);

    let addr = cfg.bind_addr()?;
    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
