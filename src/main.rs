use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Init logging
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap();
    fmt().with_env_filter(filter).init();

    // Startup banner at info level so something always prints at default verbosity
    let rust_log = std::env::var("RUST_LOG").unwrap_or_else(|_| "<unset>".to_string());
    let http_port = std::env::var("FRUITSTAND_HTTP_PORT").unwrap_or_else(|_| "8000".to_string());
    let keys_configured = std::env::var("FRUITSTAND_SESSION_KEYS").is_ok();
    info!(
        target: "fruitstand",
        "fruitstand starting: RUST_LOG='{}', http_port={}, session_keys={}",
        rust_log,
        http_port,
        if keys_configured { "configured" } else { "built-in dev keys" }
    );

    fruitstand::server::run().await
}
