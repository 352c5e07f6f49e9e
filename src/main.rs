use std::net::SocketAddr;

use anyhow::Context;
use mimalloc::MiMalloc;
use smartclinic::config::AppConfig;
use smartclinic::{db, routes, AppState};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "smartclinic=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    let config = AppConfig::from_env().context("Failed to load configuration")?;

    let pool = db::create_pool(&config.database_url, config.database_max_connections)
        .await
        .context("Failed to connect to database")?;
    db::run_migrations(&pool)
        .await
        .context("Failed to run migrations")?;

    let redis = redis::Client::open(config.redis_url.as_str()).context("Invalid REDIS_URL")?;

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("Invalid BACKEND_HOST/BACKEND_PORT")?;
    let tls_paths = config
        .tls_paths()
        .map(|(cert, key)| (cert.to_string(), key.to_string()));

    let state = AppState {
        db: pool,
        redis,
        config,
    };
    let app = routes::build_router(state);

    match tls_paths {
        Some((cert, key)) => {
            if rustls::crypto::aws_lc_rs::default_provider()
                .install_default()
                .is_err()
            {
                tracing::debug!("rustls crypto provider already installed, keeping it");
            }
            let tls = axum_server::tls_rustls::RustlsConfig::from_pem_file(&cert, &key)
                .await
                .context("Failed to load TLS certificate or key")?;
            tracing::info!(host = %addr, tls = true, "Starting SmartClinic API server");
            axum_server::bind_rustls(addr, tls)
                .serve(app.into_make_service())
                .await?;
        }
        None => {
            tracing::info!(host = %addr, tls = false, "Starting SmartClinic API server");
            let listener = tokio::net::TcpListener::bind(addr).await?;
            axum::serve(listener, app).await?;
        }
    }

    Ok(())
}
