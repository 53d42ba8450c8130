use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info, warn};

use granthika_api::{build_router, AppState, Ports};
use granthika_core::services::MailDispatcher;
use granthika_infrastructure::{
    create_pool, run_migrations, DisabledMailDispatcher, MemoryStore, PgAccountStore,
    PgIdentityRepository, PgLibraryRepository, PgSettingsRepository, SmtpMailDispatcher,
    TemplateEngine,
};
use granthika_shared::config::{AppConfig, DatabaseSettings, EmailSettings};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;
    let _log_guard = granthika_shared::telemetry::init_telemetry(&config.logging)?;

    info!("{} starting ({})", config.app.name, config.app.env);

    let ports = connect(&config.database).await?;
    let dispatcher = mail_dispatcher(&config.email)?;
    let state = AppState::new(ports, dispatcher, &config);

    let app = build_router(state, Duration::from_secs(config.app.request_timeout_seconds));

    // Bind address
    let host: std::net::IpAddr = config.app.host.parse()?;
    let addr = SocketAddr::from((host, config.app.port));
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn connect(settings: &DatabaseSettings) -> anyhow::Result<Ports> {
    if settings.is_memory() {
        warn!("Using the in-memory store; data is lost on restart");
        return Ok(Ports::from_store(Arc::new(MemoryStore::new())));
    }

    let pool = create_pool(settings).await?;
    info!("Database connection established");
    if settings.run_migrations {
        run_migrations(&pool).await?;
    }

    Ok(Ports {
        identities: Arc::new(PgIdentityRepository::new(pool.clone())),
        libraries: Arc::new(PgLibraryRepository::new(pool.clone())),
        settings: Arc::new(PgSettingsRepository::new(pool.clone())),
        accounts: Arc::new(PgAccountStore::new(pool)),
    })
}

fn mail_dispatcher(settings: &EmailSettings) -> anyhow::Result<Arc<dyn MailDispatcher>> {
    let templates = TemplateEngine::new()?;
    if !settings.enabled {
        info!("Email delivery disabled");
        return Ok(Arc::new(DisabledMailDispatcher::new(templates)));
    }
    Ok(Arc::new(SmtpMailDispatcher::new(settings, templates)?))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
