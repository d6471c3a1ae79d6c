use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{App, HttpServer};
use anyhow::Context;
use tracing_actix_web::TracingLogger;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use quickbill::config::{Config, DatabaseConfig};
use quickbill::core::{Clock, SystemClock};
use quickbill::middleware::{BearerAuth, RequestId, StaticAuthenticator};
use quickbill::AppState;

fn init_tracing(log_format: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "quickbill=debug,actix_web=info".into());

    if log_format == "json" {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;
    init_tracing(&config.app.log_format);
    config.validate().context("Invalid configuration")?;

    tracing::info!(
        env = %config.app.env,
        storage = %config.app.storage,
        "Starting QuickBill"
    );

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let state = if config.app.storage == "memory" {
        // Local runs authenticate with a single static token
        let mut authenticator = StaticAuthenticator::new();
        if let Ok(token) = std::env::var("DEV_API_TOKEN") {
            let user_id = std::env::var("DEV_USER_ID").unwrap_or_else(|_| "dev-user".to_string());
            authenticator = authenticator.with_token(token, user_id);
        }

        tracing::warn!("Using in-memory storage; data is lost on restart");
        AppState::in_memory(
            clock,
            config.invoice_defaults(),
            config.invoicing.guest_draft_ttl_days,
            Arc::new(authenticator),
        )
    } else {
        let pool = config
            .database
            .create_pool()
            .await
            .context("Failed to connect to database")?;
        tracing::info!(
            max_connections = config.database.max_connections,
            "Database pool initialized"
        );

        DatabaseConfig::migrate(&pool)
            .await
            .context("Failed to run migrations")?;
        tracing::info!("Database migrations applied");

        AppState::mysql(pool, clock, &config)
    };

    let bind_address = config.server.bind_address();
    let server = HttpServer::new(move || {
        let state = state.clone();

        App::new()
            .wrap(BearerAuth::new(state.authenticator.clone()))
            .wrap(RequestId)
            .wrap(Cors::permissive())
            .wrap(TracingLogger::default())
            .configure(|cfg| state.configure(cfg))
    })
    .bind(&bind_address)
    .with_context(|| format!("Failed to bind {}", bind_address))?
    .run();

    tracing::info!(address = %bind_address, "Server started");

    server.await?;
    Ok(())
}
