//! API Server Entry Point
//!
//! Application entry point and server initialization.
//! Uses `anyhow` for startup errors, but application-level
//! errors should use `kernel::error::AppError`.

use std::env;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use access::domain::value_object::PinPolicy;
use access::{
    AccessConfig, AccessContext, FirebaseConfig, FirebaseIdentityProvider, PgAccessStore,
    ServiceAccount, access_router,
};
use anyhow::Context;
use axum::{
    Router, http,
    http::{Method, header},
};
use platform::clock::{Clock, SystemClock};
use platform::cookie::SameSite;
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// Re-export unified error types for use in handlers
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

const DEFAULT_PORT: u16 = 31113;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "api=info,access=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Database connection
    let database_url = env::var("DATABASE_URL").context("DATABASE_URL must be set in environment")?;

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(5))
        .connect(&database_url)
        .await?;

    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("../../../database/migrations")
        .run(&pool)
        .await?;

    tracing::info!("Migrations completed");

    let access_config = access_config()?;
    let store = PgAccessStore::new(pool.clone());

    // Startup cleanup: drop attempt counters that can no longer lock anyone
    // Errors here should not prevent server startup
    let cutoff = chrono::Utc::now() - access_config.lockout.failure_window;
    if let Err(e) = store.cleanup_stale_attempts(cutoff).await {
        tracing::warn!(
            error = %e,
            "Login attempt cleanup failed, continuing anyway"
        );
    }

    let identity = FirebaseIdentityProvider::new(firebase_config()?)?;
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let ctx = AccessContext::new(Arc::new(store), Arc::new(identity), clock, access_config);

    // CORS configuration
    let frontend_origins = env::var("FRONTEND_ORIGINS")
        .unwrap_or_else(|_| "http://localhost:40922,http://127.0.0.1:40922".to_string());

    let allowed_origins: Vec<http::HeaderValue> = frontend_origins
        .split(',')
        .filter_map(|origin| origin.trim().parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
        ]))
        .expose_headers([
            header::RETRY_AFTER,
            http::HeaderName::from_static("x-login-path"),
        ])
        .allow_credentials(true);

    // Build router
    let app = Router::new()
        .merge(access_router(ctx))
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server
    let port = env_parse("LISTEN_PORT")?.unwrap_or(DEFAULT_PORT);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

/// Access settings from the environment. Debug builds fall back to a
/// random session secret and insecure cookies.
fn access_config() -> anyhow::Result<AccessConfig> {
    let mut config = match env::var("SESSION_SECRET") {
        Ok(secret_b64) => AccessConfig {
            session_secret: platform::crypto::decode_key32(&secret_b64)
                .context("SESSION_SECRET must be 32 bytes, base64")?,
            ..AccessConfig::default()
        },
        Err(_) if cfg!(debug_assertions) => {
            tracing::warn!("SESSION_SECRET not set, using a random secret");
            AccessConfig::development()
        }
        Err(_) => anyhow::bail!("SESSION_SECRET must be set in production"),
    };

    config.pin_pepper = env::var("PIN_PEPPER")
        .ok()
        .filter(|p| !p.is_empty())
        .map(String::into_bytes);

    if let Ok(policy) = env::var("PIN_POLICY") {
        config.pin_policy = PinPolicy::parse(&policy)
            .with_context(|| format!("PIN_POLICY must be reusable or one_time (got {policy})"))?;
    }
    if let Ok(same_site) = env::var("COOKIE_SAME_SITE") {
        config.cookie_same_site = SameSite::parse(&same_site)
            .with_context(|| format!("Invalid COOKIE_SAME_SITE: {same_site}"))?;
    }
    if let Some(secure) = env_parse::<bool>("COOKIE_SECURE")? {
        config.cookie_secure = secure;
    }
    if let Some(threshold) = env_parse::<u32>("LOCKOUT_THRESHOLD")? {
        config.lockout.threshold = threshold;
    }
    if let Some(minutes) = env_parse::<i64>("LOCKOUT_MINUTES")? {
        config.lockout.lock_duration = chrono::Duration::minutes(minutes);
    }
    if let Some(hours) = env_parse::<u64>("PROVIDER_SESSION_HOURS")? {
        config.provider_session_ttl = Duration::from_secs(hours * 3600);
    }
    if let Some(minutes) = env_parse::<u64>("ADMIN_SESSION_MINUTES")? {
        config.admin_session_ttl = Duration::from_secs(minutes * 60);
    }
    if let Some(ms) = env_parse::<u64>("EXTERNAL_TIMEOUT_MS")? {
        config.external_timeout = Duration::from_millis(ms);
    }
    if let Some(len) = env_parse::<usize>("PIN_LENGTH")? {
        config.pin_length = len;
    }

    tracing::info!(config = ?config, "Access configuration loaded");
    Ok(config)
}

fn firebase_config() -> anyhow::Result<FirebaseConfig> {
    let project_id =
        env::var("FIREBASE_PROJECT_ID").context("FIREBASE_PROJECT_ID must be set in environment")?;

    let service_account = match (
        env::var("FIREBASE_SERVICE_ACCOUNT_EMAIL"),
        env::var("FIREBASE_SERVICE_ACCOUNT_KEY"),
    ) {
        (Ok(client_email), Ok(private_key)) => Some(ServiceAccount {
            client_email,
            private_key,
        }),
        _ => None,
    };

    Ok(FirebaseConfig {
        project_id,
        api_key: env::var("FIREBASE_API_KEY").unwrap_or_default(),
        service_account,
        emulator_host: env::var("FIREBASE_AUTH_EMULATOR_HOST")
            .ok()
            .filter(|h| !h.is_empty()),
        request_timeout: Duration::from_secs(5),
    })
}

/// Parse an optional environment variable.
fn env_parse<T>(name: &str) -> anyhow::Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .with_context(|| format!("Invalid {name}: {raw}")),
        Err(_) => Ok(None),
    }
}
