use std::sync::Arc;

use inventory_service::config::Config;
use inventory_service::domain::user::ports::UserServicePort;
use inventory_service::domain::user::service::UserService;
use inventory_service::inbound::http::router::create_router;
use inventory_service::outbound::repositories::InMemoryUserRepository;
use inventory_service::outbound::repositories::PostgresUserRepository;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "inventory_service=debug,auth=info,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = "inventory-service",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    let (config, run_mode) = Config::load()?;
    let password_scheme = config.password.scheme()?;

    tracing::info!(
        run_mode = %run_mode,
        http_port = config.server.http_port,
        database_configured = config.database.url.is_some(),
        jwt_algorithm = %config.jwt.algorithm,
        access_token_expire_minutes = config.jwt.access_token_expire_minutes,
        password_scheme = %password_scheme,
        "Configuration loaded"
    );

    let authenticator = config.authenticator()?;

    let user_service: Arc<dyn UserServicePort> = match &config.database.url {
        Some(url) => {
            let pg_pool = PgPoolOptions::new()
                .max_connections(config.database.max_connections)
                .connect(url)
                .await?;
            tracing::info!(
                max_connections = config.database.max_connections,
                database = "postgresql",
                "Database connection pool created"
            );

            sqlx::migrate!("./migrations").run(&pg_pool).await?;
            tracing::info!(database = "postgresql", "Database migrations completed");

            let user_repository = Arc::new(PostgresUserRepository::new(pg_pool));
            Arc::new(UserService::new(user_repository, Arc::clone(&authenticator)))
        }
        None => {
            tracing::warn!("DATABASE__URL not set, users are kept in memory and lost on restart");
            let user_repository = Arc::new(InMemoryUserRepository::new());
            Arc::new(UserService::new(user_repository, Arc::clone(&authenticator)))
        }
    };

    let http_address = format!("0.0.0.0:{}", config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_address).await?;
    tracing::info!(
        address = %http_address,
        port = config.server.http_port,
        protocol = "http",
        "Http server listening"
    );

    let http_application = create_router(user_service, authenticator);
    axum::serve(http_listener, http_application).await?;

    tracing::info!("Server exited successfully");

    Ok(())
}
