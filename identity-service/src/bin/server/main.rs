use std::sync::Arc;

use auth::Clock;
use auth::SystemClock;
use auth::TokenCodec;
use identity_service::config::Config;
use identity_service::domain::account::ports::AuthServicePort;
use identity_service::domain::account::service::AuthService;
use identity_service::inbound::grpc::AuthGrpcService;
use identity_service::inbound::http::router::create_router;
use identity_service::outbound::email::KafkaEmailSender;
use identity_service::outbound::repositories::PostgresCredentialRepository;
use identity_service::outbound::repositories::PostgresPasswordResetRepository;
use identity_service::outbound::repositories::PostgresRefreshTokenRepository;
use identity_service::outbound::repositories::PostgresSubjectRepository;
use identity_service::proto::auth_service_server::AuthServiceServer;
use sqlx::postgres::PgPoolOptions;
use tonic::transport::Server;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "identity_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = "identity-service",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    let config = Config::load()?;

    tracing::info!(
        http_port = config.server.http_port,
        grpc_port = config.server.grpc_port,
        email_brokers = %config.email.brokers,
        email_topic = %config.email.topic,
        access_ttl_minutes = config.jwt.access_ttl_minutes,
        refresh_ttl_days = config.jwt.refresh_ttl_days,
        "Configuration loaded"
    );

    let pg_pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(&config.database.url)
        .await?;
    tracing::info!(
        max_connections = config.database.max_connections,
        database = "postgresql",
        "Database connection pool created"
    );

    sqlx::migrate!("./migrations").run(&pg_pool).await?;
    tracing::info!(database = "postgresql", "Database migrations completed");

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let codec = Arc::new(
        TokenCodec::new(config.jwt.secret.as_bytes(), clock.clone())
            .with_access_ttl(config.jwt.access_ttl())
            .with_refresh_ttl(config.jwt.refresh_ttl()),
    );

    let auth_service = Arc::new(
        AuthService::new(
            Arc::new(PostgresSubjectRepository::new(pg_pool.clone())),
            Arc::new(PostgresCredentialRepository::new(pg_pool.clone())),
            Arc::new(PostgresRefreshTokenRepository::new(pg_pool.clone())),
            Arc::new(PostgresPasswordResetRepository::new(pg_pool)),
            Arc::new(KafkaEmailSender::new(&config.email)?),
            codec,
            clock,
        )
        .with_reset_ttl(config.password_reset.ttl())
        .with_reset_link_base(config.password_reset.link_base_url.clone())
        .with_dispatch_timeout(config.email.dispatch_timeout()),
    );

    let prune_service = Arc::clone(&auth_service);
    let maintenance = config.maintenance.clone();
    let pruner = tokio::spawn(async move {
        let mut interval = tokio::time::interval(maintenance.prune_interval());
        loop {
            interval.tick().await;
            if let Err(e) = prune_service
                .prune_expired_tokens(maintenance.prune_grace())
                .await
            {
                tracing::error!(error = %e, "Failed to prune expired tokens");
            }
        }
    });

    let http_address = format!("0.0.0.0:{}", config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_address).await?;
    tracing::info!(
        address = %http_address,
        port = config.server.http_port,
        protocol = "http",
        "Http server listening"
    );

    let http_application = create_router(Arc::clone(&auth_service));
    let http_server =
        tokio::spawn(async move { axum::serve(http_listener, http_application).await });

    let grpc_address = format!("0.0.0.0:{}", config.server.grpc_port).parse()?;
    let grpc_service = AuthGrpcService::new(Arc::clone(&auth_service));
    tracing::info!(
        address = %grpc_address,
        port = config.server.grpc_port,
        protocol = "grpc",
        "gRpc server listening"
    );

    let grpc_server = tokio::spawn(async move {
        Server::builder()
            .add_service(AuthServiceServer::new(grpc_service))
            .serve(grpc_address)
            .await
    });

    let result = tokio::try_join!(http_server, grpc_server);
    pruner.abort();

    match result {
        Ok((_, _)) => tracing::info!("Servers exited successfully"),
        Err(e) => tracing::error!(error = %e, "Server error"),
    };

    Ok(())
}
