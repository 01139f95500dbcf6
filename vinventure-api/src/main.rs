use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vinventure_api::identity::{DirectoryTokenResolver, FederatedTokenResolver};
use vinventure_api::state::AuthTokenConfig;
use vinventure_api::{app, AppState};
use vinventure_booking::repository::BookingRepository;
use vinventure_booking::{AdmissionConfig, AdmissionService};
use vinventure_catalog::CatalogRepository;
use vinventure_core::identity::IdentityResolver;
use vinventure_core::user::UserRepository;
use vinventure_store::{
    DbClient, EventProducer, PgBookingRepository, PgCatalogRepository, PgUserRepository,
    RedisClient,
};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "vinventure_api=debug,tower_http=debug,axum::rejection=trace".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = vinventure_store::app_config::Config::load().expect("Failed to load config");
    tracing::info!("Starting VinVenture API on port {}", config.server.port);

    // Postgres
    let db = DbClient::new(&config.database.url)
        .await
        .expect("Failed to connect to Postgres");
    db.migrate().await.expect("Failed to run migrations");

    // Operational overrides layered on the file-based defaults
    let business_rules = db
        .fetch_business_rules(config.business_rules.clone())
        .await
        .unwrap_or_else(|e| {
            tracing::warn!("Falling back to file-based business rules: {}", e);
            config.business_rules.clone()
        });

    // Redis Connection
    let redis = Arc::new(
        RedisClient::new(&config.redis.url)
            .await
            .expect("Failed to connect to Redis"),
    );

    // Kafka Connection
    let kafka = Arc::new(
        EventProducer::new(&config.kafka.brokers).expect("Failed to create Kafka producer"),
    );

    // Repositories
    let catalog: Arc<dyn CatalogRepository> = Arc::new(PgCatalogRepository::new(db.pool.clone()));
    let bookings: Arc<dyn BookingRepository> = Arc::new(PgBookingRepository::new(db.pool.clone()));
    let users: Arc<dyn UserRepository> = Arc::new(PgUserRepository::new(db.pool.clone()));

    // Identity backend is fixed at bootstrap; nothing downstream branches on it.
    let identity: Arc<dyn IdentityResolver> = match config.auth.provider.as_str() {
        "directory" => Arc::new(DirectoryTokenResolver::new(
            config.auth.jwt_secret.clone(),
            config.auth.directory_issuer.clone(),
        )),
        _ => Arc::new(FederatedTokenResolver::new(config.auth.jwt_secret.clone())),
    };
    tracing::info!("Identity backend: {}", config.auth.provider);

    let admission = Arc::new(AdmissionService::new(
        catalog.clone(),
        bookings,
        AdmissionConfig {
            timeout: Duration::from_millis(business_rules.admission_timeout_ms),
            default_page_limit: business_rules.default_page_limit,
            max_page_limit: business_rules.max_page_limit,
        },
    ));

    let app_state = AppState {
        catalog,
        users,
        identity,
        admission,
        redis,
        kafka,
        business_rules,
        auth: AuthTokenConfig {
            secret: config.auth.jwt_secret.clone(),
            expiration: config.auth.jwt_expiration_seconds,
        },
    };

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .unwrap();
}
