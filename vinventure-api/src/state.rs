use std::sync::Arc;

use vinventure_booking::AdmissionService;
use vinventure_catalog::CatalogRepository;
use vinventure_core::identity::IdentityResolver;
use vinventure_core::user::UserRepository;
use vinventure_store::app_config::BusinessRules;
use vinventure_store::{EventProducer, RedisClient};

#[derive(Clone)]
pub struct AuthTokenConfig {
    pub secret: String,
    pub expiration: u64,
}

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<dyn CatalogRepository>,
    pub users: Arc<dyn UserRepository>,
    pub identity: Arc<dyn IdentityResolver>,
    pub admission: Arc<AdmissionService>,
    pub redis: Arc<RedisClient>,
    pub kafka: Arc<EventProducer>,
    pub business_rules: BusinessRules,
    pub auth: AuthTokenConfig,
}
