use sqlx::PgPool;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::database::DatabaseManager;
use crate::services::{mailer, Geocoder, MapQuestGeocoder, Mailer};

/// Everything a handler can reach: immutable config, the pool and the two outside collaborators
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub pool: PgPool,
    pub geocoder: Arc<dyn Geocoder>,
    pub mailer: Arc<dyn Mailer>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        pool: PgPool,
        geocoder: Arc<dyn Geocoder>,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            pool,
            geocoder,
            mailer,
        }
    }

    /// Connect, migrate and wire the production collaborators.
    pub async fn connect(config: AppConfig) -> anyhow::Result<Self> {
        let pool = DatabaseManager::connect(&config.database).await?;
        DatabaseManager::migrate(&pool).await?;
        let geocoder = Arc::new(MapQuestGeocoder::new(&config.geocoder)?);
        let mailer = mailer::from_config(&config.mail)?;
        if config.geocoder.api_key.is_none() {
            tracing::warn!("GEOCODER_API_KEY is not set; bootcamp creation and radius search will fail");
        }
        Ok(Self::new(config, pool, geocoder, mailer))
    }
}
