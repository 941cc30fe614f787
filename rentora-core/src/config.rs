// rentora-core/src/config.rs

use rentora_common::error::Error;

use crate::services::property_service::DEFAULT_LISTING_REWARD;

/// Runtime configuration, loaded from the environment (a `.env` file is
/// honoured when present).
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub broker_listing_reward: i64,
}

impl Config {
    pub fn from_env() -> Result<Self, Error> {
        dotenv::dotenv().ok();

        let database_url = std::env::var("DATABASE_URL")
            .map_err(|_| Error::Parse("DATABASE_URL is not set".to_string()))?;

        let broker_listing_reward = std::env::var("BROKER_LISTING_REWARD")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_LISTING_REWARD);

        Ok(Self {
            database_url,
            broker_listing_reward,
        })
    }
}
