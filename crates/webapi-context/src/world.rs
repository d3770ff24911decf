//! Cucumber world holding one [`WebApiContext`] per scenario.

use crate::config::ContextConfig;
use crate::context::WebApiContext;
use cucumber::World;
use tracing::debug;

#[derive(Debug, World)]
#[world(init = Self::from_env)]
pub struct ApiWorld {
    pub context: WebApiContext,
}

impl ApiWorld {
    /// Build from `WEBAPI_*` environment configuration.
    pub fn from_env() -> Result<Self, anyhow::Error> {
        let config = ContextConfig::from_env()?;
        debug!("Creating scenario context for {}", config.base_url);
        Self::from_config(&config)
    }

    pub fn from_config(config: &ContextConfig) -> Result<Self, anyhow::Error> {
        let context = WebApiContext::from_config(config)?;
        Ok(Self { context })
    }
}
