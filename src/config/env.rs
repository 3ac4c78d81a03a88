use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::debug;

use super::{ConfigProvider, ConfigRecord};
use crate::constants::PROFILE_ENV_VAR;
use crate::env::{Environment, ProcessEnv};
use crate::error::Result;
use crate::schema::CONFIG_ATTRIBUTES;

/// Configuration read from environment variables.
///
/// Lookups are not scoped by profile; the profile argument only labels the
/// returned record.
pub struct EnvConfigProvider {
    env: Arc<dyn Environment>,
}

impl EnvConfigProvider {
    pub fn new(env: Arc<dyn Environment>) -> Self {
        Self { env }
    }
}

impl Default for EnvConfigProvider {
    fn default() -> Self {
        Self::new(Arc::new(ProcessEnv))
    }
}

impl ConfigProvider for EnvConfigProvider {
    fn config(&self, profile: Option<&str>) -> Result<ConfigRecord> {
        let attributes: BTreeMap<String, String> = CONFIG_ATTRIBUTES
            .iter()
            .filter_map(|attr| {
                attr.from_env(self.env.as_ref())
                    .filter(|value| !value.is_empty())
                    .map(|value| (attr.key.to_string(), value))
            })
            .collect();
        debug!("Read {} attributes from environment", attributes.len());

        let profile = match profile {
            Some(name) => name.to_string(),
            None => self.env.var(PROFILE_ENV_VAR).unwrap_or_default(),
        };

        Ok(ConfigRecord::new(profile, attributes))
    }

    /// Profiles are not a concept of the environment.
    fn list_profiles(&self, _roles_only: bool) -> Vec<String> {
        Vec::new()
    }
}
