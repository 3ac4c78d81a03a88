use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::debug;

use super::{ConfigProvider, ConfigRecord};
use crate::constants::DEFAULT_PROFILE_NAME;
use crate::env::{Environment, ProcessEnv};
use crate::error::Result;
use crate::profile::ProfileNameResolver;
use crate::source::{FileKind, ProfileFile, Source};

/// Configuration read from an INI document laid out like `~/.aws/config`.
///
/// Profiles are looked up by bare name first, then as `profile <name>`.
pub struct IniConfigProvider {
    file: ProfileFile,
    names: ProfileNameResolver,
}

impl IniConfigProvider {
    pub fn new(file: ProfileFile, env: Arc<dyn Environment>) -> Self {
        Self {
            file,
            names: ProfileNameResolver::new(env),
        }
    }

    /// Load the config document from `source` using the process environment.
    pub async fn load(source: impl Into<Source>) -> Result<Self> {
        Self::load_with_env(source, Arc::new(ProcessEnv)).await
    }

    pub async fn load_with_env(
        source: impl Into<Source>,
        env: Arc<dyn Environment>,
    ) -> Result<Self> {
        let file = ProfileFile::load(source.into(), FileKind::Config, env.as_ref()).await?;
        Ok(Self::new(file, env))
    }

    pub fn file(&self) -> &ProfileFile {
        &self.file
    }
}

impl ConfigProvider for IniConfigProvider {
    fn config(&self, profile: Option<&str>) -> Result<ConfigRecord> {
        let name = match profile {
            Some(name) => self.names.resolve(Some(name)),
            None => DEFAULT_PROFILE_NAME.to_string(),
        };

        let section = self.file.profile(&name, true)?;
        let attributes: BTreeMap<String, String> = section
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        debug!(
            "Read {} attributes for profile '{}' from config file",
            attributes.len(),
            name
        );

        Ok(ConfigRecord::new(name, attributes))
    }

    fn list_profiles(&self, roles_only: bool) -> Vec<String> {
        self.file.list_profiles(roles_only)
    }
}
