//! Merging a profile's configuration with its default and source profiles.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::config::{ConfigProvider, ConfigRecord, IniConfigProvider};
use crate::env::{Environment, ProcessEnv};
use crate::error::Result;
use crate::source::Source;

/// Value that never overrides an earlier record during a merge.
const ZERO_VALUE: &str = "0";

/// Builds the effective configuration for a profile.
///
/// Records are merged in the order default, source profile, target, so the
/// target's own attributes win. Only one `source_profile` hop is followed.
pub struct ConfigResolver {
    provider: Box<dyn ConfigProvider>,
    lookup_default_profile: bool,
    lookup_source_profile: bool,
}

impl ConfigResolver {
    /// A resolver over `provider` with default and source profile lookups
    /// enabled.
    pub fn new(provider: impl ConfigProvider + 'static) -> Self {
        Self {
            provider: Box::new(provider),
            lookup_default_profile: true,
            lookup_source_profile: true,
        }
    }

    /// A resolver over the INI config document at `source`.
    pub async fn load(source: impl Into<Source>) -> Result<Self> {
        Self::load_with_env(source, Arc::new(ProcessEnv)).await
    }

    pub async fn load_with_env(
        source: impl Into<Source>,
        env: Arc<dyn Environment>,
    ) -> Result<Self> {
        Ok(Self::new(IniConfigProvider::load_with_env(source, env).await?))
    }

    pub fn with_lookup_default_profile(mut self, enabled: bool) -> Self {
        self.lookup_default_profile = enabled;
        self
    }

    pub fn with_lookup_source_profile(mut self, enabled: bool) -> Self {
        self.lookup_source_profile = enabled;
        self
    }

    pub fn with_config_provider(mut self, provider: impl ConfigProvider + 'static) -> Self {
        self.provider = Box::new(provider);
        self
    }

    pub fn provider(&self) -> &dyn ConfigProvider {
        self.provider.as_ref()
    }

    /// Resolve `profile`. Without a profile the default profile's record is
    /// returned as-is.
    pub fn resolve(&self, profile: Option<&str>) -> Result<ConfigRecord> {
        let Some(profile) = profile else {
            return self.provider.config(None);
        };

        let target = self.provider.config(Some(profile))?;
        let mut records = Vec::with_capacity(3);

        if self.lookup_default_profile {
            records.push(self.provider.config(None)?);
        }

        if self.lookup_source_profile {
            if let Some(source) = target.source_profile() {
                debug!("Profile '{}' uses source profile '{}'", profile, source);
                records.push(self.provider.config(Some(source))?);
            }
        }

        records.push(target);
        Ok(merge(&records))
    }
}

/// Merge records, later ones taking precedence per attribute.
///
/// Empty values and the literal `"0"` never override, so a zero duration
/// cannot be expressed through a merge. The last non-empty profile name wins.
pub fn merge<'a, I>(records: I) -> ConfigRecord
where
    I: IntoIterator<Item = &'a ConfigRecord>,
{
    let mut attributes = BTreeMap::new();
    let mut profile = "";

    for record in records {
        for (key, value) in record.attributes() {
            if !value.is_empty() && value != ZERO_VALUE {
                trace!("Merging attribute '{}' from profile '{}'", key, record.profile());
                attributes.insert(key.clone(), value.clone());
            }
        }

        if !record.profile().is_empty() {
            profile = record.profile();
        }
    }

    ConfigRecord::new(profile, attributes)
}
