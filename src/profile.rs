use std::sync::Arc;

use tracing::trace;

use crate::constants::{
    DEFAULT_PROFILE_ENV_VAR, DEFAULT_PROFILE_NAME, PROFILE_ENV_VAR, PROFILE_SECTION_PREFIX,
};
use crate::env::Environment;

/// Picks the effective profile name when the caller may not have given one.
///
/// Order: explicit non-empty name, `AWS_PROFILE`, `AWS_DEFAULT_PROFILE`,
/// then the literal `default`.
#[derive(Clone)]
pub struct ProfileNameResolver {
    env: Arc<dyn Environment>,
}

impl ProfileNameResolver {
    pub fn new(env: Arc<dyn Environment>) -> Self {
        Self { env }
    }

    pub fn resolve(&self, explicit: Option<&str>) -> String {
        if let Some(name) = explicit.filter(|name| !name.is_empty()) {
            return name.to_string();
        }

        let (source, name) = self
            .env
            .first_of(&[PROFILE_ENV_VAR, DEFAULT_PROFILE_ENV_VAR])
            .unwrap_or_else(|| ("built-in default", DEFAULT_PROFILE_NAME.to_string()));
        trace!("Resolved profile name '{}' from {}", name, source);
        name
    }
}

/// Section name a profile uses in the shared config file.
pub fn config_section_name(profile: &str) -> String {
    if profile == DEFAULT_PROFILE_NAME {
        profile.to_string()
    } else {
        format!("{PROFILE_SECTION_PREFIX}{profile}")
    }
}

/// Logical profile name of a config or credentials file section.
pub fn profile_name_of_section(section: &str) -> &str {
    section
        .strip_prefix(PROFILE_SECTION_PREFIX)
        .unwrap_or(section)
}
