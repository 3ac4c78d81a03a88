use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::Result;
use crate::schema::{
    CA_BUNDLE, CREDENTIAL_SOURCE, DURATION_SECONDS, EXTERNAL_ID, MFA_SERIAL, REGION, ROLE_ARN,
    ROLE_SESSION_NAME, SOURCE_PROFILE, parse_seconds,
};

pub mod env;
pub mod file;

pub use env::EnvConfigProvider;
pub use file::IniConfigProvider;

/// Resolved configuration for one profile.
///
/// The typed fields are always derived from `attributes`, which holds every
/// key the source supplied, including ones this crate does not interpret.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConfigRecord {
    #[serde(skip_serializing_if = "String::is_empty")]
    profile: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    region: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    role_arn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    role_session_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    external_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    mfa_serial: Option<String>,
    duration_seconds: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    credential_source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ca_bundle: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    source_profile: Option<String>,
    attributes: BTreeMap<String, String>,
}

impl ConfigRecord {
    pub fn new(profile: impl Into<String>, attributes: BTreeMap<String, String>) -> Self {
        let lookup = |key: &str| {
            attributes
                .get(key)
                .filter(|value| !value.is_empty())
                .cloned()
        };

        Self {
            profile: profile.into(),
            region: lookup(REGION),
            role_arn: lookup(ROLE_ARN),
            role_session_name: lookup(ROLE_SESSION_NAME),
            external_id: lookup(EXTERNAL_ID),
            mfa_serial: lookup(MFA_SERIAL),
            duration_seconds: attributes
                .get(DURATION_SECONDS)
                .map_or(0, |value| parse_seconds(value)),
            credential_source: lookup(CREDENTIAL_SOURCE),
            ca_bundle: lookup(CA_BUNDLE),
            source_profile: lookup(SOURCE_PROFILE),
            attributes,
        }
    }

    /// Name of the profile this record was produced for. Empty when unknown.
    pub fn profile(&self) -> &str {
        &self.profile
    }

    pub fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }

    pub fn role_arn(&self) -> Option<&str> {
        self.role_arn.as_deref()
    }

    pub fn role_session_name(&self) -> Option<&str> {
        self.role_session_name.as_deref()
    }

    pub fn external_id(&self) -> Option<&str> {
        self.external_id.as_deref()
    }

    pub fn mfa_serial(&self) -> Option<&str> {
        self.mfa_serial.as_deref()
    }

    /// Zero when unset or not an integer.
    pub fn duration_seconds(&self) -> i64 {
        self.duration_seconds
    }

    pub fn credential_source(&self) -> Option<&str> {
        self.credential_source.as_deref()
    }

    pub fn ca_bundle(&self) -> Option<&str> {
        self.ca_bundle.as_deref()
    }

    pub fn source_profile(&self) -> Option<&str> {
        self.source_profile.as_deref()
    }

    /// Raw value of any attribute, known or custom.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    pub fn attributes(&self) -> &BTreeMap<String, String> {
        &self.attributes
    }
}

/// A source of per-profile configuration.
pub trait ConfigProvider {
    /// Configuration for `profile`, or for the default profile when `None`.
    fn config(&self, profile: Option<&str>) -> Result<ConfigRecord>;

    /// Profile names known to the source, sorted.
    fn list_profiles(&self, roles_only: bool) -> Vec<String>;
}

impl<P: ConfigProvider + ?Sized> ConfigProvider for Box<P> {
    fn config(&self, profile: Option<&str>) -> Result<ConfigRecord> {
        (**self).config(profile)
    }

    fn list_profiles(&self, roles_only: bool) -> Vec<String> {
        (**self).list_profiles(roles_only)
    }
}
