use std::sync::Arc;

use tracing::debug;

use super::{CredentialProvider, CredentialRecord};
use crate::env::{Environment, ProcessEnv};
use crate::error::Result;
use crate::schema::{ACCESS_KEY_ATTRIBUTE, SECRET_KEY_ATTRIBUTE, SESSION_TOKEN_ATTRIBUTE};

/// Credentials from `AWS_ACCESS_KEY_ID` / `AWS_SECRET_ACCESS_KEY` /
/// `AWS_SESSION_TOKEN` and their older aliases. The profile is ignored.
pub struct EnvCredentialProvider {
    env: Arc<dyn Environment>,
}

impl EnvCredentialProvider {
    pub fn new(env: Arc<dyn Environment>) -> Self {
        Self { env }
    }
}

impl Default for EnvCredentialProvider {
    fn default() -> Self {
        Self::new(Arc::new(ProcessEnv))
    }
}

impl CredentialProvider for EnvCredentialProvider {
    fn credentials(&self, _profile: Option<&str>) -> Result<CredentialRecord> {
        let env = self.env.as_ref();
        let mut record = CredentialRecord::new(
            ACCESS_KEY_ATTRIBUTE.from_env(env).unwrap_or_default(),
            SECRET_KEY_ATTRIBUTE.from_env(env).unwrap_or_default(),
        );
        if let Some(token) = SESSION_TOKEN_ATTRIBUTE.from_env(env) {
            record = record.with_session_token(token);
        }
        debug!("Read credentials from environment");

        record.into_complete()
    }
}
