use std::sync::Arc;

use tracing::{debug, info};

use super::{CredentialInput, CredentialProvider, CredentialRecord};
use crate::env::{Environment, ProcessEnv};
use crate::error::Result;
use crate::profile::ProfileNameResolver;
use crate::schema::{ACCESS_KEY_ID, SECRET_ACCESS_KEY, SESSION_TOKEN};
use crate::source::{FileKind, ProfileFile, Source};

/// Credentials read from an INI document laid out like `~/.aws/credentials`.
///
/// Sections are matched by bare profile name only, unless
/// [`with_prefixed_lookup`](Self::with_prefixed_lookup) is enabled.
pub struct IniCredentialProvider {
    file: ProfileFile,
    names: ProfileNameResolver,
    prefixed_lookup: bool,
}

impl IniCredentialProvider {
    pub fn new(file: ProfileFile, env: Arc<dyn Environment>) -> Self {
        Self {
            file,
            names: ProfileNameResolver::new(env),
            prefixed_lookup: false,
        }
    }

    /// Load the credentials document from `source` using the process
    /// environment.
    pub async fn load(source: impl Into<Source>) -> Result<Self> {
        Self::load_with_env(source, Arc::new(ProcessEnv)).await
    }

    pub async fn load_with_env(
        source: impl Into<Source>,
        env: Arc<dyn Environment>,
    ) -> Result<Self> {
        let file = ProfileFile::load(source.into(), FileKind::Credentials, env.as_ref()).await?;
        Ok(Self::new(file, env))
    }

    /// Also try `profile <name>` sections, for credentials kept in a config
    /// file.
    pub fn with_prefixed_lookup(mut self, enabled: bool) -> Self {
        self.prefixed_lookup = enabled;
        self
    }

    pub fn file(&self) -> &ProfileFile {
        &self.file
    }

    /// Store credentials in the in-memory document.
    ///
    /// Missing sections are created. An inactive access key leaves the
    /// profile untouched. Nothing is written to disk; call
    /// [`ProfileFile::save`] through [`file`](Self::file) to persist.
    pub fn update_credentials<'a>(
        &mut self,
        profile: &str,
        creds: impl Into<CredentialInput<'a>>,
    ) -> Result<()> {
        let Some(record) = creds.into().to_record()? else {
            debug!("Skipping credential update for '{}': key is inactive", profile);
            return Ok(());
        };

        let section = self.section_for_update(profile);
        let mut set = vec![
            (ACCESS_KEY_ID, record.access_key_id.as_str()),
            (SECRET_ACCESS_KEY, record.secret_access_key.as_str()),
        ];
        let mut remove = Vec::new();
        match record.session_token.as_deref() {
            Some(token) => set.push((SESSION_TOKEN, token)),
            None => remove.push(SESSION_TOKEN),
        }

        self.file.update_section(&section, &set, &remove);
        info!("Updated credentials for profile: {}", profile);
        Ok(())
    }

    fn section_for_update(&self, profile: &str) -> String {
        let name = self.names.resolve(Some(profile));
        // reuse an existing prefixed section rather than adding a bare twin
        match self.file.profile_section(&name, self.prefixed_lookup) {
            Some(section) => section,
            None => name,
        }
    }
}

impl CredentialProvider for IniCredentialProvider {
    fn credentials(&self, profile: Option<&str>) -> Result<CredentialRecord> {
        let name = self.names.resolve(profile);
        let section = self.file.profile(&name, self.prefixed_lookup)?;
        debug!("Reading credentials for profile '{}' from credentials file", name);

        let value = |key: &str| section.get(key).unwrap_or_default().to_string();
        let mut record = CredentialRecord::new(value(ACCESS_KEY_ID), value(SECRET_ACCESS_KEY));
        if let Some(token) = section.get(SESSION_TOKEN) {
            record = record.with_session_token(token);
        }

        record.into_complete()
    }
}
