use std::path::PathBuf;
use std::sync::Arc;

use crate::env::{Environment, ProcessEnv};
use crate::profile::ProfileNameResolver;
use crate::source::Source;

pub mod completions;
pub mod credentials;
pub mod profiles;
pub mod resolve;
pub mod set_credentials;

pub use completions::CompletionsCommand;
pub use credentials::CredentialsCommand;
pub use profiles::ProfilesCommand;
pub use resolve::ResolveCommand;
pub use set_credentials::SetCredentialsCommand;

/// Options shared by every subcommand.
#[derive(Clone)]
pub struct GlobalOptions {
    pub profile: Option<String>,
    pub config_file: Option<String>,
    pub credentials_file: Option<PathBuf>,
    pub env: Arc<dyn Environment>,
}

impl GlobalOptions {
    pub fn new(profile: Option<String>) -> Self {
        Self {
            profile,
            config_file: None,
            credentials_file: None,
            env: Arc::new(ProcessEnv),
        }
    }

    pub fn config_source(&self) -> Source {
        self.config_file.clone().map_or(Source::Default, Source::from)
    }

    pub fn credentials_source(&self) -> Source {
        self.credentials_file.clone().into()
    }

    /// The profile name a lookup will end up using.
    pub fn profile_name(&self) -> String {
        ProfileNameResolver::new(Arc::clone(&self.env)).resolve(self.profile.as_deref())
    }
}
