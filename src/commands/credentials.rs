use std::io::{self, Write};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;

use super::GlobalOptions;
use crate::credentials::{
    CredentialProvider, CredentialRecord, EnvCredentialProvider, IniCredentialProvider,
};

#[derive(Debug, Clone, Default, Args)]
pub struct CredentialsCommand {
    #[arg(long, help = "Read credentials from environment variables instead of the credentials file")]
    pub env: bool,
}

impl CredentialsCommand {
    pub async fn execute(self, opts: &GlobalOptions) -> Result<()> {
        self.run(opts, &mut io::stdout()).await
    }

    pub async fn run<W: Write>(&self, opts: &GlobalOptions, out: &mut W) -> Result<()> {
        let (label, record) = if self.env {
            let provider = EnvCredentialProvider::new(Arc::clone(&opts.env));
            let record = provider
                .credentials(None)
                .context("No usable credentials in the environment")?;
            ("environment".to_string(), record)
        } else {
            let source = opts.credentials_source();
            let provider = IniCredentialProvider::load_with_env(source, Arc::clone(&opts.env))
                .await
                .context("Failed to load AWS credentials file")?;
            let name = opts.profile_name();
            let record = provider
                .credentials(Some(&name))
                .with_context(|| format!("Failed to read credentials for profile '{name}'"))?;
            (name, record)
        };

        print(&label, &record, out)
    }
}

// never writes the secret key or the token itself
fn print<W: Write>(label: &str, record: &CredentialRecord, out: &mut W) -> Result<()> {
    writeln!(out, "[{label}]")?;
    writeln!(out, "aws_access_key_id = {}", record.access_key_id)?;
    let token = if record.session_token.is_some() {
        "present"
    } else {
        "absent"
    };
    writeln!(out, "session token: {token}")?;
    Ok(())
}
