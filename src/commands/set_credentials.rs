use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{ArgGroup, Args};
use tokio::fs;
use tracing::{debug, info};

use super::GlobalOptions;
use crate::credentials::{
    CredentialInput, CredentialProvider, CredentialRecord, EnvCredentialProvider,
    IniCredentialProvider,
};
use crate::source::{FileKind, ProfileFile};

#[derive(Debug, Clone, Args)]
#[command(group(
    ArgGroup::new("input")
        .required(true)
        .args(["access_key", "json", "from_env"])
))]
pub struct SetCredentialsCommand {
    #[arg(long, requires = "secret_key", help = "AWS access key id")]
    pub access_key: Option<String>,

    #[arg(long, requires = "access_key", help = "AWS secret access key")]
    pub secret_key: Option<String>,

    #[arg(long, requires = "access_key", help = "AWS session token")]
    pub session_token: Option<String>,

    #[arg(
        long,
        value_name = "FILE",
        help = "Read AWS CLI JSON output (create-access-key or STS credentials), '-' for stdin"
    )]
    pub json: Option<PathBuf>,

    #[arg(long, help = "Copy credentials from AWS_ACCESS_KEY_ID and friends")]
    pub from_env: bool,

    #[arg(long, help = "Also match 'profile <name>' sections")]
    pub prefixed: bool,
}

impl SetCredentialsCommand {
    pub async fn execute(self, opts: &GlobalOptions) -> Result<()> {
        self.run(opts, &mut io::stdout()).await
    }

    pub async fn run<W: Write>(&self, opts: &GlobalOptions, out: &mut W) -> Result<()> {
        let input = self.input(opts).await?;

        let file = load_target(opts).await?;
        let mut provider = IniCredentialProvider::new(file, Arc::clone(&opts.env))
            .with_prefixed_lookup(self.prefixed);
        let profile = opts.profile_name();

        provider
            .update_credentials(&profile, input)
            .with_context(|| format!("Failed to update credentials for profile '{profile}'"))?;
        let path = provider
            .file()
            .save()
            .await
            .context("Failed to save AWS credentials file")?;

        info!("Credentials for profile '{}' written to {}", profile, path.display());
        writeln!(out, "Updated credentials for profile '{profile}' in {}", path.display())?;
        Ok(())
    }

    async fn input(&self, opts: &GlobalOptions) -> Result<CredentialInput<'static>> {
        if let Some(path) = &self.json {
            let text = read_json(path).await?;
            let value: serde_json::Value =
                serde_json::from_str(&text).context("Failed to parse credential JSON")?;
            return Ok(CredentialInput::from_json(&value)?);
        }

        if self.from_env {
            let record = EnvCredentialProvider::new(Arc::clone(&opts.env))
                .credentials(None)
                .context("No usable credentials in the environment")?;
            return Ok(record.into());
        }

        match (&self.access_key, &self.secret_key) {
            (Some(access_key), Some(secret_key)) => {
                let mut record = CredentialRecord::new(access_key, secret_key);
                if let Some(token) = &self.session_token {
                    record = record.with_session_token(token);
                }
                Ok(record.into())
            }
            _ => bail!("Both --access-key and --secret-key are required"),
        }
    }
}

async fn read_json(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let text = tokio::task::spawn_blocking(|| {
            let mut text = String::new();
            io::stdin().read_to_string(&mut text).map(|_| text)
        })
        .await?
        .context("Failed to read credential JSON from stdin")?;
        return Ok(text);
    }

    fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))
}

/// The credentials document to update. A missing file is started empty.
async fn load_target(opts: &GlobalOptions) -> Result<ProfileFile> {
    let path = match &opts.credentials_file {
        Some(path) => path.clone(),
        None => FileKind::Credentials
            .default_path(opts.env.as_ref())
            .context("Cannot determine the AWS credentials file location")?,
    };

    if fs::try_exists(&path).await.unwrap_or(false) {
        return ProfileFile::load(path.into(), FileKind::Credentials, opts.env.as_ref())
            .await
            .context("Failed to load AWS credentials file");
    }

    debug!("Creating new credentials file at {}", path.display());
    Ok(ProfileFile::parse("")?.with_path(path))
}
