use std::path::PathBuf;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};

use crate::commands::{
    CompletionsCommand, CredentialsCommand, GlobalOptions, ProfilesCommand, ResolveCommand,
    SetCredentialsCommand,
};

#[derive(Debug, Clone, Parser)]
#[command(name = "awsprof", version, about = "Resolve AWS profile configuration and credentials", long_about = None)]
pub struct Cli {
    #[arg(
        short = 'p',
        long,
        global = true,
        help = "AWS profile name (defaults to AWS_PROFILE, AWS_DEFAULT_PROFILE, then 'default')"
    )]
    pub profile: Option<String>,

    #[arg(short = 'v', long, global = true, action = ArgAction::Count, help = "Increase verbosity (-v info, -vv debug, -vvv trace)")]
    pub verbose: u8,

    #[arg(long, global = true, value_name = "LOCATION", help = "Config file path or URL (defaults to AWS_CONFIG_FILE or ~/.aws/config)")]
    pub config_file: Option<String>,

    #[arg(long, global = true, value_name = "PATH", help = "Credentials file (defaults to AWS_SHARED_CREDENTIALS_FILE or ~/.aws/credentials)")]
    pub credentials_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    #[command(about = "Print the effective configuration of a profile")]
    Resolve(ResolveCommand),
    #[command(about = "List profiles in the config file")]
    Profiles(ProfilesCommand),
    #[command(about = "Show which credentials a profile resolves to")]
    Credentials(CredentialsCommand),
    #[command(about = "Store credentials for a profile in the credentials file")]
    SetCredentials(SetCredentialsCommand),
    #[command(about = "Generate shell completion scripts for awsprof")]
    Completions(CompletionsCommand),
}

impl Cli {
    pub async fn execute(self) -> Result<()> {
        let mut opts = GlobalOptions::new(self.profile);
        opts.config_file = self.config_file;
        opts.credentials_file = self.credentials_file;

        let command = self
            .command
            .unwrap_or_else(|| Commands::Resolve(ResolveCommand::default()));

        match command {
            Commands::Resolve(cmd) => cmd.execute(&opts).await,
            Commands::Profiles(cmd) => cmd.execute(&opts).await,
            Commands::Credentials(cmd) => cmd.execute(&opts).await,
            Commands::SetCredentials(cmd) => cmd.execute(&opts).await,
            Commands::Completions(cmd) => {
                cmd.execute();
                Ok(())
            }
        }
    }
}
