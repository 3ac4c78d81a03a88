use std::io::{self, Write};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;

use super::GlobalOptions;
use crate::config::{ConfigProvider, IniConfigProvider};

#[derive(Debug, Clone, Default, Args)]
pub struct ProfilesCommand {
    #[arg(short = 'r', long, help = "Only list profiles that assume a role")]
    pub roles: bool,
}

impl ProfilesCommand {
    pub async fn execute(self, opts: &GlobalOptions) -> Result<()> {
        self.run(opts, &mut io::stdout()).await
    }

    pub async fn run<W: Write>(&self, opts: &GlobalOptions, out: &mut W) -> Result<()> {
        let provider = IniConfigProvider::load_with_env(opts.config_source(), Arc::clone(&opts.env))
            .await
            .context("Failed to load AWS config file")?;

        for name in provider.list_profiles(self.roles) {
            writeln!(out, "{name}")?;
        }
        Ok(())
    }
}
