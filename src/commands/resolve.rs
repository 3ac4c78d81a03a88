use std::io::{self, Write};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use super::GlobalOptions;
use crate::config::{ConfigRecord, EnvConfigProvider};
use crate::constants::DEFAULT_PROFILE_NAME;
use crate::resolver::ConfigResolver;

#[derive(Debug, Clone, Default, Args)]
pub struct ResolveCommand {
    #[arg(long, help = "Read configuration from environment variables instead of the config file")]
    pub env: bool,

    #[arg(long, help = "Do not merge attributes from the default profile")]
    pub no_default: bool,

    #[arg(long, help = "Do not merge attributes from the source profile")]
    pub no_source: bool,

    #[arg(long, help = "Print the resolved profile as JSON")]
    pub json: bool,
}

impl ResolveCommand {
    pub async fn execute(self, opts: &GlobalOptions) -> Result<()> {
        self.run(opts, &mut io::stdout()).await
    }

    pub async fn run<W: Write>(&self, opts: &GlobalOptions, out: &mut W) -> Result<()> {
        let resolver = if self.env {
            ConfigResolver::new(EnvConfigProvider::new(Arc::clone(&opts.env)))
        } else {
            ConfigResolver::load_with_env(opts.config_source(), Arc::clone(&opts.env))
                .await
                .context("Failed to load AWS config file")?
        };

        let name = opts.profile_name();
        info!("Resolving profile: {}", name);
        let profile = match opts.profile.as_deref() {
            Some(explicit) => Some(explicit),
            None if name == DEFAULT_PROFILE_NAME => None,
            None => Some(name.as_str()),
        };
        let record = resolver
            .with_lookup_default_profile(!self.no_default)
            .with_lookup_source_profile(!self.no_source)
            .resolve(profile)
            .with_context(|| format!("Failed to resolve profile '{name}'"))?;

        self.print(&record, out)
    }

    fn print<W: Write>(&self, record: &ConfigRecord, out: &mut W) -> Result<()> {
        if self.json {
            serde_json::to_writer_pretty(&mut *out, record)?;
            writeln!(out)?;
            return Ok(());
        }

        if !record.profile().is_empty() {
            writeln!(out, "[{}]", record.profile())?;
        }
        for (key, value) in record.attributes() {
            writeln!(out, "{key} = {value}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::StaticEnv;
    use std::fs;
    use tempfile::TempDir;

    const CONFIG: &str = "\
[default]
region = us-west-2
mfa_serial = M

[profile source]
region = us-east-1

[profile target]
role_arn = X
source_profile = source

[profile dev]
region = eu-west-1
";

    fn options(dir: &TempDir, profile: Option<&str>) -> GlobalOptions {
        options_with_env(dir, profile, StaticEnv::new())
    }

    fn options_with_env(dir: &TempDir, profile: Option<&str>, env: StaticEnv) -> GlobalOptions {
        let path = dir.path().join("config");
        fs::write(&path, CONFIG).unwrap();

        let mut opts = GlobalOptions::new(profile.map(str::to_string));
        opts.config_file = Some(path.display().to_string());
        opts.env = Arc::new(env);
        opts
    }

    async fn output(cmd: ResolveCommand, opts: &GlobalOptions) -> String {
        let mut out = Vec::new();
        cmd.run(opts, &mut out).await.unwrap();
        String::from_utf8(out).unwrap()
    }

    #[tokio::test]
    async fn test_resolve_merged_text() {
        let dir = TempDir::new().unwrap();
        let text = output(ResolveCommand::default(), &options(&dir, Some("target"))).await;

        assert_eq!(
            text,
            "[target]\nmfa_serial = M\nregion = us-east-1\nrole_arn = X\nsource_profile = source\n"
        );
    }

    #[tokio::test]
    async fn test_resolve_without_lookups() {
        let dir = TempDir::new().unwrap();
        let cmd = ResolveCommand {
            no_default: true,
            no_source: true,
            ..Default::default()
        };
        let text = output(cmd, &options(&dir, Some("target"))).await;

        assert!(!text.contains("region"));
        assert!(text.contains("role_arn = X"));
    }

    #[tokio::test]
    async fn test_resolve_json() {
        let dir = TempDir::new().unwrap();
        let cmd = ResolveCommand {
            json: true,
            ..Default::default()
        };
        let text = output(cmd, &options(&dir, Some("target"))).await;
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();

        assert_eq!(value["profile"], "target");
        assert_eq!(value["region"], "us-east-1");
        assert_eq!(value["mfa_serial"], "M");
    }

    #[tokio::test]
    async fn test_resolve_from_environment() {
        let mut opts = GlobalOptions::new(Some("envprofile".to_string()));
        opts.env = Arc::new(StaticEnv::from([("AWS_REGION", "eu-central-1")]));
        let cmd = ResolveCommand {
            env: true,
            ..Default::default()
        };

        let text = output(cmd, &opts).await;
        assert_eq!(text, "[envprofile]\nregion = eu-central-1\n");
    }

    #[tokio::test]
    async fn test_resolve_unknown_profile() {
        let dir = TempDir::new().unwrap();
        let mut out = Vec::new();
        let err = ResolveCommand::default()
            .run(&options(&dir, Some("missing")), &mut out)
            .await
            .unwrap_err();

        assert!(err.to_string().contains("missing"));
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn test_resolve_profile_from_environment_variable() {
        let dir = TempDir::new().unwrap();
        let opts = options_with_env(&dir, None, StaticEnv::from([("AWS_PROFILE", "dev")]));
        let text = output(ResolveCommand::default(), &opts).await;

        assert_eq!(text, "[dev]\nmfa_serial = M\nregion = eu-west-1\n");
    }

    #[tokio::test]
    async fn test_resolve_default_without_profile() {
        let dir = TempDir::new().unwrap();
        let text = output(ResolveCommand::default(), &options(&dir, None)).await;

        assert_eq!(text, "[default]\nmfa_serial = M\nregion = us-west-2\n");
    }

    #[tokio::test]
    async fn test_explicit_profile_beats_environment_variable() {
        let dir = TempDir::new().unwrap();
        let env = StaticEnv::from([("AWS_PROFILE", "dev")]);
        let opts = options_with_env(&dir, Some("source"), env);
        let text = output(ResolveCommand::default(), &opts).await;

        assert!(text.starts_with("[source]\n"));
        assert!(text.contains("region = us-east-1"));
    }
}
