//! AWS shared config and credentials resolution.
//!
//! Profiles are read from INI documents laid out like `~/.aws/config` and
//! `~/.aws/credentials`, or from environment variables, and merged with the
//! default and source profiles by [`ConfigResolver`].

pub mod cli;
pub mod commands;
pub mod config;
pub mod constants;
pub mod credentials;
pub mod env;
pub mod error;
pub mod profile;
pub mod resolver;
pub mod schema;
pub mod source;

pub use config::{ConfigProvider, ConfigRecord, EnvConfigProvider, IniConfigProvider};
pub use credentials::{
    AccessKey, AccessKeyStatus, CredentialInput, CredentialProvider, CredentialRecord,
    EnvCredentialProvider, IniCredentialProvider,
};
pub use env::{Environment, ProcessEnv, StaticEnv};
pub use error::{Error, Result};
pub use profile::ProfileNameResolver;
pub use resolver::{ConfigResolver, merge};
pub use source::{FileKind, ProfileFile, Source};
