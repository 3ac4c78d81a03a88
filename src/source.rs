//! Loading INI-formatted profile documents from paths, URLs, bytes and
//! readers, and writing them back.

use std::fmt;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use ini::{EscapePolicy, Ini, Properties};
use tokio::fs;
use tracing::{debug, info};
use url::Url;

use crate::constants::{
    DEFAULT_PROFILE_NAME, EMPTY_PROFILE_DOCUMENT, get_aws_config_path, get_aws_credentials_path,
};
use crate::env::Environment;
use crate::error::{Error, Result, SourceError};
use crate::profile::{config_section_name, profile_name_of_section};
use crate::schema::ROLE_ARN;

/// Where a profile document comes from.
pub enum Source {
    /// The file named by `AWS_CONFIG_FILE` / `AWS_SHARED_CREDENTIALS_FILE`,
    /// or the shared file under `~/.aws`.
    Default,
    Path(PathBuf),
    /// A local path or a `file`, `http` or `https` URL.
    Location(String),
    Url(Url),
    Bytes(Vec<u8>),
    Reader(Box<dyn Read + Send>),
}

impl fmt::Debug for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Default => f.write_str("Default"),
            Self::Path(path) => f.debug_tuple("Path").field(path).finish(),
            Self::Location(location) => f.debug_tuple("Location").field(location).finish(),
            Self::Url(url) => f.debug_tuple("Url").field(&url.as_str()).finish(),
            Self::Bytes(bytes) => write!(f, "Bytes({} bytes)", bytes.len()),
            Self::Reader(_) => f.write_str("Reader(..)"),
        }
    }
}

impl From<&str> for Source {
    fn from(location: &str) -> Self {
        Self::Location(location.to_string())
    }
}

impl From<String> for Source {
    fn from(location: String) -> Self {
        Self::Location(location)
    }
}

impl From<PathBuf> for Source {
    fn from(path: PathBuf) -> Self {
        Self::Path(path)
    }
}

impl From<&Path> for Source {
    fn from(path: &Path) -> Self {
        Self::Path(path.to_path_buf())
    }
}

impl From<Url> for Source {
    fn from(url: Url) -> Self {
        Self::Url(url)
    }
}

impl From<Vec<u8>> for Source {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(bytes)
    }
}

impl From<Option<PathBuf>> for Source {
    fn from(path: Option<PathBuf>) -> Self {
        path.map_or(Self::Default, Self::Path)
    }
}

/// Which shared file a [`Source::Default`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Config,
    Credentials,
}

impl FileKind {
    pub fn default_path(self, env: &dyn Environment) -> Option<PathBuf> {
        match self {
            Self::Config => get_aws_config_path(env),
            Self::Credentials => get_aws_credentials_path(env),
        }
    }
}

/// A parsed profile document: one INI section per profile.
#[derive(Debug, Clone)]
pub struct ProfileFile {
    ini: Ini,
    path: Option<PathBuf>,
}

impl ProfileFile {
    /// Load and parse a document.
    pub async fn load(source: Source, kind: FileKind, env: &dyn Environment) -> Result<Self> {
        debug!("Loading {:?} profile document from {:?}", kind, source);

        let (text, path) = match source {
            Source::Default => {
                let path = kind.default_path(env);
                let existing = match &path {
                    Some(p) if fs::try_exists(p).await.unwrap_or(false) => {
                        Some(read_path(p).await?)
                    }
                    _ => None,
                };
                let text = existing.unwrap_or_else(|| {
                    debug!("No {:?} file found, using an empty document", kind);
                    EMPTY_PROFILE_DOCUMENT.to_string()
                });
                (text, path)
            }
            Source::Path(path) => (read_path(&path).await?, Some(path)),
            Source::Location(location) => match file_location(&location) {
                Some(path) => {
                    let path = PathBuf::from(path);
                    (read_path(&path).await?, Some(path))
                }
                None => match Url::parse(&location) {
                    // a single letter "scheme" is a Windows drive, not a URL
                    Ok(url) if url.scheme().len() > 1 => read_url(&url).await?,
                    _ => {
                        let path = PathBuf::from(location);
                        (read_path(&path).await?, Some(path))
                    }
                },
            },
            Source::Url(url) => read_url(&url).await?,
            Source::Bytes(bytes) => (decode("<bytes>", bytes)?, None),
            Source::Reader(reader) => {
                let bytes = read_blocking(reader)
                    .await
                    .map_err(|e| Error::unreadable("<reader>", e))?;
                (decode("<reader>", bytes)?, None)
            }
        };

        let location = path
            .as_ref()
            .map_or_else(|| "<memory>".to_string(), |p| p.display().to_string());
        let ini = parse_ini(&text).map_err(|e| Error::unreadable(location, e))?;

        Ok(Self { ini, path })
    }

    /// Parse a document held in memory.
    pub fn parse(text: &str) -> Result<Self> {
        let ini = parse_ini(text).map_err(|e| Error::unreadable("<memory>", e))?;
        Ok(Self { ini, path: None })
    }

    /// Path the document was read from, or will be saved to.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Look up a profile's section.
    ///
    /// The bare name is tried first. When `prefixed` is set and the name is
    /// not `default`, `profile <name>` is tried next.
    pub fn profile(&self, name: &str, prefixed: bool) -> Result<&Properties> {
        self.profile_section(name, prefixed)
            .and_then(|section| self.ini.section(Some(section)))
            .ok_or_else(|| Error::ProfileNotFound(name.to_string()))
    }

    /// Name of the section holding `name`, following the same rules as
    /// [`profile`](Self::profile).
    pub(crate) fn profile_section(&self, name: &str, prefixed: bool) -> Option<String> {
        if self.ini.section(Some(name)).is_some() {
            return Some(name.to_string());
        }

        if prefixed && name != DEFAULT_PROFILE_NAME {
            let section = config_section_name(name);
            debug!("Profile '{}' not found, retrying as '{}'", name, section);
            if self.ini.section(Some(section.as_str())).is_some() {
                return Some(section);
            }
        }

        None
    }

    /// Logical profile names, sorted. With `roles_only`, only sections that
    /// declare a `role_arn` are included.
    pub fn list_profiles(&self, roles_only: bool) -> Vec<String> {
        let mut profiles: Vec<String> = self
            .ini
            .iter()
            .filter_map(|(name, props)| name.map(|name| (name, props)))
            .filter(|(_, props)| !roles_only || props.contains_key(ROLE_ARN))
            .map(|(name, _)| profile_name_of_section(name).to_string())
            .collect();

        profiles.sort();
        profiles
    }

    /// Set and remove keys in a section, creating the section if needed.
    pub(crate) fn update_section(&mut self, section: &str, set: &[(&str, &str)], remove: &[&str]) {
        {
            let mut setter = self.ini.with_section(Some(section));
            for (key, value) in set {
                setter.set(*key, *value);
            }
        }

        if let Some(props) = self.ini.section_mut(Some(section)) {
            for key in remove {
                props.remove(*key);
            }
        }
    }

    /// Serialize the document. Values are written exactly as stored.
    pub fn write_to<W: io::Write>(&self, writer: &mut W) -> io::Result<()> {
        self.ini.write_to_policy(writer, EscapePolicy::Nothing)
    }

    /// Write the document to its own path.
    pub async fn save(&self) -> Result<PathBuf> {
        let path = self.path.clone().ok_or(Error::NoSavePath)?;
        self.save_to(&path).await?;
        Ok(path)
    }

    /// Write the document to `path`, readable only by the owner.
    pub async fn save_to(&self, path: &Path) -> Result<()> {
        let write_err = |source| Error::Write {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await.map_err(write_err)?;
        }

        let mut buffer = Vec::new();
        self.write_to(&mut buffer).map_err(write_err)?;
        fs::write(path, buffer).await.map_err(write_err)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let metadata = fs::metadata(path).await.map_err(write_err)?;
            let mut permissions = metadata.permissions();
            permissions.set_mode(0o600);
            fs::set_permissions(path, permissions)
                .await
                .map_err(write_err)?;
        }

        info!("Profile document saved to {}", path.display());
        Ok(())
    }
}

// backslashes are literal, as in Windows paths
fn parse_ini(text: &str) -> std::result::Result<Ini, ini::ParseError> {
    Ini::load_from_str_noescape(text)
}

async fn read_blocking(mut reader: Box<dyn Read + Send>) -> io::Result<Vec<u8>> {
    tokio::task::spawn_blocking(move || {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes).map(|_| bytes)
    })
    .await
    .map_err(io::Error::other)?
}

fn file_location(location: &str) -> Option<&str> {
    location
        .strip_prefix("file://")
        .or_else(|| location.strip_prefix("file:"))
}

async fn read_path(path: &Path) -> Result<String> {
    let location = path.display().to_string();
    let bytes = fs::read(path)
        .await
        .map_err(|e| Error::unreadable(location.as_str(), e))?;
    decode(&location, bytes)
}

async fn read_url(url: &Url) -> Result<(String, Option<PathBuf>)> {
    match url.scheme() {
        "http" | "https" => {
            let bytes = fetch(url)
                .await
                .map_err(|e| Error::unreadable(url.as_str(), e))?;
            Ok((decode(url.as_str(), bytes)?, None))
        }
        "file" => {
            let path = url.to_file_path().map_err(|_| {
                Error::unreadable(
                    url.as_str(),
                    io::Error::new(io::ErrorKind::InvalidInput, "not a local file URL"),
                )
            })?;
            Ok((read_path(&path).await?, Some(path)))
        }
        scheme => Err(Error::unreadable(
            url.as_str(),
            SourceError::UnsupportedScheme(scheme.to_string()),
        )),
    }
}

async fn fetch(url: &Url) -> std::result::Result<Vec<u8>, SourceError> {
    debug!("Fetching profile document from {}", url);
    let response = reqwest::get(url.clone()).await?;

    let status = response.status();
    if !status.is_success() {
        return Err(SourceError::HttpStatus(status.as_u16()));
    }

    Ok(response.bytes().await?.to_vec())
}

fn decode(location: &str, bytes: Vec<u8>) -> Result<String> {
    String::from_utf8(bytes).map_err(|e| Error::unreadable(location, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{CONFIG_FILE_ENV_VAR, CREDENTIALS_FILE_ENV_VAR};
    use crate::env::StaticEnv;
    use std::io::Cursor;
    use tempfile::TempDir;

    const CONFIG: &str = "\
[default]
region = us-east-2

[profile other]
region = us-west-1
custom_attribute = yes

[uncommon]
region = eu-west-1

[profile mfa]
region = ap-southeast-2
role_arn = arn:aws:iam::123456789012:role/mfa
source_profile = default
mfa_serial = arn:aws:iam::123456789012:mfa/me
external_id = qq
";

    fn write_config(dir: &TempDir) -> PathBuf {
        let path = dir.path().join("config");
        std::fs::write(&path, CONFIG).unwrap();
        path
    }

    #[tokio::test]
    async fn test_load_path() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir);

        let source = Source::Path(path.clone());
        let file = ProfileFile::load(source, FileKind::Config, &StaticEnv::new())
            .await
            .unwrap();
        assert_eq!(file.path(), Some(path.as_path()));
        assert!(file.profile("other", true).is_ok());
    }

    #[tokio::test]
    async fn test_load_location_string_and_file_url() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir);
        let env = StaticEnv::new();

        let plain = path.display().to_string();
        let file = ProfileFile::load(plain.clone().into(), FileKind::Config, &env)
            .await
            .unwrap();
        assert_eq!(file.path(), Some(path.as_path()));

        let file = ProfileFile::load(format!("file:{plain}").into(), FileKind::Config, &env)
            .await
            .unwrap();
        assert_eq!(file.path(), Some(path.as_path()));

        let url = Url::from_file_path(&path).unwrap();
        let file = ProfileFile::load(Source::Url(url), FileKind::Config, &env)
            .await
            .unwrap();
        assert_eq!(file.path(), Some(path.as_path()));
    }

    #[tokio::test]
    async fn test_load_bytes_and_reader() {
        let env = StaticEnv::new();

        let file = ProfileFile::load(CONFIG.as_bytes().to_vec().into(), FileKind::Config, &env)
            .await
            .unwrap();
        assert_eq!(file.path(), None);
        assert!(file.profile("uncommon", false).is_ok());

        let reader = Box::new(Cursor::new(CONFIG.as_bytes().to_vec()));
        let file = ProfileFile::load(Source::Reader(reader), FileKind::Config, &env)
            .await
            .unwrap();
        assert!(file.profile("mfa", true).is_ok());
    }

    #[tokio::test]
    async fn test_load_bad_sources() {
        let env = StaticEnv::new();

        let err = ProfileFile::load("not-my-file".into(), FileKind::Config, &env)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::SourceUnreadable { .. }));

        let err = ProfileFile::load("ftp://example.com/config".into(), FileKind::Config, &env)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::SourceUnreadable {
                source: SourceError::UnsupportedScheme(ref scheme),
                ..
            } if scheme == "ftp"
        ));

        let err = ProfileFile::load(vec![0xffu8, 0xfe].into(), FileKind::Config, &env)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::SourceUnreadable {
                source: SourceError::Utf8(_),
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_load_default_from_env_var() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir);
        let env = StaticEnv::new().with_var(CONFIG_FILE_ENV_VAR, path.display().to_string());

        let file = ProfileFile::load(Source::Default, FileKind::Config, &env)
            .await
            .unwrap();
        assert_eq!(file.path(), Some(path.as_path()));
        assert_eq!(file.list_profiles(false).len(), 4);
    }

    #[tokio::test]
    async fn test_load_default_missing_file_is_empty_document() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("credentials");
        let env = StaticEnv::new().with_var(CREDENTIALS_FILE_ENV_VAR, path.display().to_string());

        let file = ProfileFile::load(Source::Default, FileKind::Credentials, &env)
            .await
            .unwrap();
        assert_eq!(file.path(), Some(path.as_path()));
        assert_eq!(file.list_profiles(false), vec!["default".to_string()]);
    }

    #[test]
    fn test_profile_lookup_forms() {
        let file = ProfileFile::parse(CONFIG).unwrap();

        assert!(file.profile("default", true).is_ok());
        assert!(file.profile("uncommon", true).is_ok());
        assert_eq!(
            file.profile("other", true).unwrap().get("region"),
            Some("us-west-1")
        );
        assert!(matches!(
            file.profile("other", false),
            Err(Error::ProfileNotFound(ref name)) if name == "other"
        ));
        assert!(matches!(
            file.profile("not-a-profile", true),
            Err(Error::ProfileNotFound(_))
        ));
    }

    #[test]
    fn test_default_is_never_prefixed() {
        let file = ProfileFile::parse("[profile default]\nregion = us-east-1\n").unwrap();
        assert!(matches!(
            file.profile("default", true),
            Err(Error::ProfileNotFound(_))
        ));
    }

    #[test]
    fn test_list_profiles() {
        let file = ProfileFile::parse(CONFIG).unwrap();

        assert_eq!(file.list_profiles(true), vec!["mfa".to_string()]);
        assert_eq!(
            file.list_profiles(false),
            vec!["default", "mfa", "other", "uncommon"]
        );
    }

    #[test]
    fn test_update_section_creates_and_removes() {
        let mut file = ProfileFile::parse("[default]\na = 1\nb = 2\n").unwrap();

        file.update_section("default", &[("a", "10")], &["b"]);
        file.update_section("new", &[("c", "3")], &[]);

        let default = file.profile("default", false).unwrap();
        assert_eq!(default.get("a"), Some("10"));
        assert_eq!(default.get("b"), None);
        assert_eq!(file.profile("new", false).unwrap().get("c"), Some("3"));
    }

    #[tokio::test]
    async fn test_save_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("credentials");

        let mut file = ProfileFile::parse("[default]\n").unwrap().with_path(&path);
        file.update_section("dev", &[("aws_access_key_id", "AKIADEV")], &[]);
        assert_eq!(file.save().await.unwrap(), path);

        let source = Source::Path(path.clone());
        let reloaded = ProfileFile::load(source, FileKind::Credentials, &StaticEnv::new())
            .await
            .unwrap();
        assert_eq!(
            reloaded.profile("dev", false).unwrap().get("aws_access_key_id"),
            Some("AKIADEV")
        );

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(&path).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o600);
        }
    }

    #[tokio::test]
    async fn test_save_without_path() {
        let file = ProfileFile::parse("[default]\n").unwrap();
        assert!(matches!(file.save().await, Err(Error::NoSavePath)));
    }

    #[test]
    fn test_backslashes_are_literal() {
        let file = ProfileFile::parse("[default]\nca_bundle = C:\\Users\\me\\ca.pem\n").unwrap();
        assert_eq!(
            file.profile("default", false).unwrap().get("ca_bundle"),
            Some("C:\\Users\\me\\ca.pem")
        );

        let mut out = Vec::new();
        file.write_to(&mut out).unwrap();
        assert!(String::from_utf8(out).unwrap().contains("ca_bundle=C:\\Users\\me\\ca.pem"));
    }

    #[tokio::test]
    async fn test_backslashes_survive_update_and_save() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config");
        std::fs::write(&path, "[profile win]\nca_bundle = C:\\certs\\ca.pem\n").unwrap();
        let env = StaticEnv::new();

        let mut file = ProfileFile::load(Source::Path(path.clone()), FileKind::Config, &env)
            .await
            .unwrap();
        file.update_section("other", &[("region", "us-east-1")], &[]);
        file.save().await.unwrap();

        let reloaded = ProfileFile::load(Source::Path(path), FileKind::Config, &env)
            .await
            .unwrap();
        assert_eq!(
            reloaded.profile("win", true).unwrap().get("ca_bundle"),
            Some("C:\\certs\\ca.pem")
        );
    }
}
