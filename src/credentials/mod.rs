use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use serde_json::Value;

use crate::error::{Error, Result};

pub mod env;
pub mod file;

pub use env::EnvCredentialProvider;
pub use file::IniCredentialProvider;

/// An access key pair with an optional session token.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct CredentialRecord {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: Option<String>,
}

impl CredentialRecord {
    pub fn new(access_key_id: impl Into<String>, secret_access_key: impl Into<String>) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            session_token: None,
        }
    }

    pub fn with_session_token(mut self, token: impl Into<String>) -> Self {
        self.session_token = Some(token.into()).filter(|t: &String| !t.is_empty());
        self
    }

    /// Both the access key and the secret key are present.
    pub fn is_complete(&self) -> bool {
        !self.access_key_id.is_empty() && !self.secret_access_key.is_empty()
    }

    pub(crate) fn into_complete(self) -> Result<Self> {
        if self.is_complete() {
            Ok(self)
        } else {
            Err(Error::IncompleteCredentials)
        }
    }
}

// secrets stay out of logs and panic messages
impl fmt::Debug for CredentialRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialRecord")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field(
                "session_token",
                &self.session_token.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessKeyStatus {
    Active,
    Inactive,
}

impl FromStr for AccessKeyStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "Active" => Ok(Self::Active),
            "Inactive" => Ok(Self::Inactive),
            other => Err(Error::UnsupportedCredentialInput(format!(
                "unknown access key status '{other}'"
            ))),
        }
    }
}

/// An IAM user access key, as returned when keys are created or listed.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessKey {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub status: AccessKeyStatus,
}

impl fmt::Debug for AccessKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessKey")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field("status", &self.status)
            .finish()
    }
}

/// Credentials handed to an update.
#[derive(Debug, Clone)]
pub enum CredentialInput<'a> {
    /// Access key, secret key and optional session token.
    Credentials(Cow<'a, CredentialRecord>),
    /// An IAM access key; inactive keys are skipped.
    AccessKey(Cow<'a, AccessKey>),
    /// Nothing was supplied.
    Absent,
}

impl CredentialInput<'static> {
    /// Interpret AWS CLI JSON output.
    ///
    /// Accepts `aws iam create-access-key` output (`AccessKey` with a
    /// `Status`) and STS output (`Credentials` with a `SessionToken`), either
    /// wrapped or bare. `null` is [`CredentialInput::Absent`].
    pub fn from_json(value: &Value) -> Result<CredentialInput<'static>> {
        let object = match value {
            Value::Null => return Ok(CredentialInput::Absent),
            Value::Object(map) => map,
            other => {
                return Err(Error::UnsupportedCredentialInput(format!(
                    "expected a JSON object, found {}",
                    json_kind(other)
                )));
            }
        };

        if let Some(inner) = object.get("AccessKey").or_else(|| object.get("Credentials")) {
            return CredentialInput::from_json(inner);
        }

        let field = |name: &str| object.get(name).and_then(Value::as_str);
        let (Some(access_key_id), Some(secret_access_key)) =
            (field("AccessKeyId"), field("SecretAccessKey"))
        else {
            return Err(Error::UnsupportedCredentialInput(
                "missing AccessKeyId or SecretAccessKey".to_string(),
            ));
        };

        match (field("Status"), field("SessionToken")) {
            (Some(status), _) => Ok(CredentialInput::AccessKey(Cow::Owned(AccessKey {
                access_key_id: access_key_id.to_string(),
                secret_access_key: secret_access_key.to_string(),
                status: status.parse()?,
            }))),
            (None, token) => {
                let mut record = CredentialRecord::new(access_key_id, secret_access_key);
                if let Some(token) = token {
                    record = record.with_session_token(token);
                }
                Ok(CredentialInput::Credentials(Cow::Owned(record)))
            }
        }
    }
}

impl CredentialInput<'_> {
    /// The credential to store, `Ok(None)` when the update should be skipped.
    pub(crate) fn to_record(&self) -> Result<Option<CredentialRecord>> {
        match self {
            CredentialInput::Credentials(creds) => Ok(Some(creds.as_ref().clone())),
            CredentialInput::AccessKey(key) => match key.status {
                AccessKeyStatus::Active => Ok(Some(CredentialRecord::new(
                    key.access_key_id.clone(),
                    key.secret_access_key.clone(),
                ))),
                AccessKeyStatus::Inactive => Ok(None),
            },
            CredentialInput::Absent => Err(Error::MissingCredentialInput),
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

impl From<CredentialRecord> for CredentialInput<'_> {
    fn from(creds: CredentialRecord) -> Self {
        Self::Credentials(Cow::Owned(creds))
    }
}

impl<'a> From<&'a CredentialRecord> for CredentialInput<'a> {
    fn from(creds: &'a CredentialRecord) -> Self {
        Self::Credentials(Cow::Borrowed(creds))
    }
}

impl From<AccessKey> for CredentialInput<'_> {
    fn from(key: AccessKey) -> Self {
        Self::AccessKey(Cow::Owned(key))
    }
}

impl<'a> From<&'a AccessKey> for CredentialInput<'a> {
    fn from(key: &'a AccessKey) -> Self {
        Self::AccessKey(Cow::Borrowed(key))
    }
}

impl<'a, T> From<Option<T>> for CredentialInput<'a>
where
    T: Into<CredentialInput<'a>>,
{
    fn from(input: Option<T>) -> Self {
        input.map_or(Self::Absent, Into::into)
    }
}

/// A source of credentials.
pub trait CredentialProvider {
    /// Credentials for `profile`; `None` picks the profile from the
    /// environment or falls back to `default`.
    fn credentials(&self, profile: Option<&str>) -> Result<CredentialRecord>;
}
