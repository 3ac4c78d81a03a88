//! Statically declared attribute tables.
//!
//! Each entry ties an INI key to the environment variables that can supply
//! it. Providers walk these tables instead of describing fields ad hoc.

use std::time::Duration;

use crate::env::Environment;

pub const CA_BUNDLE: &str = "ca_bundle";
pub const CREDENTIAL_SOURCE: &str = "credential_source";
pub const DURATION_SECONDS: &str = "duration_seconds";
pub const EXTERNAL_ID: &str = "external_id";
pub const MFA_SERIAL: &str = "mfa_serial";
pub const REGION: &str = "region";
pub const ROLE_ARN: &str = "role_arn";
pub const ROLE_SESSION_NAME: &str = "role_session_name";
pub const SOURCE_PROFILE: &str = "source_profile";

pub const ACCESS_KEY_ID: &str = "aws_access_key_id";
pub const SECRET_ACCESS_KEY: &str = "aws_secret_access_key";
pub const SESSION_TOKEN: &str = "aws_session_token";

/// How an environment variable's value becomes an attribute value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvFormat {
    /// Taken verbatim.
    Raw,
    /// A duration expression such as `10h10m10s`, stored as whole seconds.
    /// Values that do not parse are skipped.
    Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnvVar {
    pub name: &'static str,
    pub format: EnvFormat,
}

const fn raw(name: &'static str) -> EnvVar {
    EnvVar {
        name,
        format: EnvFormat::Raw,
    }
}

const fn duration(name: &'static str) -> EnvVar {
    EnvVar {
        name,
        format: EnvFormat::Duration,
    }
}

/// A schema attribute: its INI key and candidate environment variables, in
/// priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attribute {
    pub key: &'static str,
    pub env: &'static [EnvVar],
}

impl Attribute {
    /// Value of the first candidate variable that is present and usable.
    pub fn from_env(&self, env: &dyn Environment) -> Option<String> {
        self.env.iter().find_map(|var| {
            let value = env.var(var.name)?;
            match var.format {
                EnvFormat::Raw => Some(value),
                EnvFormat::Duration => {
                    parse_duration_expr(&value).map(|d| d.as_secs().to_string())
                }
            }
        })
    }
}

/// Configuration attributes, in the order they are reported.
pub const CONFIG_ATTRIBUTES: &[Attribute] = &[
    Attribute {
        key: CA_BUNDLE,
        env: &[raw("AWS_CA_BUNDLE")],
    },
    Attribute {
        key: CREDENTIAL_SOURCE,
        env: &[],
    },
    Attribute {
        key: DURATION_SECONDS,
        env: &[raw("DURATION_SECONDS"), duration("CREDENTIALS_DURATION")],
    },
    Attribute {
        key: EXTERNAL_ID,
        env: &[raw("EXTERNAL_ID")],
    },
    Attribute {
        key: MFA_SERIAL,
        env: &[raw("MFA_SERIAL")],
    },
    Attribute {
        key: REGION,
        env: &[raw("AWS_REGION"), raw("AWS_DEFAULT_REGION")],
    },
    Attribute {
        key: ROLE_ARN,
        env: &[],
    },
    Attribute {
        key: ROLE_SESSION_NAME,
        env: &[raw("AWS_ROLE_SESSION_NAME")],
    },
    Attribute {
        key: SOURCE_PROFILE,
        env: &[],
    },
];

pub const ACCESS_KEY_ATTRIBUTE: Attribute = Attribute {
    key: ACCESS_KEY_ID,
    env: &[raw("AWS_ACCESS_KEY_ID"), raw("AWS_ACCESS_KEY")],
};

pub const SECRET_KEY_ATTRIBUTE: Attribute = Attribute {
    key: SECRET_ACCESS_KEY,
    env: &[raw("AWS_SECRET_ACCESS_KEY"), raw("AWS_SECRET_KEY")],
};

pub const SESSION_TOKEN_ATTRIBUTE: Attribute = Attribute {
    key: SESSION_TOKEN,
    env: &[raw("AWS_SESSION_TOKEN"), raw("AWS_SECURITY_TOKEN")],
};

/// Parse a `duration_seconds` value. Anything that is not an integer is zero.
///
/// The base follows the prefix: `0x` hex, `0o` or a bare leading `0` octal,
/// `0b` binary, decimal otherwise. Underscores may separate digits.
pub fn parse_seconds(value: &str) -> i64 {
    parse_prefixed_int(value.trim()).unwrap_or(0)
}

fn parse_prefixed_int(value: &str) -> Option<i64> {
    let (negative, rest) = match value.as_bytes().first()? {
        b'-' => (true, &value[1..]),
        b'+' => (false, &value[1..]),
        _ => (false, value),
    };

    let lower = rest.get(..2).map(str::to_ascii_lowercase);
    let (radix, digits) = match lower.as_deref() {
        Some("0x") => (16, &rest[2..]),
        Some("0o") => (8, &rest[2..]),
        Some("0b") => (2, &rest[2..]),
        _ if rest.len() > 1 && rest.starts_with('0') => (8, &rest[1..]),
        _ => (10, rest),
    };

    let digits = strip_separators(digits)?;
    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return None;
    }

    let signed = if negative { format!("-{digits}") } else { digits };
    i64::from_str_radix(&signed, radix).ok()
}

fn strip_separators(digits: &str) -> Option<String> {
    if digits.starts_with('_') || digits.ends_with('_') || digits.contains("__") {
        return None;
    }
    Some(digits.replace('_', ""))
}

/// Parse a human readable duration such as `1h30m` or `10h10m10s`.
pub fn parse_duration_expr(value: &str) -> Option<Duration> {
    humantime::parse_duration(value.trim()).ok()
}
