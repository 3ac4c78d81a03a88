//! Access to environment variables.
//!
//! Providers never read `std::env` directly; they are handed an
//! [`Environment`] so lookups can be pointed at a fixed set of values.

use std::collections::HashMap;
use std::env;

/// A source of environment variables.
pub trait Environment: Send + Sync {
    /// Value of `key`, or `None` when the variable is not set.
    ///
    /// A variable that is set to the empty string is still present.
    fn var(&self, key: &str) -> Option<String>;

    /// First variable in `keys` that is present, together with its name.
    fn first_of<'k>(&self, keys: &[&'k str]) -> Option<(&'k str, String)> {
        keys.iter()
            .find_map(|key| self.var(key).map(|value| (*key, value)))
    }
}

/// The environment of the running process.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl Environment for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        env::var_os(key).map(|value| value.to_string_lossy().into_owned())
    }
}

/// A fixed set of variables, independent of the process environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticEnv {
    vars: HashMap<String, String>,
}

impl StaticEnv {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter.
    pub fn with_var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(key.into(), value.into());
        self
    }
}

impl Environment for StaticEnv {
    fn var(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }
}

impl<K, V> FromIterator<(K, V)> for StaticEnv
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl<K, V, const N: usize> From<[(K, V); N]> for StaticEnv
where
    K: Into<String>,
    V: Into<String>,
{
    fn from(vars: [(K, V); N]) -> Self {
        vars.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_static_env_lookup() {
        let env = StaticEnv::from([("AWS_REGION", "us-east-2")]);
        assert_eq!(env.var("AWS_REGION").as_deref(), Some("us-east-2"));
        assert_eq!(env.var("AWS_DEFAULT_REGION"), None);
    }

    #[test]
    fn test_empty_value_is_present() {
        let env = StaticEnv::new().with_var("AWS_REGION", "");
        assert_eq!(env.var("AWS_REGION").as_deref(), Some(""));
    }

    #[test]
    fn test_first_of_respects_order() {
        let env = StaticEnv::from([
            ("AWS_DEFAULT_REGION", "us-west-1"),
            ("AWS_REGION", "us-east-2"),
        ]);
        assert_eq!(
            env.first_of(&["AWS_REGION", "AWS_DEFAULT_REGION"]),
            Some(("AWS_REGION", "us-east-2".to_string()))
        );

        let env = StaticEnv::from([("AWS_DEFAULT_REGION", "us-west-1")]);
        assert_eq!(
            env.first_of(&["AWS_REGION", "AWS_DEFAULT_REGION"]),
            Some(("AWS_DEFAULT_REGION", "us-west-1".to_string()))
        );
        assert_eq!(env.first_of(&["NOPE"]), None);
    }

    #[test]
    #[serial]
    fn test_process_env_reads_process() {
        let key = "AWSPROF_TEST_PROCESS_ENV";
        unsafe {
            std::env::set_var(key, "value");
        }
        assert_eq!(ProcessEnv.var(key).as_deref(), Some("value"));
        unsafe {
            std::env::remove_var(key);
        }
        assert_eq!(ProcessEnv.var(key), None);
    }
}
