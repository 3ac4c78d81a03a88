use std::path::PathBuf;

use crate::env::Environment;

/// Name of the profile used when nothing else is requested
pub const DEFAULT_PROFILE_NAME: &str = "default";

/// Prefix used for non-default profile sections in the shared config file
pub const PROFILE_SECTION_PREFIX: &str = "profile ";

/// Environment variable selecting the active profile
pub const PROFILE_ENV_VAR: &str = "AWS_PROFILE";

/// Lower priority environment variable naming the default profile
pub const DEFAULT_PROFILE_ENV_VAR: &str = "AWS_DEFAULT_PROFILE";

/// Environment variable overriding the shared config file location
pub const CONFIG_FILE_ENV_VAR: &str = "AWS_CONFIG_FILE";

/// Environment variable overriding the shared credentials file location
pub const CREDENTIALS_FILE_ENV_VAR: &str = "AWS_SHARED_CREDENTIALS_FILE";

/// AWS configuration directory name
pub const AWS_CONFIG_DIR_NAME: &str = ".aws";

/// AWS configuration file name
pub const AWS_CONFIG_FILE_NAME: &str = "config";

/// AWS credentials file name
pub const AWS_CREDENTIALS_FILE_NAME: &str = "credentials";

/// Document used when the default file location does not exist
pub const EMPTY_PROFILE_DOCUMENT: &str = "[default]\n";

/// Get the AWS config file path
/// Respects AWS_CONFIG_FILE environment variable if set
pub fn get_aws_config_path(env: &dyn Environment) -> Option<PathBuf> {
    if let Some(path) = env.var(CONFIG_FILE_ENV_VAR) {
        return Some(PathBuf::from(path));
    }

    dirs::home_dir().map(|home| home.join(AWS_CONFIG_DIR_NAME).join(AWS_CONFIG_FILE_NAME))
}

/// Get the AWS credentials file path
/// Respects AWS_SHARED_CREDENTIALS_FILE environment variable if set
pub fn get_aws_credentials_path(env: &dyn Environment) -> Option<PathBuf> {
    if let Some(path) = env.var(CREDENTIALS_FILE_ENV_VAR) {
        return Some(PathBuf::from(path));
    }

    dirs::home_dir().map(|home| {
        home.join(AWS_CONFIG_DIR_NAME)
            .join(AWS_CREDENTIALS_FILE_NAME)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::{ProcessEnv, StaticEnv};
    use serial_test::serial;
    use std::env;

    #[test]
    fn test_get_aws_config_path_with_env() {
        let env = StaticEnv::from([(CONFIG_FILE_ENV_VAR, "/custom/aws/config")]);
        let path = get_aws_config_path(&env);
        assert_eq!(path, Some(PathBuf::from("/custom/aws/config")));
    }

    #[test]
    fn test_get_aws_config_path_default() {
        let path = get_aws_config_path(&StaticEnv::default());

        if let Some(p) = path {
            let path_str = p.to_string_lossy();
            assert!(path_str.contains(AWS_CONFIG_DIR_NAME));
            assert!(path_str.ends_with(AWS_CONFIG_FILE_NAME));
        }
    }

    #[test]
    fn test_get_aws_credentials_path_with_env() {
        let env = StaticEnv::from([(CREDENTIALS_FILE_ENV_VAR, "/custom/path/credentials")]);
        let path = get_aws_credentials_path(&env);
        assert_eq!(path, Some(PathBuf::from("/custom/path/credentials")));
    }

    #[test]
    #[serial]
    fn test_get_aws_credentials_path_from_process_env() {
        let original = env::var(CREDENTIALS_FILE_ENV_VAR).ok();

        unsafe {
            env::set_var(CREDENTIALS_FILE_ENV_VAR, "/process/path/credentials");
        }
        let path = get_aws_credentials_path(&ProcessEnv);
        assert_eq!(path, Some(PathBuf::from("/process/path/credentials")));

        unsafe {
            match original {
                Some(val) => env::set_var(CREDENTIALS_FILE_ENV_VAR, val),
                None => env::remove_var(CREDENTIALS_FILE_ENV_VAR),
            }
        }
    }

    #[test]
    fn test_get_aws_credentials_path_default() {
        let path = get_aws_credentials_path(&StaticEnv::default());

        if let Some(p) = path {
            let path_str = p.to_string_lossy();
            assert!(path_str.contains(AWS_CONFIG_DIR_NAME));
            assert!(path_str.contains(AWS_CREDENTIALS_FILE_NAME));
        }
    }
}
