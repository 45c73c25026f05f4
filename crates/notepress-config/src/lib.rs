//! Configuration management for notepress.
//!
//! Parses `notepress.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `wordpress.base_url`
//! - `wordpress.username`
//! - `wordpress.app_password`

mod expand;

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "notepress.toml";

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override the vault root directory.
    pub vault_root: Option<PathBuf>,
    /// Override the WordPress base URL.
    pub base_url: Option<String>,
}

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Vault configuration (paths are relative strings from TOML).
    vault: VaultConfigRaw,
    /// WordPress configuration.
    pub wordpress: Option<WordPressConfig>,

    /// Resolved vault configuration (set after loading).
    #[serde(skip)]
    pub vault_resolved: VaultConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Raw vault configuration as parsed from TOML (paths as strings).
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct VaultConfigRaw {
    root: Option<String>,
    upload_dir: Option<String>,
}

/// Resolved vault configuration with absolute paths.
#[derive(Debug, Default)]
pub struct VaultConfig {
    /// Vault root: notes and the `assets/images` tree live under it.
    pub root: PathBuf,
    /// Staging directory for upload-ready images.
    pub upload_dir: PathBuf,
}

/// WordPress configuration.
#[derive(Debug, Deserialize)]
pub struct WordPressConfig {
    /// Site base URL (the `wp-json` prefix is appended by the client).
    pub base_url: String,
    /// Account username.
    pub username: String,
    /// Application password for the account.
    pub app_password: String,
}

impl WordPressConfig {
    /// Validate that all required fields are properly set.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any field is empty or has invalid format.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.base_url, "wordpress.base_url")?;
        require_http_url(&self.base_url, "wordpress.base_url")?;
        require_non_empty(&self.username, "wordpress.username")?;
        require_non_empty(&self.app_password, "wordpress.app_password")?;
        Ok(())
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`wordpress.app_password`").
        field: String,
        /// Error message (e.g., "${`WORDPRESS_APP_PASSWORD`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Require a URL field to use http:// or https:// scheme.
fn require_http_url(url: &str, field: &str) -> Result<(), ConfigError> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::Validation(format!(
            "{field} must start with http:// or https://"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `notepress.toml` in current directory and
    /// parents.
    ///
    /// CLI settings are applied after loading and path resolution, allowing
    /// CLI arguments to take precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist or parsing fails.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        Ok(config)
    }

    /// Get validated WordPress configuration.
    ///
    /// Returns the WordPress config if the `[wordpress]` section is present
    /// and all fields are valid. Use this instead of accessing the
    /// `wordpress` field directly when the command requires the remote site.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if the section is missing or invalid.
    pub fn require_wordpress(&self) -> Result<&WordPressConfig, ConfigError> {
        let wp = self.wordpress.as_ref().ok_or_else(|| {
            ConfigError::Validation("[wordpress] section required in config".into())
        })?;
        wp.validate()?;
        Ok(wp)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(root) = &settings.vault_root {
            self.vault_resolved.root.clone_from(root);
        }
        if let Some(base_url) = &settings.base_url
            && let Some(ref mut wp) = self.wordpress
        {
            wp.base_url.clone_from(base_url);
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Create default config with paths relative to current working directory.
    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Create default config with paths relative to given base directory.
    fn default_with_base(base: &Path) -> Self {
        Self {
            vault: VaultConfigRaw::default(),
            wordpress: None,
            vault_resolved: VaultConfig {
                root: base.to_path_buf(),
                upload_dir: base.join(".notepress").join("uploads"),
            },
            config_path: None,
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        // Expand environment variables before path resolution
        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        Ok(config)
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        if let Some(ref mut wp) = self.wordpress {
            wp.base_url = expand::expand_env(&wp.base_url, "wordpress.base_url")?;
            wp.username = expand::expand_env(&wp.username, "wordpress.username")?;
            wp.app_password = expand::expand_env(&wp.app_password, "wordpress.app_password")?;
        }
        Ok(())
    }

    /// Resolve relative paths to absolute paths based on config directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        let root = config_dir.join(self.vault.root.as_deref().unwrap_or("."));
        let upload_dir = match self.vault.upload_dir.as_deref() {
            Some(dir) => config_dir.join(dir),
            None => root.join(".notepress").join("uploads"),
        };
        self.vault_resolved = VaultConfig { root, upload_dir };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn valid_wordpress_config() -> WordPressConfig {
        WordPressConfig {
            base_url: "https://blog.example.com".to_owned(),
            username: "author".to_owned(),
            app_password: "abcd efgh".to_owned(),
        }
    }

    #[test]
    fn test_default_config() {
        let config = Config::default_with_base(Path::new("/vault"));
        assert_eq!(config.vault_resolved.root, PathBuf::from("/vault"));
        assert_eq!(
            config.vault_resolved.upload_dir,
            PathBuf::from("/vault/.notepress/uploads")
        );
        assert!(config.wordpress.is_none());
    }

    #[test]
    fn test_parse_minimal_config() {
        let config: Config = toml::from_str("").unwrap();
        assert!(config.wordpress.is_none());
    }

    #[test]
    fn test_parse_wordpress_section() {
        let toml = r#"
[wordpress]
base_url = "https://blog.example.com"
username = "author"
app_password = "abcd efgh"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        let wp = config.wordpress.unwrap();
        assert_eq!(wp.base_url, "https://blog.example.com");
        assert_eq!(wp.username, "author");
        assert_eq!(wp.app_password, "abcd efgh");
    }

    #[test]
    fn test_resolve_paths() {
        let toml = r#"
[vault]
root = "notes"
upload_dir = "staging"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.resolve_paths(Path::new("/project"));

        assert_eq!(config.vault_resolved.root, PathBuf::from("/project/notes"));
        assert_eq!(
            config.vault_resolved.upload_dir,
            PathBuf::from("/project/staging")
        );
    }

    #[test]
    fn test_resolve_paths_default_upload_dir_under_root() {
        let toml = r#"
[vault]
root = "notes"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.resolve_paths(Path::new("/project"));

        assert_eq!(
            config.vault_resolved.upload_dir,
            PathBuf::from("/project/notes/.notepress/uploads")
        );
    }

    #[test]
    fn test_apply_cli_settings_vault_root() {
        let mut config = Config::default_with_base(Path::new("/vault"));
        let overrides = CliSettings {
            vault_root: Some(PathBuf::from("/other")),
            ..Default::default()
        };

        config.apply_cli_settings(&overrides);
        assert_eq!(config.vault_resolved.root, PathBuf::from("/other"));
    }

    #[test]
    fn test_apply_cli_settings_base_url() {
        let mut config = Config::default_with_base(Path::new("/vault"));
        config.wordpress = Some(valid_wordpress_config());
        let overrides = CliSettings {
            base_url: Some("https://staging.example.com".to_owned()),
            ..Default::default()
        };

        config.apply_cli_settings(&overrides);
        assert_eq!(
            config.wordpress.unwrap().base_url,
            "https://staging.example.com"
        );
    }

    #[test]
    fn test_expand_env_vars_wordpress() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("NP_TEST_APP_PASSWORD", "secret");
        }

        let toml = r#"
[wordpress]
base_url = "https://blog.example.com"
username = "author"
app_password = "${NP_TEST_APP_PASSWORD}"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.expand_env_vars().unwrap();

        assert_eq!(config.wordpress.unwrap().app_password, "secret");

        unsafe {
            std::env::remove_var("NP_TEST_APP_PASSWORD");
        }
    }

    #[test]
    fn test_expand_env_vars_missing_required_var() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("NP_MISSING_PASSWORD");
        }

        let toml = r#"
[wordpress]
base_url = "https://blog.example.com"
username = "author"
app_password = "${NP_MISSING_PASSWORD}"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        let err = config.expand_env_vars().unwrap_err();
        assert!(matches!(err, ConfigError::EnvVar { .. }));
        assert!(err.to_string().contains("NP_MISSING_PASSWORD"));
    }

    #[test]
    fn test_require_wordpress_missing_section() {
        let config = Config::default_with_base(Path::new("/vault"));
        let err = config.require_wordpress().unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("[wordpress]"));
    }

    #[test]
    fn test_require_wordpress_valid() {
        let mut config = Config::default_with_base(Path::new("/vault"));
        config.wordpress = Some(valid_wordpress_config());
        assert!(config.require_wordpress().is_ok());
    }

    #[test]
    fn test_wordpress_validate_empty_password() {
        let config = WordPressConfig {
            app_password: String::new(),
            ..valid_wordpress_config()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("app_password"));
    }

    #[test]
    fn test_wordpress_validate_invalid_url() {
        let config = WordPressConfig {
            base_url: "blog.example.com".to_owned(),
            ..valid_wordpress_config()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("base_url"));
        assert!(err.to_string().contains("http"));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        std::fs::write(
            &path,
            r#"
[vault]
root = "notes"

[wordpress]
base_url = "https://blog.example.com"
username = "author"
app_password = "pw"
"#,
        )
        .unwrap();

        let config = Config::load(Some(&path), None).unwrap();
        assert_eq!(config.vault_resolved.root, dir.path().join("notes"));
        assert_eq!(config.config_path, Some(path));
        assert!(config.require_wordpress().is_ok());
    }

    #[test]
    fn test_load_explicit_path_not_found() {
        let err = Config::load(Some(Path::new("/no/such/notepress.toml")), None).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }
}
