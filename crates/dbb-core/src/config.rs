//! Configuration types and parsing for dbbuilder.yml and credential files

use crate::error::{CoreError, CoreResult};
use crate::newtype_string::SchemaName;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default configuration file name.
pub const CONFIG_FILE_NAME: &str = "dbbuilder.yml";

/// Environment variable overriding the configuration file location.
pub const CONFIG_ENV_VAR: &str = "DBB_CONFIG";

/// Directory under the user's home holding the default configuration.
const CONFIG_HOME_DIR: &str = ".dbbuilder";

/// Main configuration from dbbuilder.yml
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Base directory that schema script directories are relative to
    pub workspace: PathBuf,

    /// Ledger marker that forces every script to be re-applied
    #[serde(default)]
    pub force_rebuild_flag: Option<String>,

    /// Delay between statement submissions, in milliseconds
    #[serde(default = "default_throttle_ms")]
    pub throttle_ms: u64,

    /// Database users treated as disposable test schemas
    #[serde(default = "default_test_users")]
    pub test_users: Vec<String>,

    /// Schemas to migrate, processed in order
    pub schemas: Vec<SchemaConfig>,

    /// Directory of the loaded config file; relative paths resolve against it
    #[serde(skip)]
    pub base_dir: PathBuf,
}

/// One migrated schema
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaConfig {
    /// Logical schema name
    pub name: SchemaName,

    /// Script directory, relative to `workspace`
    pub scripts: PathBuf,

    /// Credential file for normal runs
    pub credentials: PathBuf,

    /// Credential file used with the test profile
    #[serde(default)]
    pub test_credentials: Option<PathBuf>,
}

/// Which credential file to use for each schema
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProfileKind {
    /// `credentials`
    #[default]
    Standard,
    /// `test_credentials`
    Test,
}

/// Contents of a per-schema credential file
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConnectionProfile {
    /// Database location (a DuckDB file path or `:memory:`)
    pub path: String,

    /// Session identity
    pub user: String,
}

fn default_throttle_ms() -> u64 {
    200
}

fn default_test_users() -> Vec<String> {
    vec!["mg_test".to_string(), "mg_data_test".to_string()]
}

const MEMORY_PATH: &str = ":memory:";

fn load_yaml<T: DeserializeOwned>(path: &Path) -> CoreResult<T> {
    if !path.exists() {
        return Err(CoreError::ConfigNotFound {
            path: path.display().to_string(),
        });
    }
    let content = std::fs::read_to_string(path).map_err(|e| CoreError::io(path, e))?;
    serde_yaml::from_str(&content).map_err(|e| CoreError::ConfigParseError {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

fn parent_dir(path: &Path) -> PathBuf {
    path.parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
}

impl Config {
    /// Load configuration from a file path
    pub fn load(path: &Path) -> CoreResult<Self> {
        let mut config: Config = load_yaml(path)?;
        config.base_dir = parent_dir(path);
        config.validate()?;
        log::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Locate the configuration file.
    ///
    /// Priority: explicit path > `DBB_CONFIG` env var > `~/.dbbuilder/dbbuilder.yml`
    pub fn resolve_path(explicit: Option<&str>) -> CoreResult<PathBuf> {
        if let Some(path) = explicit {
            return Ok(PathBuf::from(path));
        }
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            if !path.is_empty() {
                return Ok(PathBuf::from(path));
            }
        }
        dirs::home_dir()
            .map(|home| home.join(CONFIG_HOME_DIR).join(CONFIG_FILE_NAME))
            .ok_or_else(|| CoreError::ConfigInvalid {
                message: format!(
                    "Cannot determine home directory; pass --config or set {}",
                    CONFIG_ENV_VAR
                ),
            })
    }

    /// Validate the configuration
    fn validate(&self) -> CoreResult<()> {
        if self.schemas.is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "At least one schema must be configured".to_string(),
            });
        }

        let mut seen = HashSet::new();
        for schema in &self.schemas {
            if !seen.insert(schema.name.as_str()) {
                return Err(CoreError::ConfigInvalid {
                    message: format!("Duplicate schema name '{}'", schema.name),
                });
            }
            if schema.scripts.as_os_str().is_empty() {
                return Err(CoreError::ConfigInvalid {
                    message: format!("Schema '{}' has an empty scripts path", schema.name),
                });
            }
        }

        if let Some(flag) = &self.force_rebuild_flag {
            if flag.trim().is_empty() {
                return Err(CoreError::ConfigInvalid {
                    message: "force_rebuild_flag cannot be blank".to_string(),
                });
            }
        }

        Ok(())
    }

    /// Absolute workspace directory
    pub fn workspace_absolute(&self) -> PathBuf {
        self.base_dir.join(&self.workspace)
    }

    /// Script root for a schema
    pub fn scripts_root(&self, schema: &SchemaConfig) -> PathBuf {
        self.workspace_absolute().join(&schema.scripts)
    }

    /// Credential file for a schema under the given profile
    pub fn credentials_path(&self, schema: &SchemaConfig, kind: ProfileKind) -> CoreResult<PathBuf> {
        let relative = match kind {
            ProfileKind::Standard => &schema.credentials,
            ProfileKind::Test => {
                schema
                    .test_credentials
                    .as_ref()
                    .ok_or_else(|| CoreError::ConfigInvalid {
                        message: format!(
                            "Schema '{}' has no test_credentials for the test profile",
                            schema.name
                        ),
                    })?
            }
        };
        Ok(self.base_dir.join(relative))
    }

    /// Whether `user` is a designated test identity (case-insensitive)
    pub fn is_test_user(&self, user: &str) -> bool {
        self.test_users.iter().any(|u| u.eq_ignore_ascii_case(user))
    }

    /// Delay inserted before each statement submission
    pub fn throttle(&self) -> Duration {
        Duration::from_millis(self.throttle_ms)
    }
}

impl ConnectionProfile {
    /// Load a credential file.
    ///
    /// A relative database path resolves against the credential file's directory.
    pub fn load(path: &Path) -> CoreResult<Self> {
        let mut profile: ConnectionProfile = load_yaml(path)?;
        if profile.user.trim().is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: format!("Credential file {} has an empty user", path.display()),
            });
        }
        if !profile.is_memory() && Path::new(&profile.path).is_relative() {
            profile.path = parent_dir(path).join(&profile.path).display().to_string();
        }
        Ok(profile)
    }

    /// Whether the profile points at a transient in-memory database
    pub fn is_memory(&self) -> bool {
        self.path == MEMORY_PATH
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
