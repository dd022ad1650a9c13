use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use formdesk_core::Language;
use serde::Deserialize;
use thiserror::Error;
use url::Url;

const APP_DIR: &str = "formdesk";
const CONFIG_FILENAME: &str = "config.toml";

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub default_language: Language,
    pub storage: StorageConfig,
    pub remote: Option<RemoteConfig>,
}

#[derive(Debug, Clone, Default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Local,
    Remote,
}

/// Connection settings for a remote store. The token is resolved at load
/// time, either inline or from the named environment variable.
#[derive(Clone)]
pub struct RemoteConfig {
    pub url: String,
    pub auth_token: String,
    pub timeout_secs: u64,
    pub connect_timeout_secs: u64,
}

impl fmt::Debug for RemoteConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteConfig")
            .field("url", &self.url)
            .field("auth_token", &"<redacted>")
            .field("timeout_secs", &self.timeout_secs)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .finish()
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing home directory")]
    MissingHomeDir,
    #[error("invalid config path: {0}")]
    InvalidConfigPath(PathBuf),
    #[error("config file not found: {0}")]
    MissingConfigFile(PathBuf),
    #[error("config file permissions too permissive: {0}")]
    InsecurePermissions(PathBuf),
    #[error("invalid default_language value: {0}")]
    InvalidLanguage(String),
    #[error("remote backend selected but [remote] section is missing")]
    MissingRemote,
    #[error("missing remote url")]
    MissingRemoteUrl,
    #[error("invalid remote url: {0}")]
    InvalidRemoteUrl(String),
    #[error("missing remote auth token (set auth_token or auth_token_env)")]
    MissingRemoteToken,
    #[error("environment variable {0} is not set")]
    MissingTokenEnv(String),
    #[error("invalid {field} value: {value}")]
    InvalidTimeout { field: &'static str, value: u64 },
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    default_language: Option<String>,
    storage: Option<StorageFile>,
    remote: Option<RemoteFile>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct StorageFile {
    backend: Option<StorageBackend>,
    path: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RemoteFile {
    url: Option<String>,
    auth_token: Option<String>,
    auth_token_env: Option<String>,
    timeout_secs: Option<u64>,
    connect_timeout_secs: Option<u64>,
}

impl AppConfig {
    pub fn uses_remote(&self) -> bool {
        self.storage.backend == StorageBackend::Remote
    }
}

pub fn load(config_path: Option<PathBuf>) -> Result<AppConfig> {
    let required = config_path.is_some();
    let path = match resolve_config_path(config_path.clone()) {
        Ok(path) => path,
        Err(ConfigError::MissingHomeDir) if !required => return Ok(AppConfig::default()),
        Err(ConfigError::InvalidConfigPath(_)) if !required => return Ok(AppConfig::default()),
        Err(err) => return Err(err),
    };
    match load_at_path(&path, required)? {
        Some(config) => Ok(config),
        None => Ok(AppConfig::default()),
    }
}

pub fn resolve_config_path(custom: Option<PathBuf>) -> Result<PathBuf> {
    match custom {
        Some(path) => {
            if path.as_os_str().is_empty() {
                return Err(ConfigError::InvalidConfigPath(path));
            }
            Ok(path)
        }
        None => {
            let base = if let Some(dir) = env::var_os("XDG_CONFIG_HOME") {
                let path = PathBuf::from(dir);
                if path.as_os_str().is_empty() {
                    return Err(ConfigError::InvalidConfigPath(path));
                }
                path
            } else {
                let home = dirs::home_dir().ok_or(ConfigError::MissingHomeDir)?;
                home.join(".config")
            };
            Ok(base.join(APP_DIR).join(CONFIG_FILENAME))
        }
    }
}

fn load_at_path(path: &Path, required: bool) -> Result<Option<AppConfig>> {
    if !path.exists() {
        if required {
            return Err(ConfigError::MissingConfigFile(path.to_path_buf()));
        }
        return Ok(None);
    }

    ensure_permissions(path)?;
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let parsed: ConfigFile = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Some(merge_config(parsed)?))
}

fn merge_config(parsed: ConfigFile) -> Result<AppConfig> {
    let mut config = AppConfig::default();

    if let Some(language) = parsed.default_language {
        config.default_language = language
            .parse()
            .map_err(|_| ConfigError::InvalidLanguage(language))?;
    }

    if let Some(storage) = parsed.storage {
        if let Some(backend) = storage.backend {
            config.storage.backend = backend;
        }
        config.storage.path = storage.path.filter(|path| !path.as_os_str().is_empty());
    }

    config.remote = match parsed.remote {
        Some(remote) => Some(merge_remote(remote)?),
        None => None,
    };
    if config.uses_remote() && config.remote.is_none() {
        return Err(ConfigError::MissingRemote);
    }

    Ok(config)
}

fn merge_remote(remote: RemoteFile) -> Result<RemoteConfig> {
    let url = remote
        .url
        .map(|url| url.trim().to_string())
        .filter(|url| !url.is_empty())
        .ok_or(ConfigError::MissingRemoteUrl)?;
    let parse_target = match url.strip_prefix("libsql://") {
        Some(rest) => format!("https://{}", rest),
        None => url.clone(),
    };
    Url::parse(&parse_target).map_err(|_| ConfigError::InvalidRemoteUrl(url.clone()))?;

    let auth_token = match (remote.auth_token, remote.auth_token_env) {
        (Some(token), _) if !token.trim().is_empty() => token.trim().to_string(),
        (_, Some(var)) => {
            let token = env::var(&var).map_err(|_| ConfigError::MissingTokenEnv(var.clone()))?;
            if token.trim().is_empty() {
                return Err(ConfigError::MissingTokenEnv(var));
            }
            token.trim().to_string()
        }
        _ => return Err(ConfigError::MissingRemoteToken),
    };

    let timeout_secs = positive("timeout_secs", remote.timeout_secs, DEFAULT_TIMEOUT_SECS)?;
    let connect_timeout_secs = positive(
        "connect_timeout_secs",
        remote.connect_timeout_secs,
        DEFAULT_CONNECT_TIMEOUT_SECS,
    )?;

    Ok(RemoteConfig {
        url,
        auth_token,
        timeout_secs,
        connect_timeout_secs,
    })
}

fn positive(field: &'static str, value: Option<u64>, default: u64) -> Result<u64> {
    match value {
        None => Ok(default),
        Some(0) => Err(ConfigError::InvalidTimeout { field, value: 0 }),
        Some(value) => Ok(value),
    }
}

#[cfg(unix)]
fn ensure_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let metadata = fs::metadata(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let mode = metadata.permissions().mode();
    if mode & 0o077 != 0 {
        return Err(ConfigError::InsecurePermissions(path.to_path_buf()));
    }
    Ok(())
}

#[cfg(not(unix))]
fn ensure_permissions(_path: &Path) -> Result<()> {
    Ok(())
}
