use crate::error::{Result, SlotError};
use crate::notify::ErrorPolicy;
use crate::paths;
use crate::session::hash_password;
use crate::types::UserId;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// ServerConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub open_browser: bool,
}

fn default_port() -> u16 {
    3141
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            open_browser: false,
        }
    }
}

// ---------------------------------------------------------------------------
// StorageConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// redb file; relative paths are resolved against the project root.
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

fn default_db_path() -> PathBuf {
    PathBuf::from(paths::DEFAULT_DB_FILE)
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

// ---------------------------------------------------------------------------
// AuthConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserAccount {
    pub username: String,
    pub user_id: UserId,
    /// Lowercase hex SHA-256 of the password.
    pub password_sha256: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default = "default_session_ttl")]
    pub session_ttl_minutes: u64,
    #[serde(default)]
    pub users: Vec<UserAccount>,
}

fn default_session_ttl() -> u64 {
    12 * 60
}

/// Longest accepted session lifetime: ten years.
pub const MAX_SESSION_TTL_MINUTES: u64 = 10 * 365 * 24 * 60;

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_ttl_minutes: default_session_ttl(),
            users: Vec::new(),
        }
    }
}

impl AuthConfig {
    pub fn session_ttl(&self) -> Result<chrono::Duration> {
        let minutes = self.session_ttl_minutes;
        if minutes > MAX_SESSION_TTL_MINUTES {
            return Err(ttl_out_of_range(minutes));
        }
        i64::try_from(minutes)
            .ok()
            .and_then(chrono::Duration::try_minutes)
            .ok_or_else(|| ttl_out_of_range(minutes))
    }
}

fn ttl_out_of_range(minutes: u64) -> SlotError {
    SlotError::Session(format!(
        "auth.session_ttl_minutes {minutes} exceeds the maximum of {MAX_SESSION_TTL_MINUTES}"
    ))
}

// ---------------------------------------------------------------------------
// EditorConfig / ErrorsConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditorConfig {
    /// How long a slot shows "Saved" after a successful save.
    #[serde(default = "default_saved_pulse_ms")]
    pub saved_pulse_ms: u64,
}

fn default_saved_pulse_ms() -> u64 {
    2000
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            saved_pulse_ms: default_saved_pulse_ms(),
        }
    }
}

impl EditorConfig {
    pub fn saved_pulse(&self) -> Duration {
        Duration::from_millis(self.saved_pulse_ms)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorsConfig {
    #[serde(default)]
    pub logout: ErrorPolicy,
    #[serde(default)]
    pub load: ErrorPolicy,
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub version: u32,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub editor: EditorConfig,
    #[serde(default)]
    pub errors: ErrorsConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Self {
        Self {
            version: 1,
            server: ServerConfig::default(),
            storage: StorageConfig::default(),
            auth: AuthConfig::default(),
            editor: EditorConfig::default(),
            errors: ErrorsConfig::default(),
        }
    }

    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        if !path.exists() {
            return Err(SlotError::NotInitialized);
        }
        let data = std::fs::read_to_string(&path)?;
        let cfg: Config = serde_yaml::from_str(&data)?;
        Ok(cfg)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::config_path(root);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&path, data.as_bytes())
    }

    pub fn db_path(&self, root: &Path) -> PathBuf {
        paths::resolve_under(root, &self.storage.path)
    }

    pub fn find_user(&self, username: &str) -> Option<&UserAccount> {
        self.auth.users.iter().find(|u| u.username == username)
    }

    /// Register a new account with a freshly generated user id.
    pub fn add_user(&mut self, username: &str, password: &str) -> Result<&UserAccount> {
        let username = username.trim();
        if username.is_empty() {
            return Err(SlotError::InvalidCredentials);
        }
        if self.find_user(username).is_some() {
            return Err(SlotError::UserExists(username.to_string()));
        }
        self.auth.users.push(UserAccount {
            username: username.to_string(),
            user_id: UserId::generate(),
            password_sha256: hash_password(password),
        });
        let idx = self.auth.users.len() - 1;
        Ok(&self.auth.users[idx])
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        if self.auth.users.is_empty() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "no users configured: nobody can sign in (run 'slotdesk user add')"
                    .to_string(),
            });
        }

        let mut seen = HashSet::new();
        for user in &self.auth.users {
            if !seen.insert(user.username.as_str()) {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Error,
                    message: format!("duplicate username '{}'", user.username),
                });
            }
            let hash_ok = user.password_sha256.len() == 64
                && user.password_sha256.chars().all(|c| c.is_ascii_hexdigit());
            if !hash_ok {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Error,
                    message: format!(
                        "user '{}' has a malformed password_sha256",
                        user.username
                    ),
                });
            }
        }

        if self.auth.session_ttl_minutes == 0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "auth.session_ttl_minutes is 0: every session expires immediately"
                    .to_string(),
            });
        } else if let Err(e) = self.auth.session_ttl() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: e.to_string(),
            });
        }

        if self.editor.saved_pulse_ms == 0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "editor.saved_pulse_ms is 0: the saved indicator never shows"
                    .to_string(),
            });
        }

        warnings
    }
}
