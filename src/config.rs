use std::path::PathBuf;
use std::time::Duration;

/// Application-level constants
pub const APP_NAME: &str = "CarePulse";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Phone number that unlocks the admin role in the demo login.
pub const DEFAULT_ADMIN_CODE: &str = "0000";

/// Shortest accepted phone number, counted in digits. Must admit the admin code.
pub const DEFAULT_MIN_PHONE_LEN: usize = 4;

/// How long a confirmation stays visible before auto-dismissal.
pub const NOTIFICATION_TTL: Duration = Duration::from_secs(3);

/// Well-known key for the cached current-user marker.
pub const SESSION_KEY: &str = "carepulse.currentUser";

pub const ENV_ADMIN_CODE: &str = "CAREPULSE_ADMIN_CODE";
pub const ENV_MIN_PHONE_LEN: &str = "CAREPULSE_MIN_PHONE_LEN";
pub const ENV_DATA_DIR: &str = "CAREPULSE_DATA_DIR";

/// Default tracing filter when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    "carepulse=info,carepulse_lib=info"
}

/// Get the application data directory
/// ~/.carepulse/ on all platforms, falling back to the working directory.
pub fn app_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".carepulse")
}

/// Directory backing the local key-value store (session marker).
pub fn session_store_dir() -> PathBuf {
    app_data_dir().join("session")
}

/// Runtime configuration. Demo conveniences live here instead of being
/// compared as literals at call sites.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub admin_code: String,
    pub min_phone_len: usize,
    pub notification_ttl: Duration,
    /// `None` keeps the session marker in memory only.
    pub data_dir: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            admin_code: DEFAULT_ADMIN_CODE.to_string(),
            min_phone_len: DEFAULT_MIN_PHONE_LEN,
            notification_ttl: NOTIFICATION_TTL,
            data_dir: None,
        }
    }
}

impl AppConfig {
    /// Defaults overridden by `CAREPULSE_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`AppConfig::from_env`] with an injectable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(code) = lookup(ENV_ADMIN_CODE).filter(|c| !c.trim().is_empty()) {
            config.admin_code = code.trim().to_string();
        }

        if let Some(raw) = lookup(ENV_MIN_PHONE_LEN) {
            match raw.trim().parse::<usize>() {
                Ok(n) if n > 0 => config.min_phone_len = n,
                _ => tracing::warn!(value = %raw, "Ignoring invalid {ENV_MIN_PHONE_LEN}"),
            }
        }

        if let Some(dir) = lookup(ENV_DATA_DIR).filter(|d| !d.trim().is_empty()) {
            config.data_dir = Some(PathBuf::from(dir));
        }

        config
    }
}
