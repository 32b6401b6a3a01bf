use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, Result};

pub const ENV_USERNAME_KEY: &str = "INSTAGRAM_USERNAME";
pub const ENV_PASSWORD_KEY: &str = "INSTAGRAM_PASSWORD";
pub const ENV_COMMENT_KEY: &str = "INSTAGRAM_COMMENT";
pub const ENV_PROFILE_URL_KEY: &str = "INSTAGRAM_PROFILE_URL";
pub const ENV_PROFILE_DIR_KEY: &str = "CHROME_USER_DATA_DIR";
pub const ENV_HEADLESS_KEY: &str = "CHROME_HEADLESS";

const DEFAULT_PROFILE_DIR: &str = ".chromium-profile";

/// Sentinels that turn the persistent profile off entirely.
const PROFILE_DISABLE_SENTINELS: [&str; 3] = ["none", "disable", "disabled"];

/// Load key/value pairs from a minimal `.env`-style file.
///
/// Blank lines and `#` comments are skipped, as are lines without a
/// `=`. The first `=` splits key from value; matching single or double
/// quotes around the value are stripped. The result depends on the file
/// content alone.
pub fn load_env<P: AsRef<Path>>(path: P) -> Result<HashMap<String, String>> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(ConfigError::NotFound(path.to_path_buf()));
    }
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        source,
        path: path.to_path_buf(),
    })?;

    let mut values = HashMap::new();
    for raw_line in content.lines() {
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        values.insert(key.trim().to_string(), unquote(value.trim()).to_string());
    }
    Ok(values)
}

fn unquote(value: &str) -> &str {
    let stripped = value
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .or_else(|| {
            value
                .strip_prefix('\'')
                .and_then(|rest| rest.strip_suffix('\''))
        });
    stripped.unwrap_or(value)
}

pub fn required(values: &HashMap<String, String>, key: &str) -> Result<String> {
    let value = values
        .get(key)
        .ok_or_else(|| ConfigError::MissingKey(key.to_string()))?;
    if value.is_empty() {
        return Err(ConfigError::EmptyValue(key.to_string()));
    }
    Ok(value.clone())
}

pub fn optional(values: &HashMap<String, String>, key: &str) -> Option<String> {
    let value = values.get(key)?.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

pub fn parse_bool(value: Option<&str>, default: bool) -> bool {
    let Some(value) = value else {
        return default;
    };
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => true,
        "0" | "false" | "no" | "off" => false,
        _ => default,
    }
}

/// Immutable configuration for one automation run, fully validated
/// before any browser work starts.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub username: String,
    pub password: String,
    pub comment: String,
    pub profile_url: String,
    pub headless: bool,
    pub user_data_dir: Option<PathBuf>,
}

impl RunConfig {
    pub fn from_env_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let values = load_env(path)?;
        Self::from_values(&values)
    }

    pub fn from_values(values: &HashMap<String, String>) -> Result<Self> {
        let username = required(values, ENV_USERNAME_KEY)?;
        let password = required(values, ENV_PASSWORD_KEY)?;
        let comment = required(values, ENV_COMMENT_KEY)?;
        let profile_url = required(values, ENV_PROFILE_URL_KEY)?;
        let headless = parse_bool(optional(values, ENV_HEADLESS_KEY).as_deref(), true);
        let user_data_dir = match optional(values, ENV_PROFILE_DIR_KEY) {
            Some(value) if profile_disabled(&value) => None,
            Some(value) => Some(prepare_profile_dir(expand_home(&value))?),
            None => Some(prepare_profile_dir(PathBuf::from(DEFAULT_PROFILE_DIR))?),
        };
        Ok(Self {
            username,
            password,
            comment,
            profile_url,
            headless,
            user_data_dir,
        })
    }
}

fn profile_disabled(value: &str) -> bool {
    let normalized = value.trim().to_lowercase();
    PROFILE_DISABLE_SENTINELS
        .iter()
        .any(|sentinel| normalized == *sentinel)
}

/// Resolve a leading `~` against the home directory so the profile
/// lands where the user meant, not in a literal `./~` subtree.
fn expand_home(value: &str) -> PathBuf {
    let home = std::env::var_os("HOME").map(PathBuf::from);
    expand_home_with(value, home.as_deref())
}

fn expand_home_with(value: &str, home: Option<&Path>) -> PathBuf {
    let Some(home) = home else {
        return PathBuf::from(value);
    };
    if value == "~" {
        return home.to_path_buf();
    }
    match value.strip_prefix("~/") {
        Some(rest) => home.join(rest),
        None => PathBuf::from(value),
    }
}

fn prepare_profile_dir(path: PathBuf) -> Result<PathBuf> {
    std::fs::create_dir_all(&path).map_err(|source| ConfigError::Profile {
        source,
        path: path.clone(),
    })?;
    Ok(path)
}
