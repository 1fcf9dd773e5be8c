//! 🔒 Credentials — who we say we are to the route manager.
//!
//! Two ways in:
//! 1. `username` + `password` straight in the config (or `RMX_ROUTE_MANAGER__USERNAME` & co).
//! 2. a Java-style properties file holding one account per environment:
//!    `emxaccount<env>.username=...` and `emxaccount<env>.password=...`
//!
//! Config wins. The file is the fallback. Nothing at all is an error,
//! because the route manager does not do anonymous. 🦆

use anyhow::{Context, Result, bail};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::backends::RouteManagerConfig;

/// 🔑 Basic-auth credentials. `Debug` keeps the password to itself.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    /// 🔍 Resolve credentials for `queue_environment` from the route manager config.
    pub fn resolve(config: &RouteManagerConfig, queue_environment: &str) -> Result<Self> {
        if let (Some(username), Some(password)) = (&config.username, &config.password) {
            return Ok(Credentials {
                username: username.clone(),
                password: password.clone(),
            });
        }

        let Some(credentials_file) = &config.credentials_file else {
            bail!(
                "💀 No credentials for the route manager. Set route_manager.username and \
                 route_manager.password, or point route_manager.credentials_file at a properties \
                 file with emxaccount{queue_environment}.username / .password."
            );
        };

        let path = expand_home(credentials_file);
        let raw = std::fs::read_to_string(&path)
            .context(format!("💀 Couldn't read credentials file '{}'", path.display()))?;
        Self::from_properties(&raw, queue_environment)
            .context(format!("💀 Credentials file '{}' is missing an account", path.display()))
    }

    /// 📜 Pick `emxaccount<env>.username` / `.password` out of a properties document.
    pub fn from_properties(raw: &str, queue_environment: &str) -> Result<Self> {
        let properties = parse_properties(raw);
        let lookup = |suffix: &str| -> Result<String> {
            let key = format!("emxaccount{queue_environment}.{suffix}");
            properties
                .get(key.as_str())
                .map(|value| value.to_string())
                .with_context(|| format!("no '{key}' entry"))
        };
        Ok(Credentials {
            username: lookup("username")?,
            password: lookup("password")?,
        })
    }
}

// -- 📜 `key=value` or `key: value`, one per line. '#' and '!' start comments. no line continuations.
fn parse_properties(raw: &str) -> HashMap<&str, &str> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#') && !line.starts_with('!'))
        .filter_map(|line| {
            let split_at = line.find(['=', ':'])?;
            Some((line[..split_at].trim(), line[split_at + 1..].trim()))
        })
        .collect()
}

// -- 🏠 `~/` means $HOME, like it does everywhere else
fn expand_home(path: &Path) -> PathBuf {
    match (path.strip_prefix("~"), std::env::var_os("HOME")) {
        (Ok(rest), Some(home)) => PathBuf::from(home).join(rest),
        _ => path.to_path_buf(),
    }
}
