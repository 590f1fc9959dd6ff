//! Device configuration.
//!
//! Values are layered, highest precedence first: explicit `with_*` calls,
//! the `IBMQX_TOKEN` / `IBMQX_URL` environment variables, a YAML file, and
//! the built-in defaults. [`DeviceConfig::resolve`] produces the lower three
//! layers; callers apply explicit values on top.

use std::fmt;
use std::path::{Path, PathBuf};

use qbridge_convert::Wires;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{IbmqError, IbmqResult};

pub const DEFAULT_BACKEND: &str = "ibmq_qasm_simulator";
pub const DEFAULT_SHOTS: u32 = 1024;
pub const DEFAULT_HUB: &str = "ibm-q";
pub const DEFAULT_GROUP: &str = "open";
pub const DEFAULT_PROJECT: &str = "main";

pub const TOKEN_ENV: &str = "IBMQX_TOKEN";
pub const URL_ENV: &str = "IBMQX_URL";

/// Wires of a device: a count, or explicit labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WireSpec {
    Count(usize),
    Labels(Wires),
}

impl WireSpec {
    pub fn to_wires(&self) -> Wires {
        match self {
            WireSpec::Count(n) => Wires::range(*n),
            WireSpec::Labels(labels) => labels.clone(),
        }
    }
}

impl Default for WireSpec {
    fn default() -> Self {
        WireSpec::Count(1)
    }
}

#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    pub wires: WireSpec,
    pub backend: String,
    pub shots: u32,
    pub hub: String,
    pub group: String,
    pub project: String,
    #[serde(skip_serializing)]
    pub token: Option<String>,
    /// Jobs API base URL. Unset means the default IBM Q endpoints.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Stored-account file consulted when no token is available.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credentials_path: Option<PathBuf>,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            wires: WireSpec::default(),
            backend: DEFAULT_BACKEND.to_string(),
            shots: DEFAULT_SHOTS,
            hub: DEFAULT_HUB.to_string(),
            group: DEFAULT_GROUP.to_string(),
            project: DEFAULT_PROJECT.to_string(),
            token: None,
            url: None,
            credentials_path: None,
        }
    }
}

impl fmt::Debug for DeviceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceConfig")
            .field("wires", &self.wires)
            .field("backend", &self.backend)
            .field("shots", &self.shots)
            .field("hub", &self.hub)
            .field("group", &self.group)
            .field("project", &self.project)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("url", &self.url)
            .field("credentials_path", &self.credentials_path)
            .finish()
    }
}

impl DeviceConfig {
    pub fn new(wires: WireSpec) -> Self {
        Self {
            wires,
            ..Self::default()
        }
    }

    /// `$CONFIG_DIR/qbridge/ibmq.yaml`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("qbridge").join("ibmq.yaml"))
    }

    /// Parse a YAML file. Missing keys take their defaults.
    pub fn from_file(path: impl AsRef<Path>) -> IbmqResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| IbmqError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_yaml_ng::from_str(&text).map_err(|source| IbmqError::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load `path` (or the default file when it exists), then apply the
    /// process environment.
    pub fn resolve(path: Option<&Path>) -> IbmqResult<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_path().filter(|p| p.is_file()) {
                Some(path) => {
                    debug!("Loading device configuration from {}", path.display());
                    Self::from_file(path)?
                }
                None => Self::default(),
            },
        };
        config.apply_env();
        Ok(config)
    }

    /// Override token and URL from `IBMQX_TOKEN` / `IBMQX_URL`.
    pub fn apply_env(&mut self) {
        self.apply_env_from(|key| std::env::var(key).ok());
    }

    /// Override token and URL from an arbitrary variable lookup.
    /// Empty values are ignored.
    pub fn apply_env_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(token) = lookup(TOKEN_ENV).filter(|v| !v.is_empty()) {
            self.token = Some(token);
        }
        if let Some(url) = lookup(URL_ENV).filter(|v| !v.is_empty()) {
            self.url = Some(url);
        }
    }

    #[must_use]
    pub fn with_wires(mut self, wires: WireSpec) -> Self {
        self.wires = wires;
        self
    }

    #[must_use]
    pub fn with_backend(mut self, backend: impl Into<String>) -> Self {
        self.backend = backend.into();
        self
    }

    #[must_use]
    pub fn with_shots(mut self, shots: u32) -> Self {
        self.shots = shots;
        self
    }

    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    #[must_use]
    pub fn with_hub(mut self, hub: impl Into<String>) -> Self {
        self.hub = hub.into();
        self
    }

    #[must_use]
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = group.into();
        self
    }

    #[must_use]
    pub fn with_project(mut self, project: impl Into<String>) -> Self {
        self.project = project.into();
        self
    }

    #[must_use]
    pub fn with_credentials_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.credentials_path = Some(path.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qbridge_convert::Wire;

    #[test]
    fn test_defaults() {
        let config = DeviceConfig::default();
        assert_eq!(config.backend, "ibmq_qasm_simulator");
        assert_eq!(config.shots, 1024);
        assert_eq!(
            (config.hub.as_str(), config.group.as_str(), config.project.as_str()),
            ("ibm-q", "open", "main")
        );
        assert!(config.token.is_none());
    }

    #[test]
    fn test_debug_redacts_token() {
        let config = DeviceConfig::default().with_token("super-secret");
        let debug = format!("{config:?}");
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn test_env_lookup() {
        let mut config = DeviceConfig::default();
        config.apply_env_from(|key| match key {
            TOKEN_ENV => Some("env-token".to_string()),
            URL_ENV => Some(String::new()),
            _ => None,
        });
        assert_eq!(config.token.as_deref(), Some("env-token"));
        assert!(config.url.is_none());
    }

    #[test]
    fn test_explicit_beats_env() {
        let mut config = DeviceConfig::default();
        config.apply_env_from(|_| Some("from-env".to_string()));
        let config = config.with_token("explicit");
        assert_eq!(config.token.as_deref(), Some("explicit"));
        assert_eq!(config.url.as_deref(), Some("from-env"));
    }

    #[test]
    fn test_wire_spec_yaml() {
        let count: WireSpec = serde_yaml_ng::from_str("3").unwrap();
        assert_eq!(count.to_wires(), Wires::range(3));

        let labels: WireSpec = serde_yaml_ng::from_str("[ancilla, -1, q2]").unwrap();
        let expected: Wires = vec![
            Wire::from("ancilla"),
            Wire::Int(-1),
            Wire::from("q2"),
        ]
        .into();
        assert_eq!(labels.to_wires(), expected);
    }

    #[test]
    fn test_token_never_serialized() {
        let yaml = serde_yaml_ng::to_string(&DeviceConfig::default().with_token("t")).unwrap();
        assert!(!yaml.contains("token"));
    }
}
