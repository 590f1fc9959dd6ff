//! Provider selection.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::DeviceConfig;

/// A hub/group/project triple naming the instance jobs are billed to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Provider {
    pub hub: String,
    pub group: String,
    pub project: String,
}

impl Provider {
    pub fn new(hub: impl Into<String>, group: impl Into<String>, project: impl Into<String>) -> Self {
        Self {
            hub: hub.into(),
            group: group.into(),
            project: project.into(),
        }
    }

    /// The provider named by a device configuration.
    pub fn from_config(config: &DeviceConfig) -> Self {
        Self::new(&config.hub, &config.group, &config.project)
    }

    /// `hub/group/project`.
    pub fn instance(&self) -> String {
        self.to_string()
    }
}

impl Default for Provider {
    fn default() -> Self {
        Self::from_config(&DeviceConfig::default())
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.hub, self.group, self.project)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_instance() {
        assert_eq!(Provider::default().instance(), "ibm-q/open/main");
    }

    #[test]
    fn test_from_config() {
        let config = DeviceConfig::default().with_hub("acme").with_project("lab");
        assert_eq!(Provider::from_config(&config).instance(), "acme/open/lab");
    }
}
