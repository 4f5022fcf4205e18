use std::path::Path;

use locwatch_logic::ObserverSettings;
use serde::{Deserialize, Serialize};

use crate::{device::DeviceConfig, prelude::*};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
/// Config file for the simulator, every field is optional
pub struct SimConfig {
    pub device: DeviceConfig,
    pub observer: ObserverSettings,
}

impl SimConfig {
    pub fn from_json(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).context("Failed to parse config")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        Self::from_json(&raw)
    }
}

#[cfg(test)]
mod tests {
    use locwatch_logic::{AuthorizationStatus, DesiredAccuracy};

    use super::*;

    #[test]
    fn test_empty_config() {
        let config = SimConfig::from_json("{}").expect("Failed to parse");
        assert_eq!(config, SimConfig::default());
        assert!(config.device.services_enabled);
    }

    #[test]
    fn test_partial_config() {
        let raw = r#"{
            "device": {"heading_available": false, "authorization": "Denied"},
            "observer": {"accuracy": "Kilometer"}
        }"#;

        let config = SimConfig::from_json(raw).expect("Failed to parse");

        assert!(config.device.services_enabled);
        assert!(!config.device.heading_available);
        assert_eq!(config.device.authorization, AuthorizationStatus::Denied);
        assert_eq!(config.observer.accuracy, DesiredAccuracy::Kilometer);
    }

    #[test]
    fn test_bad_config() {
        assert!(SimConfig::from_json(r#"{"observer": {"accuracy": "Perfect"}}"#).is_err());
    }
}
