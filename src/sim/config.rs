use serde::{Deserialize, Serialize};

use super::workload::WorkloadConfig;
use crate::{error::SimError, scheduler::PolicyKind};

/// Top-level run configuration, usually read from JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Enables preemption for policies that support it.
    pub context_switch: bool,
    pub policies: Vec<PolicyKind>,
    pub workload: WorkloadConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            context_switch: true,
            policies: PolicyKind::ALL.to_vec(),
            workload: WorkloadConfig::default(),
        }
    }
}

impl SimConfig {
    pub fn from_json(json: &str) -> Result<Self, SimError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| SimError::Config(e.to_string()))?;
        config.workload.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_uses_defaults() {
        assert_eq!(SimConfig::from_json("{}").unwrap(), SimConfig::default());
    }

    #[test]
    fn parses_tagged_policies() {
        let config = SimConfig::from_json(
            r#"{
                "context_switch": false,
                "policies": [
                    {"kind": "priority"},
                    {"kind": "round_robin", "quantum": 4},
                    {"kind": "round_robin"}
                ],
                "workload": {"seed": 11, "cpu_burst": [2, 6]}
            }"#,
        )
        .unwrap();
        assert!(!config.context_switch);
        assert_eq!(
            config.policies,
            [
                PolicyKind::Priority,
                PolicyKind::RoundRobin { quantum: 4 },
                PolicyKind::RoundRobin { quantum: 3 },
            ]
        );
        assert_eq!(config.workload.seed, 11);
        assert_eq!(config.workload.cpu_burst, (2, 6));
        assert_eq!(config.workload.io_burst, WorkloadConfig::default().io_burst);
    }

    #[test]
    fn malformed_json_is_a_config_error() {
        assert!(matches!(
            SimConfig::from_json("{\"policies\": [{\"kind\": \"lottery\"}]}"),
            Err(SimError::Config(_))
        ));
        assert!(matches!(
            SimConfig::from_json("{\"workload\": {\"p_arrival\": 2.0}}"),
            Err(SimError::Config(_))
        ));
    }
}
