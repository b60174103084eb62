// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Engine configuration.
//!
//! Every tunable of the scoring and clustering pipeline lives here so
//! deployments can adjust behavior without code changes. Missing fields fall
//! back to the documented defaults.

use crate::domain::candidate::ScoreWeights;
use serde::{Deserialize, Serialize};
use std::path::Path;
use synapse_mesh::MeshConfig;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Top-level engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Identifier of this node in pulse exchanges and decision records.
    pub node_id: String,

    /// Maximum retained decisions; the oldest is evicted beyond this.
    pub history_capacity: usize,

    /// Half-width of the uniform noise added to the top score for luck.
    pub luck_noise_amplitude: f64,

    /// Candidate scoring weights.
    pub weights: ScoreWeights,

    /// Overlap and clustering tunables.
    pub mesh: MeshConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            node_id: "synapse-node".to_string(),
            history_capacity: 1000,
            luck_noise_amplitude: 0.05,
            weights: ScoreWeights::default(),
            mesh: MeshConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Load from a YAML file and validate.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.node_id.is_empty() {
            return Err(ConfigError::Invalid("node_id must not be empty".into()));
        }
        if self.history_capacity == 0 {
            return Err(ConfigError::Invalid(
                "history_capacity must be at least 1".into(),
            ));
        }
        if !(0.0..=0.5).contains(&self.luck_noise_amplitude) {
            return Err(ConfigError::Invalid(format!(
                "luck_noise_amplitude {} outside [0, 0.5]",
                self.luck_noise_amplitude
            )));
        }

        let weight_sum = self.weights.health + self.weights.quality + self.weights.intent_match;
        if (weight_sum - 1.0).abs() > 1e-6 {
            return Err(ConfigError::Invalid(format!(
                "score weights sum to {weight_sum}, expected 1.0"
            )));
        }

        for (name, value) in [
            ("mesh.intent_weight", self.mesh.intent_weight),
            ("mesh.semantic_threshold", self.mesh.semantic_threshold),
            ("mesh.active_edge_threshold", self.mesh.active_edge_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::Invalid(format!(
                    "{name} {value} outside [0, 1]"
                )));
            }
        }
        if self.mesh.reinforcement <= 0.0 {
            return Err(ConfigError::Invalid(
                "mesh.reinforcement must be positive".into(),
            ));
        }
        if self.mesh.overlap_window == 0 {
            return Err(ConfigError::Invalid(
                "mesh.overlap_window must be at least 1".into(),
            ));
        }
        if self.mesh.braid_capacity == 0 {
            return Err(ConfigError::Invalid(
                "mesh.braid_capacity must be at least 1".into(),
            ));
        }

        Ok(())
    }
}
