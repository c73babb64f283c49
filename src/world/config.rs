use serde::{Deserialize, Serialize};
use tracing::info;

use crate::collision::{epa, gjk, NarrowPhase};
use crate::common::RestitutionRule;
use crate::error::ConfigError;
use crate::math::Vec2;
use crate::resolution::solver::{self, Solver};

/// Static simulation settings. Every field is optional in JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldConfig {
    /// Acceleration applied to bodies that follow gravity.
    #[serde(default = "default_gravity")]
    pub gravity: Vec2,
    #[serde(default = "default_impulse_iterations")]
    pub impulse_iterations: usize,
    /// Fraction of penetration beyond `slop` corrected per step, in (0, 1].
    #[serde(default = "default_correction_percent")]
    pub correction_percent: f64,
    #[serde(default = "default_slop")]
    pub slop: f64,
    #[serde(default)]
    pub restitution_rule: RestitutionRule,
    /// Closing speed below which contacts do not bounce.
    #[serde(default = "default_restitution_threshold")]
    pub restitution_threshold: f64,
    #[serde(default = "default_gjk_max_iterations")]
    pub gjk_max_iterations: usize,
    #[serde(default = "default_epa_max_iterations")]
    pub epa_max_iterations: usize,
    #[serde(default = "default_epa_tolerance")]
    pub epa_tolerance: f64,
}

fn default_gravity() -> Vec2 {
    Vec2::new(0.0, -9.8)
}

fn default_impulse_iterations() -> usize {
    solver::DEFAULT_IMPULSE_ITERATIONS
}

fn default_correction_percent() -> f64 {
    solver::DEFAULT_CORRECTION_PERCENT
}

fn default_slop() -> f64 {
    solver::DEFAULT_SLOP
}

fn default_restitution_threshold() -> f64 {
    solver::DEFAULT_RESTITUTION_THRESHOLD
}

fn default_gjk_max_iterations() -> usize {
    gjk::DEFAULT_MAX_ITERATIONS
}

fn default_epa_max_iterations() -> usize {
    epa::DEFAULT_MAX_ITERATIONS
}

fn default_epa_tolerance() -> f64 {
    epa::DEFAULT_TOLERANCE
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            gravity: default_gravity(),
            impulse_iterations: default_impulse_iterations(),
            correction_percent: default_correction_percent(),
            slop: default_slop(),
            restitution_rule: RestitutionRule::default(),
            restitution_threshold: default_restitution_threshold(),
            gjk_max_iterations: default_gjk_max_iterations(),
            epa_max_iterations: default_epa_max_iterations(),
            epa_tolerance: default_epa_tolerance(),
        }
    }
}

impl WorldConfig {
    /// Parses and validates a JSON document.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: WorldConfig = serde_json::from_str(json)?;
        config.validate()?;
        info!(
            gravity_x = config.gravity.x,
            gravity_y = config.gravity.y,
            iterations = config.impulse_iterations,
            "loaded world config"
        );
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.gravity.is_finite() {
            return Err(invalid("gravity", "must be finite"));
        }
        if !(self.correction_percent > 0.0 && self.correction_percent <= 1.0) {
            return Err(invalid("correction_percent", format!("must be in (0, 1], got {}", self.correction_percent)));
        }
        if !(self.slop.is_finite() && self.slop >= 0.0) {
            return Err(invalid("slop", format!("must be finite and non-negative, got {}", self.slop)));
        }
        if !(self.restitution_threshold.is_finite() && self.restitution_threshold >= 0.0) {
            return Err(invalid(
                "restitution_threshold",
                format!("must be finite and non-negative, got {}", self.restitution_threshold),
            ));
        }
        if self.gjk_max_iterations == 0 {
            return Err(invalid("gjk_max_iterations", "must be at least 1"));
        }
        if self.epa_max_iterations == 0 {
            return Err(invalid("epa_max_iterations", "must be at least 1"));
        }
        if !(self.epa_tolerance.is_finite() && self.epa_tolerance > 0.0) {
            return Err(invalid("epa_tolerance", format!("must be finite and positive, got {}", self.epa_tolerance)));
        }
        Ok(())
    }

    pub fn narrow_phase(&self) -> NarrowPhase {
        NarrowPhase {
            gjk_max_iterations: self.gjk_max_iterations,
            epa_max_iterations: self.epa_max_iterations,
            epa_tolerance: self.epa_tolerance,
        }
    }

    pub fn solver(&self) -> Solver {
        Solver::new(self.impulse_iterations, self.correction_percent, self.slop, self.restitution_rule)
            .with_restitution_threshold(self.restitution_threshold)
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid { field, reason: reason.into() }
}
