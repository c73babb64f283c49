//! Surface properties of colliders and how two of them combine in a contact.

use serde::{Deserialize, Serialize};

/// Surface response of a collider.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Material {
    /// Coefficient of restitution (bounciness). Range [0, 1].
    /// 0 = perfectly inelastic (no bounce), 1 = perfectly elastic.
    pub bounce: f64,
    /// Coulomb friction coefficient. Range [0, infinity).
    pub friction: f64,
}

impl Material {
    /// Creates a material, clamping `bounce` to [0, 1] and `friction` to be non-negative.
    pub fn new(bounce: f64, friction: f64) -> Self {
        Material { bounce: clamp_unit(bounce), friction: if friction > 0.0 { friction } else { 0.0 } }
    }
}

impl Default for Material {
    fn default() -> Self {
        Material { bounce: 0.25, friction: 0.5 }
    }
}

/// How the bounce values of two colliders combine into one restitution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RestitutionRule {
    #[default]
    Average,
    Product,
    Min,
    Max,
}

impl RestitutionRule {
    /// Combined restitution, always within [0, 1] even for out-of-range inputs.
    pub fn combine(self, a: f64, b: f64) -> f64 {
        let (a, b) = (clamp_unit(a), clamp_unit(b));
        let combined = match self {
            RestitutionRule::Average => (a + b) * 0.5,
            RestitutionRule::Product => a * b,
            RestitutionRule::Min => a.min(b),
            RestitutionRule::Max => a.max(b),
        };
        clamp_unit(combined)
    }
}

/// Clamps to [0, 1], mapping NaN to 0.
fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}
