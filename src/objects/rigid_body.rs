use serde::{Deserialize, Serialize};

/// Mass properties consumed by positional separation.
///
/// An inverse mass of `0.0` means infinite mass. A body flagged `is_static` is never
/// displaced, whatever its inverse mass says.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RigidBody {
    pub is_static: bool,
    pub mass: f64,        // 0.0 for static / infinite mass
    pub inverse_mass: f64, // 1.0 / mass (0.0 for static)
}

impl RigidBody {
    /// Creates a dynamic body with the given mass.
    /// If mass is <= 0.0 (or not finite), the body gets infinite mass but stays non-static.
    pub fn new(mass: f64) -> Self {
        if mass > 0.0 && mass.is_finite() {
            Self {
                is_static: false,
                mass,
                inverse_mass: 1.0 / mass,
            }
        } else {
            Self {
                is_static: false,
                mass: 0.0,
                inverse_mass: 0.0,
            }
        }
    }

    /// Creates an immovable body.
    pub fn new_static() -> Self {
        Self {
            is_static: true,
            mass: 0.0,
            inverse_mass: 0.0,
        }
    }

    /// Builds a body straight from an inverse mass, as carried in worker snapshots.
    pub fn from_inverse_mass(is_static: bool, inverse_mass: f64) -> Self {
        let inverse_mass = if inverse_mass.is_finite() {
            inverse_mass.max(0.0)
        } else {
            0.0
        };
        let mass = if inverse_mass > 0.0 { 1.0 / inverse_mass } else { 0.0 };
        Self {
            is_static,
            mass,
            inverse_mass,
        }
    }
}

impl Default for RigidBody {
    fn default() -> Self {
        Self::new(1.0)
    }
}
