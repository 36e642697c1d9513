pub mod body;
pub mod collidable;
pub mod collider;
pub mod rigid_body;

pub use body::Body;
pub use collidable::Collidable;
pub use collider::{filter_pair, Collider, CollisionTarget, PairFilter};
pub use rigid_body::RigidBody;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identifier of a collidable object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ObjectId(pub u64);

impl From<u64> for ObjectId {
    fn from(raw: u64) -> Self {
        ObjectId(raw)
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
