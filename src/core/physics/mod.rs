//=========================================================================
// Physics
//=========================================================================
//
// Rectangle-based collision detection between registered game objects.
//
// Responsibilities:
// - Collidable capability (bounding box, hit boxes, contact callback)
// - Detection modes: None, OneToAll (target vs. rest), AllToAll
// - Per-tick broad phase (bounding boxes) + narrow phase (hit boxes)
//
// No response, no resolution, no spatial partitioning: objects are told
// about contacts and decide what to do.
//
//=========================================================================

//=== Module Declarations =================================================

mod collision_engine;

//=== Public API ==========================================================

pub use collision_engine::{collision, CollisionEngine, CollisionReport};

//=== External Dependencies ===============================================

use serde::{Deserialize, Serialize};

//=== Internal Dependencies ===============================================

use crate::core::geometry::Rectangle;

//=== Collidable ==========================================================

/// A game object that takes part in collision detection.
pub trait Collidable {
    /// Coarse extent used by the broad phase.
    fn bounding_box(&self) -> Rectangle;

    /// Fine-grained boxes, tested in order by the narrow phase.
    fn hit_boxes(&self) -> Vec<Rectangle> {
        vec![self.bounding_box()]
    }

    /// Called when this object overlaps `other`. `overlap` is the first
    /// non-empty hit box intersection found.
    fn on_collision(&mut self, other: Collider<'_>, overlap: Rectangle);
}

/// The other side of a contact, as seen from `on_collision`.
#[derive(Clone, Copy)]
pub struct Collider<'a> {
    pub id: CollidableId,
    pub object: &'a dyn Collidable,
}

impl std::fmt::Debug for Collider<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collider")
            .field("id", &self.id)
            .field("bounding_box", &self.object.bounding_box())
            .finish()
    }
}

//=== CollisionMode =======================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollisionMode {
    /// Detection disabled.
    None,

    /// Only the target is tested, against every other object.
    OneToAll,

    /// Every ordered pair of distinct objects is tested.
    #[default]
    AllToAll,
}

//=== CollidableId ========================================================

/// Handle returned by [`CollisionEngine::register`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CollidableId(pub(crate) u64);
