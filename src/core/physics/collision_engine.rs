//=========================================================================
// Collision Engine
//=========================================================================
//
// Registry of collidables plus the active detection mode.
//
// Per tick (do_collisions):
//   None     → nothing
//   OneToAll → target vs. every other object, in registration order;
//              a contact notifies both sides (target first)
//   AllToAll → every ordered pair (a, b), a != b; a contact notifies
//              `a` only. The reciprocal pair (b, a) notifies `b`, so
//              each side hears about a contact exactly once per tick.
//
// Two-stage test (collision):
//   broad:  bounding box ∩ bounding box; empty → no contact
//   narrow: hit_boxes(a) × hit_boxes(b) in order; first non-empty wins
//
//=========================================================================

//=== External Dependencies ===============================================

use log::{debug, trace, warn};

//=== Internal Dependencies ===============================================

use super::{Collidable, CollidableId, Collider, CollisionMode};
use crate::core::geometry::Rectangle;

//=== collision() =========================================================

/// Overlap between `a` and `b`, or a zero-area rectangle when they do
/// not touch.
pub fn collision(a: &dyn Collidable, b: &dyn Collidable) -> Rectangle {
    let broad = a.bounding_box().intersection(&b.bounding_box());
    if broad.is_empty() {
        return broad;
    }

    let others = b.hit_boxes();

    a.hit_boxes()
        .iter()
        .flat_map(|ha| others.iter().map(move |hb| ha.intersection(hb)))
        .find(|overlap| !overlap.is_empty())
        .unwrap_or(Rectangle::ZERO)
}

//=== CollisionReport =====================================================

/// What one detection pass did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollisionReport {
    /// Pairs run through `collision`.
    pub tests: usize,

    /// Pairs that produced a non-empty overlap.
    pub contacts: usize,
}

//=== CollisionEngine =====================================================

type Entry = (CollidableId, Box<dyn Collidable>);

pub struct CollisionEngine {
    objects: Vec<Entry>,
    mode: CollisionMode,
    target: Option<CollidableId>,
    next_id: u64,
}

impl CollisionEngine {
    pub fn new(mode: CollisionMode) -> Self {
        Self {
            objects: Vec::new(),
            mode,
            target: None,
            next_id: 0,
        }
    }

    //--- Registry ---------------------------------------------------------

    /// Appends a collidable. Registration order drives test order.
    pub fn register<C>(&mut self, object: C) -> CollidableId
    where
        C: Collidable + 'static,
    {
        let id = CollidableId(self.next_id);
        self.next_id += 1;
        self.objects.push((id, Box::new(object)));
        debug!("Registered collidable {:?} ({} total)", id, self.objects.len());
        id
    }

    /// Removes a collidable and returns it. Clears the target if it was
    /// the target. Unknown ids are ignored.
    pub fn unregister(&mut self, id: CollidableId) -> Option<Box<dyn Collidable>> {
        let pos = self.index_of(id)?;

        if self.target == Some(id) {
            debug!("Target {:?} unregistered, clearing target", id);
            self.target = None;
        }

        debug!("Unregistered collidable {:?}", id);
        Some(self.objects.remove(pos).1)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn get(&self, id: CollidableId) -> Option<&dyn Collidable> {
        self.index_of(id).map(|pos| &*self.objects[pos].1)
    }

    pub fn get_mut(&mut self, id: CollidableId) -> Option<&mut dyn Collidable> {
        let pos = self.index_of(id)?;
        Some(&mut *self.objects[pos].1)
    }

    //--- Mode -------------------------------------------------------------

    /// Sets the detection mode. The target changes only for `OneToAll`
    /// with a registered `target`; otherwise the previous one is kept.
    pub fn set_mode(&mut self, mode: CollisionMode, target: Option<CollidableId>) {
        self.mode = mode;

        if mode == CollisionMode::OneToAll {
            if let Some(id) = target {
                if self.index_of(id).is_some() {
                    self.target = Some(id);
                } else {
                    warn!("Ignoring unregistered collision target {:?}", id);
                }
            }
        }

        debug!("Collision mode {:?}, target {:?}", self.mode, self.target);
    }

    pub fn mode(&self) -> CollisionMode {
        self.mode
    }

    pub fn target(&self) -> Option<CollidableId> {
        self.target
    }

    //--- Detection --------------------------------------------------------

    /// Runs one detection pass with the current mode.
    pub fn do_collisions(&mut self) -> CollisionReport {
        let report = match self.mode {
            CollisionMode::None => CollisionReport::default(),
            CollisionMode::OneToAll => self.one_to_all(),
            CollisionMode::AllToAll => self.all_to_all(),
        };

        trace!(
            "Collision pass ({:?}): {} tests, {} contacts",
            self.mode,
            report.tests,
            report.contacts
        );

        report
    }

    fn one_to_all(&mut self) -> CollisionReport {
        let mut report = CollisionReport::default();

        let Some(t) = self.target.and_then(|id| self.index_of(id)) else {
            return report;
        };

        for o in 0..self.objects.len() {
            if o == t {
                continue;
            }

            report.tests += 1;
            let overlap = collision(&*self.objects[t].1, &*self.objects[o].1);
            if overlap.is_empty() {
                continue;
            }

            report.contacts += 1;
            self.notify(t, o, overlap);
            self.notify(o, t, overlap);
        }

        report
    }

    fn all_to_all(&mut self) -> CollisionReport {
        let mut report = CollisionReport::default();
        let count = self.objects.len();

        for a in 0..count {
            for b in 0..count {
                if a == b {
                    continue;
                }

                report.tests += 1;
                let overlap = collision(&*self.objects[a].1, &*self.objects[b].1);
                if overlap.is_empty() {
                    continue;
                }

                report.contacts += 1;
                self.notify(a, b, overlap);
            }
        }

        report
    }

    //--- notify() ---------------------------------------------------------
    //
    // Calls objects[receiver].on_collision(objects[other]). Indices must
    // differ.
    //
    fn notify(&mut self, receiver: usize, other: usize, overlap: Rectangle) {
        let (receiver, (other_id, other_object)) = split_pair(&mut self.objects, receiver, other);

        receiver.on_collision(
            Collider {
                id: *other_id,
                object: &**other_object,
            },
            overlap,
        );
    }

    fn index_of(&self, id: CollidableId) -> Option<usize> {
        self.objects.iter().position(|(entry, _)| *entry == id)
    }
}

impl Default for CollisionEngine {
    fn default() -> Self {
        Self::new(CollisionMode::default())
    }
}

/// Mutable access to `entries[a]` alongside shared access to `entries[b]`.
fn split_pair(entries: &mut [Entry], a: usize, b: usize) -> (&mut dyn Collidable, &Entry) {
    debug_assert_ne!(a, b);

    if a < b {
        let (left, right) = entries.split_at_mut(b);
        (&mut *left[a].1, &right[0])
    } else {
        let (left, right) = entries.split_at_mut(a);
        (&mut *right[0].1, &left[b])
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
