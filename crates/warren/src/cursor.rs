//! Cursors and group identity.
//!
//! A [`Cursor`] encodes the location of one slot as `(group id, slot
//! index)`. It is the stable handle the container hands out on insertion:
//! it keeps addressing the same element until that element is erased, no
//! matter what happens to other elements. Group ids come from a monotonic
//! process-wide counter and are never reused, so a cursor into a dropped
//! group fails resolution instead of aliasing a newer group allocated in
//! its place.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Counter for unique [`GroupId`] allocation.
static GROUP_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identity of one storage group.
///
/// Allocated from a monotonic atomic counter via [`GroupId::next`]; id 0
/// is reserved for the null cursor of an empty container. Ids carry no
/// ordering information about the group chain, since splicing moves
/// groups between containers without renumbering them; chain order is
/// resolved through the owning container.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GroupId(u64);

impl GroupId {
    /// Reserved id used by cursors of an empty container.
    pub(crate) const NULL: GroupId = GroupId(0);

    /// Allocate a fresh, unique group id.
    ///
    /// Each call returns an id that has never been returned before within
    /// this process. Thread-safe.
    pub(crate) fn next() -> Self {
        Self(GROUP_COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Location of one slot: which group, and which slot within it.
///
/// Cursors are plain `Copy` values; they borrow nothing and may be stored
/// freely. Dereference through [`Warren::get`](crate::Warren::get) /
/// [`Warren::get_mut`](crate::Warren::get_mut), or pass to the erase and
/// navigation operations. A cursor obtained from one container must not be
/// used with another (except across [`Warren::splice`](crate::Warren::splice),
/// which transfers group identity to the destination).
///
/// Equality compares locations. Ordering between cursors is a container
/// operation ([`Warren::cursor_order`](crate::Warren::cursor_order))
/// because group ids alone do not encode chain order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Cursor {
    pub(crate) group: GroupId,
    pub(crate) slot: u16,
}

impl Cursor {
    /// Cursor of an empty container: `begin() == end()` with no group.
    pub(crate) const NULL: Cursor = Cursor {
        group: GroupId::NULL,
        slot: 0,
    };

    pub(crate) fn new(group: GroupId, slot: u16) -> Self {
        Self { group, slot }
    }

    /// The id of the group this cursor points into.
    pub fn group_id(&self) -> GroupId {
        self.group
    }

    /// The slot index within the group.
    pub fn slot_index(&self) -> u16 {
        self.slot
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Cursor(group={}, slot={})", self.group, self.slot)
    }
}
