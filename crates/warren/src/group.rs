//! Storage groups: fixed-capacity buckets of slots.
//!
//! A group owns three things: the slot storage (`Vec` reserved to the
//! group's capacity up front, so element addresses never move), the
//! skipfield describing erased runs, and the head of the embedded free
//! list. Free-list links live inside the erased slots themselves: only
//! the first slot of each erased run carries meaningful links, forming a
//! doubly linked list (by slot index) of run heads with LIFO reuse.
//!
//! The slot count only grows at the back: `slots.len()` is the group's
//! last endpoint, the high-water mark of slots ever used. Erasure never
//! shrinks it; erased slots turn into `Slot::Free` in place.

use crate::cursor::GroupId;
use crate::skipfield::Skipfield;

/// In-slot link value meaning "no neighbor" (end of the free list).
pub(crate) const FREE_END: u16 = u16::MAX;

/// One element location: a live value, or free-list bookkeeping.
///
/// Only run-head slots have meaningful links; interior slots of a run
/// hold `FREE_END` placeholders.
#[derive(Clone)]
pub(crate) enum Slot<T> {
    Occupied(T),
    Free { prev: u16, next: u16 },
}

impl<T> Slot<T> {
    #[inline]
    pub(crate) fn as_ref(&self) -> Option<&T> {
        match self {
            Slot::Occupied(value) => Some(value),
            Slot::Free { .. } => None,
        }
    }

    #[inline]
    pub(crate) fn as_mut(&mut self) -> Option<&mut T> {
        match self {
            Slot::Occupied(value) => Some(value),
            Slot::Free { .. } => None,
        }
    }

    /// Move the value out, leaving a placeholder free slot.
    #[inline]
    pub(crate) fn take_value(&mut self) -> Option<T> {
        match std::mem::replace(
            self,
            Slot::Free {
                prev: FREE_END,
                next: FREE_END,
            },
        ) {
            Slot::Occupied(value) => Some(value),
            Slot::Free { .. } => None,
        }
    }
}

/// A fixed-capacity bucket of slots.
pub(crate) struct Group<T> {
    pub(crate) id: GroupId,
    pub(crate) slots: Vec<Slot<T>>,
    pub(crate) skipfield: Skipfield,
    pub(crate) capacity: u16,
    /// Head of the embedded free list: index of the most recently pushed
    /// erased-run head, or `None` when the group has no erasures.
    pub(crate) free_list_head: Option<u16>,
    /// Live element count.
    pub(crate) len: u16,
}

impl<T> Group<T> {
    pub(crate) fn new(id: GroupId, capacity: u16) -> Self {
        Self {
            id,
            slots: Vec::with_capacity(capacity as usize),
            skipfield: Skipfield::new(capacity),
            capacity,
            free_list_head: None,
            len: 0,
        }
    }

    /// Count of slots ever used; the group's one-past-the-last position.
    #[inline]
    pub(crate) fn last_endpoint(&self) -> usize {
        self.slots.len()
    }

    /// Whether the back of the group has unused capacity.
    #[inline]
    pub(crate) fn has_back_capacity(&self) -> bool {
        self.slots.len() < self.capacity as usize
    }

    /// Slot index of the first live element (skips a leading erased run).
    /// For a freshly reset group this is 0.
    #[inline]
    pub(crate) fn first_live(&self) -> u16 {
        self.skipfield.get(0)
    }

    /// Slot index of the last live element. Requires `len >= 1`.
    #[inline]
    pub(crate) fn last_live(&self) -> u16 {
        debug_assert!(self.len >= 1);
        let tail = self.last_endpoint() - 1;
        (tail - self.skipfield.get(tail) as usize) as u16
    }

    #[inline]
    pub(crate) fn get(&self, slot: u16) -> Option<&T> {
        self.slots.get(slot as usize)?.as_ref()
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, slot: u16) -> Option<&mut T> {
        self.slots.get_mut(slot as usize)?.as_mut()
    }

    /// Append a value at the back. Returns the slot index.
    pub(crate) fn push_back(&mut self, value: T) -> u16 {
        debug_assert!(self.has_back_capacity());
        let slot = self.slots.len() as u16;
        self.slots.push(Slot::Occupied(value));
        self.len += 1;
        slot
    }

    /// Write a value into an erased slot (which must already exist).
    pub(crate) fn occupy(&mut self, slot: u16, value: T) {
        debug_assert!(self.slots[slot as usize].as_ref().is_none());
        self.slots[slot as usize] = Slot::Occupied(value);
        self.len += 1;
    }

    /// Take the value out of a live slot, leaving it free with
    /// placeholder links.
    ///
    /// # Panics
    ///
    /// Panics if the slot is out of bounds or not live.
    pub(crate) fn take(&mut self, slot: u16) -> T {
        assert!(
            (slot as usize) < self.slots.len(),
            "cursor slot {slot} is past the group's last endpoint {}",
            self.slots.len()
        );
        let entry = &mut self.slots[slot as usize];
        match std::mem::replace(
            entry,
            Slot::Free {
                prev: FREE_END,
                next: FREE_END,
            },
        ) {
            Slot::Occupied(value) => {
                self.len -= 1;
                value
            }
            old @ Slot::Free { .. } => {
                *entry = old;
                panic!("cursor slot {slot} does not reference a live element");
            }
        }
    }

    fn links_of(&self, slot: u16) -> (u16, u16) {
        match self.slots[slot as usize] {
            Slot::Free { prev, next } => (prev, next),
            Slot::Occupied(_) => {
                debug_assert!(false, "slot {slot} is not a free-list node");
                (FREE_END, FREE_END)
            }
        }
    }

    fn set_prev(&mut self, slot: u16, value: u16) {
        if let Slot::Free { prev, .. } = &mut self.slots[slot as usize] {
            *prev = value;
        } else {
            debug_assert!(false, "slot {slot} is not a free-list node");
        }
    }

    fn set_next(&mut self, slot: u16, value: u16) {
        if let Slot::Free { next, .. } = &mut self.slots[slot as usize] {
            *next = value;
        } else {
            debug_assert!(false, "slot {slot} is not a free-list node");
        }
    }

    /// Push a slot as the new free-list head (LIFO).
    pub(crate) fn push_free_head(&mut self, slot: u16) {
        let next = self.free_list_head.unwrap_or(FREE_END);
        self.slots[slot as usize] = Slot::Free {
            prev: FREE_END,
            next,
        };
        if next != FREE_END {
            self.set_prev(next, slot);
        }
        self.free_list_head = Some(slot);
    }

    /// Pop the current free-list head.
    pub(crate) fn pop_free_head(&mut self) {
        if let Some(head) = self.free_list_head {
            let (_, next) = self.links_of(head);
            if next != FREE_END {
                self.set_prev(next, FREE_END);
                self.free_list_head = Some(next);
            } else {
                self.free_list_head = None;
            }
        }
    }

    /// Remove an arbitrary node from the free list.
    pub(crate) fn unlink_free(&mut self, slot: u16) {
        let (prev, next) = self.links_of(slot);
        if prev != FREE_END {
            self.set_next(prev, next);
        } else {
            self.free_list_head = (next != FREE_END).then_some(next);
        }
        if next != FREE_END {
            self.set_prev(next, prev);
        }
    }

    /// Move a free-list node from one slot to another, fixing neighbor
    /// links and the head pointer. Used when a run's head slot changes
    /// (reuse splitting a run from the left, or erasure extending a run
    /// leftward over the old head).
    pub(crate) fn relocate_free_node(&mut self, from: u16, to: u16) {
        let (prev, next) = self.links_of(from);
        self.slots[to as usize] = Slot::Free { prev, next };
        self.slots[from as usize] = Slot::Free {
            prev: FREE_END,
            next: FREE_END,
        };
        if prev != FREE_END {
            self.set_next(prev, to);
        } else {
            self.free_list_head = Some(to);
        }
        if next != FREE_END {
            self.set_prev(next, to);
        }
    }

    /// Reset in place (sole remaining group emptied): drop all slots,
    /// clear the skipfield and free list, keep the allocation.
    pub(crate) fn reset(&mut self) {
        self.slots.clear();
        self.skipfield.reset();
        self.free_list_head = None;
        self.len = 0;
    }

    /// Approximate heap footprint of this group's buffers.
    pub(crate) fn heap_bytes(&self) -> usize {
        self.slots.capacity() * std::mem::size_of::<Slot<T>>() + self.skipfield.heap_bytes()
    }
}
