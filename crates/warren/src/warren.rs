//! The container: a chain of groups behind one header.
//!
//! ```text
//! Warren<T>
//! ├── groups: Vec<Group<T>>         (chain order; position = logical order)
//! ├── positions: IndexMap<GroupId, usize>   (cursor resolution)
//! ├── erased_groups: SmallVec<GroupId>      (groups with free slots, LIFO)
//! ├── begin / end: Cursor           (maintained by every mutation)
//! └── sizes: GroupSizes             (group capacity policy)
//! ```
//!
//! Groups are separately allocated buckets, so element addresses never
//! move; the `groups` vector only shuffles group *headers* (the heap
//! buffers stay put). Removing a group shifts the positions of later
//! groups, which is why cursors carry a [`GroupId`] resolved through
//! `positions` instead of a raw index.
//!
//! Insertion priority: most recently registered group with free slots
//! (head of its own free list), then the final group's back capacity,
//! then a fresh group sized `min(len, max_group_capacity)`.

use std::fmt;

use indexmap::IndexMap;
use smallvec::SmallVec;

use crate::config::GroupSizes;
use crate::cursor::{Cursor, GroupId};
use crate::group::Group;
use crate::iter::{Iter, IterMut};

/// Bucket-allocated unordered container with stable element addresses.
///
/// Insertion and cursor-directed erasure are O(1); iteration skips erased
/// slots in O(1) per contiguous run. Erasing or inserting one element
/// never moves or invalidates any other element: a [`Cursor`] (and any
/// reference re-resolved through it) stays good until its own element is
/// erased.
///
/// Iteration order is insertion order except where an insertion reuses an
/// erased slot, in which case the element takes over the erased element's
/// position. The container is unordered in the sense that no ordering is
/// maintained across mutations; [`sort_by`](Warren::sort_by) imposes one
/// on demand.
pub struct Warren<T> {
    pub(crate) groups: Vec<Group<T>>,
    pub(crate) positions: IndexMap<GroupId, usize>,
    pub(crate) erased_groups: SmallVec<[GroupId; 8]>,
    pub(crate) begin: Cursor,
    pub(crate) end: Cursor,
    pub(crate) len: usize,
    pub(crate) capacity: usize,
    pub(crate) sizes: GroupSizes,
}

impl<T> Warren<T> {
    /// Create an empty container with the default sizing policy for `T`.
    ///
    /// No memory is allocated until the first insertion.
    pub fn new() -> Self {
        Self::from_sizes(GroupSizes::default_for::<T>())
    }

    /// Create an empty container with explicit group capacity bounds.
    ///
    /// # Panics
    ///
    /// Panics if `min < 3` or `min > max`.
    pub fn with_group_sizes(min: u16, max: u16) -> Self {
        Self::from_sizes(GroupSizes::new(min, max))
    }

    /// Create a container holding `count` clones of `value`.
    pub fn filled(count: usize, value: T) -> Self
    where
        T: Clone,
    {
        let mut warren = Self::new();
        warren.insert_fill(count, value);
        warren
    }

    /// Create a container holding `count` clones of `value`, with
    /// explicit group capacity bounds.
    ///
    /// # Panics
    ///
    /// Panics if `min < 3` or `min > max`.
    pub fn filled_with_group_sizes(count: usize, value: T, min: u16, max: u16) -> Self
    where
        T: Clone,
    {
        let mut warren = Self::with_group_sizes(min, max);
        warren.insert_fill(count, value);
        warren
    }

    pub(crate) fn from_sizes(sizes: GroupSizes) -> Self {
        Self {
            groups: Vec::new(),
            positions: IndexMap::new(),
            erased_groups: SmallVec::new(),
            begin: Cursor::NULL,
            end: Cursor::NULL,
            len: 0,
            capacity: 0,
            sizes,
        }
    }

    /// Number of live elements.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the container holds no live elements.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Total slot capacity across all groups.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of storage groups currently allocated.
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// The current `(min, max)` group capacity bounds.
    pub fn group_size_bounds(&self) -> (u16, u16) {
        (self.sizes.min(), self.sizes.max())
    }

    /// Approximate total memory footprint in bytes, including unused
    /// slot capacity and bookkeeping.
    pub fn memory_bytes(&self) -> usize {
        let positions_entry =
            std::mem::size_of::<GroupId>() + 2 * std::mem::size_of::<usize>();
        let erased = if self.erased_groups.spilled() {
            self.erased_groups.capacity() * std::mem::size_of::<GroupId>()
        } else {
            0
        };
        std::mem::size_of::<Self>()
            + self.groups.capacity() * std::mem::size_of::<Group<T>>()
            + self.groups.iter().map(Group::heap_bytes).sum::<usize>()
            + self.positions.capacity() * positions_entry
            + erased
    }

    /// Cursor to the first live element, equal to [`end`](Warren::end)
    /// when the container is empty.
    pub fn begin(&self) -> Cursor {
        self.begin
    }

    /// Cursor one past the last used slot of the final group.
    ///
    /// Not dereferenceable; [`get`](Warren::get) returns `None` for it.
    pub fn end(&self) -> Cursor {
        self.end
    }

    /// Resolve a cursor to its element.
    ///
    /// Returns `None` for the end cursor, for a cursor whose element has
    /// been erased, and for cursors from other containers.
    pub fn get(&self, at: Cursor) -> Option<&T> {
        let &pos = self.positions.get(&at.group)?;
        self.groups[pos].get(at.slot)
    }

    /// Mutable variant of [`get`](Warren::get).
    pub fn get_mut(&mut self, at: Cursor) -> Option<&mut T> {
        let &pos = self.positions.get(&at.group)?;
        self.groups[pos].get_mut(at.slot)
    }

    /// Borrowing iterator over live elements in container order.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter::new(self)
    }

    /// Mutably borrowing iterator over live elements in container order.
    pub fn iter_mut(&mut self) -> IterMut<'_, T> {
        IterMut::new(self)
    }

    /// Insert a value, reusing the most recently erased slot when one
    /// exists, otherwise appending. Returns a cursor to the new element.
    ///
    /// Amortized O(1). Never invalidates cursors or addresses of other
    /// elements.
    pub fn insert(&mut self, value: T) -> Cursor {
        if let Some(&gid) = self.erased_groups.last() {
            let pos = self.pos_of(gid);
            if let Some(head) = self.groups[pos].free_list_head {
                return self.reuse_erased_slot(pos, head, value);
            }
            debug_assert!(false, "erasures list held a group with no free slots");
        }
        self.insert_at_back(value)
    }

    /// Insert the value produced by `make`.
    ///
    /// Convenience for constructing the element at the call site; the
    /// slot selection is identical to [`insert`](Warren::insert).
    pub fn insert_with<F: FnOnce() -> T>(&mut self, make: F) -> Cursor {
        self.insert(make())
    }

    /// Erase the element at `at`, dropping its value. Returns a cursor to
    /// the next live element in container order, or [`end`](Warren::end)
    /// if none follows.
    ///
    /// O(1). Other elements keep their addresses and cursors. A group
    /// whose last live element is erased is deallocated (shrinking
    /// [`capacity`](Warren::capacity)), unless it is the only group, which
    /// is reset in place.
    ///
    /// # Panics
    ///
    /// Panics if `at` does not reference a live element of this
    /// container.
    pub fn erase(&mut self, at: Cursor) -> Cursor {
        self.erase_inner(at).0
    }

    /// Erase the element at `at` and return its value.
    ///
    /// Structurally identical to [`erase`](Warren::erase).
    ///
    /// # Panics
    ///
    /// Panics if `at` does not reference a live element of this
    /// container.
    pub fn remove(&mut self, at: Cursor) -> T {
        self.erase_inner(at).1
    }

    /// Drop every element and deallocate every group. Capacity becomes 0;
    /// the sizing policy is kept.
    pub fn clear(&mut self) {
        self.groups.clear();
        self.positions.clear();
        self.erased_groups.clear();
        self.len = 0;
        self.capacity = 0;
        self.begin = Cursor::NULL;
        self.end = Cursor::NULL;
    }

    /// Exchange the entire contents of two containers. O(1); cursors
    /// follow their elements to the other container.
    pub fn swap(&mut self, other: &mut Self) {
        std::mem::swap(self, other);
    }

    // ── Internal mechanics ──────────────────────────────────────────────

    /// Resolve a group id to its chain position.
    ///
    /// # Panics
    ///
    /// Panics if the group is not in this container (stale cursor, or a
    /// cursor from another container).
    pub(crate) fn pos_of(&self, id: GroupId) -> usize {
        match self.positions.get(&id) {
            Some(&pos) => pos,
            None => panic!("cursor references a group that is not in this container"),
        }
    }

    /// Append a fresh group of the given capacity; returns its position.
    pub(crate) fn push_group(&mut self, capacity: u16) -> usize {
        let group = Group::new(GroupId::next(), capacity);
        let pos = self.groups.len();
        self.positions.insert(group.id, pos);
        self.capacity += capacity as usize;
        self.groups.push(group);
        pos
    }

    /// Remove the group at `pos`, dropping its contents and shifting the
    /// positions of later groups down by one.
    pub(crate) fn remove_group(&mut self, pos: usize) {
        let group = self.groups.remove(pos);
        self.positions.swap_remove(&group.id);
        self.unregister_erased(group.id);
        self.capacity -= group.capacity as usize;
        self.len -= group.len as usize;
        self.refresh_positions_from(pos);
    }

    /// Remove the groups in `[from, to)`, dropping their contents.
    pub(crate) fn remove_groups_span(&mut self, from: usize, to: usize) {
        if from >= to {
            return;
        }
        let removed: SmallVec<[GroupId; 8]> =
            self.groups[from..to].iter().map(|g| g.id).collect();
        for group in self.groups.drain(from..to) {
            self.capacity -= group.capacity as usize;
            self.len -= group.len as usize;
        }
        for id in &removed {
            self.positions.swap_remove(id);
        }
        self.erased_groups.retain(|id| !removed.contains(id));
        self.refresh_positions_from(from);
    }

    fn refresh_positions_from(&mut self, pos: usize) {
        for i in pos..self.groups.len() {
            let id = self.groups[i].id;
            if let Some(entry) = self.positions.get_mut(&id) {
                *entry = i;
            }
        }
    }

    pub(crate) fn register_erased(&mut self, id: GroupId) {
        debug_assert!(!self.erased_groups.contains(&id));
        self.erased_groups.push(id);
    }

    pub(crate) fn unregister_erased(&mut self, id: GroupId) {
        self.erased_groups.retain(|entry| *entry != id);
    }

    /// Recompute `begin` and `end` from the group chain. O(1); used by the
    /// bulk operations, which restructure too much for incremental updates
    /// to stay readable.
    pub(crate) fn refresh_bounds(&mut self) {
        let (first, last) = match (self.groups.first(), self.groups.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => {
                self.begin = Cursor::NULL;
                self.end = Cursor::NULL;
                return;
            }
        };
        self.begin = if self.len == 0 {
            Cursor::new(first.id, 0)
        } else {
            Cursor::new(first.id, first.first_live())
        };
        self.end = Cursor::new(last.id, last.last_endpoint() as u16);
    }

    /// Dispose of a group whose last live element was just erased: the sole
    /// remaining group is reset in place (keeping its allocation), any
    /// other group is unlinked and dropped.
    pub(crate) fn retire_empty_group(&mut self, pos: usize) {
        debug_assert_eq!(self.groups[pos].len, 0);
        if self.groups.len() == 1 {
            let group = &mut self.groups[0];
            group.reset();
            let id = group.id;
            self.unregister_erased(id);
        } else {
            self.remove_group(pos);
        }
    }

    /// Cursor for the slot at `(pos, slot)`, hopping into the next group
    /// when `slot` is the group's last endpoint. On the final group the
    /// last endpoint is the end cursor itself.
    pub(crate) fn live_cursor_at(&self, pos: usize, slot: usize) -> Cursor {
        let group = &self.groups[pos];
        if slot == group.last_endpoint() && pos + 1 < self.groups.len() {
            let next = &self.groups[pos + 1];
            Cursor::new(next.id, next.first_live())
        } else {
            Cursor::new(group.id, slot as u16)
        }
    }

    fn reuse_erased_slot(&mut self, pos: usize, head: u16, value: T) -> Cursor {
        let (id, exhausted) = {
            let group = &mut self.groups[pos];
            let run_len = group.skipfield.get(head as usize);
            debug_assert!(run_len >= 1, "free-list head is not a run head");
            let remainder = run_len - 1;
            if remainder > 0 {
                // The rest of the run becomes its own run, one slot
                // right, and takes over this run's free-list node.
                let new_head = head + 1;
                group.skipfield.write_run(new_head as usize, remainder);
                group.relocate_free_node(head, new_head);
            } else {
                group.pop_free_head();
            }
            group.skipfield.zero(head as usize);
            group.occupy(head, value);
            (group.id, group.free_list_head.is_none())
        };
        if exhausted {
            self.unregister_erased(id);
        }
        self.len += 1;
        let cursor = Cursor::new(id, head);
        if id == self.begin.group && head < self.begin.slot {
            self.begin = cursor;
        }
        cursor
    }

    fn insert_at_back(&mut self, value: T) -> Cursor {
        match self.groups.last_mut() {
            Some(last) if last.has_back_capacity() => {
                let slot = last.push_back(value);
                let id = last.id;
                self.len += 1;
                let cursor = Cursor::new(id, slot);
                self.end = Cursor::new(id, slot + 1);
                if self.len == 1 {
                    self.begin = cursor;
                }
                cursor
            }
            Some(_) => {
                // Grow roughly geometrically: next capacity tracks the
                // current population, within policy.
                let cap = self.len.min(self.sizes.max() as usize) as u16;
                self.append_group_with(cap, value)
            }
            None => {
                let cap = self.sizes.min();
                let cursor = self.append_group_with(cap, value);
                self.begin = cursor;
                cursor
            }
        }
    }

    fn append_group_with(&mut self, capacity: u16, value: T) -> Cursor {
        let pos = self.push_group(capacity);
        let group = &mut self.groups[pos];
        let slot = group.push_back(value);
        let id = group.id;
        self.len += 1;
        self.end = Cursor::new(id, 1);
        Cursor::new(id, slot)
    }

    fn erase_inner(&mut self, at: Cursor) -> (Cursor, T) {
        let pos = self.pos_of(at.group);
        let i = at.slot as usize;
        let value = self.groups[pos].take(at.slot);
        self.len -= 1;

        if self.groups[pos].len > 0 {
            let mut register = false;
            let group = &mut self.groups[pos];
            // Where the next live element sits, read before the field
            // around `i` changes.
            let next_slot = i + 1 + group.skipfield.get(i + 1) as usize;
            let left = if i == 0 { 0 } else { group.skipfield.get(i - 1) };
            let right = group.skipfield.get(i + 1);
            match (left > 0, right > 0) {
                // Isolated: a fresh one-slot run, pushed as free-list head.
                (false, false) => {
                    group.skipfield.set(i, 1);
                    register = group.free_list_head.is_none();
                    group.push_free_head(at.slot);
                }
                // Tail-extend the run ending at i-1. Its head slot is
                // unchanged, so the free list is untouched.
                (true, false) => {
                    let merged = left + 1;
                    group.skipfield.set(i, merged);
                    group.skipfield.set(i - left as usize, merged);
                }
                // Head-extend the run starting at i+1: this slot becomes
                // the run head and inherits the free-list node.
                (false, true) => {
                    let merged = right + 1;
                    group.skipfield.set(i, merged);
                    group.skipfield.set(i + right as usize, merged);
                    group.relocate_free_node(at.slot + 1, at.slot);
                }
                // Bridge two runs. The right run's node is dropped from
                // the free list; the left run's node covers the merge.
                (true, true) => {
                    let merged = left + right + 1;
                    group.skipfield.set(i - left as usize, merged);
                    group.skipfield.set(i + right as usize, merged);
                    group.unlink_free(at.slot + 1);
                }
            }
            let id = group.id;
            if register {
                self.register_erased(id);
            }
            let next = self.live_cursor_at(pos, next_slot);
            if at == self.begin {
                self.begin = next;
            }
            return (next, value);
        }

        // The group has no live elements left.
        self.retire_empty_group(pos);
        self.refresh_bounds();
        let next = match self.groups.get(pos) {
            // A group now occupies the erased group's position: its first
            // live element follows the erased one in container order. The
            // reset sole group also lands here, yielding begin == end.
            Some(group) => Cursor::new(group.id, group.first_live()),
            // The erased group was the final one; end retreated.
            None => self.end,
        };
        (next, value)
    }
}

impl<T> Default for Warren<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for Warren<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T: PartialEq> PartialEq for Warren<T> {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.iter().zip(other.iter()).all(|(a, b)| a == b)
    }
}

impl<T: Eq> Eq for Warren<T> {}

impl<T: Clone> Clone for Warren<T> {
    /// Compact copy: erased slots are not reproduced, and the first group
    /// is sized to hold the whole population where the policy allows.
    fn clone(&self) -> Self {
        let mut out = Self::from_sizes(self.sizes);
        let first = self.sizes.clamp(self.len);
        out.build_from(self.iter().cloned(), self.len, first);
        out
    }
}

impl<T> Extend<T> for Warren<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.insert(value);
        }
    }
}

impl<T> FromIterator<T> for Warren<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut warren = Self::new();
        warren.extend(iter);
        warren
    }
}

impl<T, const N: usize> From<[T; N]> for Warren<T> {
    fn from(values: [T; N]) -> Self {
        values.into_iter().collect()
    }
}

#[cfg(test)]
impl<T> Warren<T> {
    /// Walk the whole structure and assert every invariant. Test-only.
    pub(crate) fn audit(&self) {
        use crate::group::Slot;

        assert_eq!(self.positions.len(), self.groups.len());
        let mut total_len = 0usize;
        let mut total_cap = 0usize;
        for (pos, group) in self.groups.iter().enumerate() {
            assert_eq!(self.positions.get(&group.id), Some(&pos), "position map stale");
            total_len += group.len as usize;
            total_cap += group.capacity as usize;
            assert_eq!(group.skipfield.get(group.capacity as usize), 0, "sentinel dirty");
            if pos + 1 < self.groups.len() {
                assert_eq!(
                    group.last_endpoint(),
                    group.capacity as usize,
                    "non-final group with back capacity"
                );
            }
            if self.groups.len() > 1 {
                assert!(group.len >= 1, "empty group left in chain");
            }

            // Skipfield boundaries versus actual slot states.
            let used = group.last_endpoint();
            let mut run_heads = Vec::new();
            let mut i = 0usize;
            let mut live = 0usize;
            while i < used {
                match &group.slots[i] {
                    Slot::Occupied(_) => {
                        assert_eq!(group.skipfield.get(i), 0, "live slot with nonzero skip");
                        live += 1;
                        i += 1;
                    }
                    Slot::Free { .. } => {
                        let mut j = i;
                        while j < used && group.slots[j].as_ref().is_none() {
                            j += 1;
                        }
                        let run = (j - i) as u16;
                        assert_eq!(group.skipfield.get(i), run, "run head boundary wrong");
                        assert_eq!(group.skipfield.get(j - 1), run, "run tail boundary wrong");
                        run_heads.push(i as u16);
                        i = j;
                    }
                }
            }
            assert_eq!(live, group.len as usize, "group len does not match live slots");

            // Free list is exactly the run heads, doubly linked, acyclic.
            let mut seen = Vec::new();
            let mut node = group.free_list_head;
            let mut prev_expected = crate::group::FREE_END;
            while let Some(slot) = node {
                assert!(seen.len() <= used, "free list cycle");
                match group.slots[slot as usize] {
                    Slot::Free { prev, next } => {
                        assert_eq!(prev, prev_expected, "free-list prev link wrong");
                        seen.push(slot);
                        prev_expected = slot;
                        node = (next != crate::group::FREE_END).then_some(next);
                    }
                    Slot::Occupied(_) => panic!("free list points at a live slot"),
                }
            }
            seen.sort_unstable();
            assert_eq!(seen, run_heads, "free-list nodes are not exactly the run heads");

            let registered = self.erased_groups.contains(&group.id);
            assert_eq!(
                registered,
                group.free_list_head.is_some(),
                "erasures list disagrees with free list"
            );
        }
        assert_eq!(total_len, self.len, "container len out of sync");
        assert_eq!(total_cap, self.capacity, "container capacity out of sync");
        for id in &self.erased_groups {
            assert!(self.positions.contains_key(id), "erasures list holds a dead group");
        }

        if let Some(first) = self.groups.first() {
            let expected_begin = if self.len == 0 {
                Cursor::new(first.id, 0)
            } else {
                Cursor::new(first.id, first.first_live())
            };
            assert_eq!(self.begin, expected_begin, "begin cursor out of sync");
            let last = &self.groups[self.groups.len() - 1];
            assert_eq!(
                self.end,
                Cursor::new(last.id, last.last_endpoint() as u16),
                "end cursor out of sync"
            );
        } else {
            assert_eq!(self.begin, Cursor::NULL);
            assert_eq!(self.end, Cursor::NULL);
            assert_eq!(self.len, 0);
            assert_eq!(self.capacity, 0);
        }
    }
}
