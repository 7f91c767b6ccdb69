//! Rebuild-based operations: sort, splice, capacity reshaping.
//!
//! Everything here either reconstructs the group chain from scratch
//! (`sort`, `shrink_to_fit`, `reserve`, policy changes that existing
//! groups violate) or stitches two chains together (`splice`). The
//! rebuilds share one primitive, `build_from`: first group of a caller
//! chosen capacity, interior groups at the policy maximum, final group
//! sized to the exact remainder. Rebuilding allocates fresh groups, so
//! every cursor into the old chain is invalidated; splice moves groups
//! intact and keeps cursors into both containers valid.

use std::cmp::Ordering;

use crate::config::GroupSizes;
use crate::cursor::Cursor;
use crate::group::{Slot, FREE_END};
use crate::warren::Warren;

impl<T> Warren<T> {
    /// Populate an empty container with `total` values, the first group
    /// at `first_capacity` and the rest in maximum-size groups plus an
    /// exact-remainder tail. Every group is packed dense (no erased
    /// slots).
    pub(crate) fn build_from<I>(&mut self, values: I, total: usize, first_capacity: u16)
    where
        I: IntoIterator<Item = T>,
    {
        debug_assert!(self.groups.is_empty() && self.len == 0);
        if total == 0 {
            return;
        }
        debug_assert!(first_capacity >= 1);
        let mut values = values.into_iter();
        let mut left = total;
        let mut capacity = first_capacity;
        loop {
            let pos = self.push_group(capacity);
            let take = (capacity as usize).min(left);
            for _ in 0..take {
                let Some(value) = values.next() else {
                    debug_assert!(false, "builder iterator ran short of its declared length");
                    self.refresh_bounds();
                    return;
                };
                self.groups[pos].push_back(value);
                self.len += 1;
            }
            left -= take;
            if left == 0 {
                break;
            }
            capacity = left.min(self.sizes.max() as usize) as u16;
        }
        self.refresh_bounds();
    }

    /// Rebuild the whole container: move every live element, in container
    /// order, into a fresh chain whose first group has `first_capacity`.
    fn repack(&mut self, first_capacity: u16) {
        let total = self.len;
        let old = std::mem::replace(self, Self::from_sizes(self.sizes));
        self.build_from(old, total, first_capacity);
    }

    /// Unused slots at the back of the final group.
    fn trailing_capacity(&self) -> usize {
        match self.groups.last() {
            Some(last) => last.capacity as usize - last.last_endpoint(),
            None => 0,
        }
    }

    /// Convert the final group's unused back capacity into an erased run
    /// so the group can stop being final. Extends a run that ends flush
    /// at the last endpoint; otherwise pushes a fresh free-list node.
    fn seal_trailing_capacity(&mut self) {
        let pos = match self.groups.len().checked_sub(1) {
            Some(pos) => pos,
            None => return,
        };
        let mut newly_erased = None;
        {
            let group = &mut self.groups[pos];
            let used = group.last_endpoint();
            let trail = group.capacity as usize - used;
            if trail == 0 {
                return;
            }
            debug_assert!(used >= 1, "sealing an empty group");
            for _ in 0..trail {
                group.slots.push(Slot::Free {
                    prev: FREE_END,
                    next: FREE_END,
                });
            }
            let left = group.skipfield.get(used - 1) as usize;
            if left == 0 {
                group.skipfield.write_run(used, trail as u16);
                if group.free_list_head.is_none() {
                    newly_erased = Some(group.id);
                }
                group.push_free_head(used as u16);
            } else {
                // A run ends flush at the old endpoint; widen it. Its
                // head keeps the free-list node.
                group.skipfield.write_run(used - left, (left + trail) as u16);
            }
        }
        if let Some(id) = newly_erased {
            self.register_erased(id);
        }
    }

    /// Sort the live elements in place with `T`'s ordering. See
    /// [`sort_by`](Warren::sort_by).
    pub fn sort(&mut self)
    where
        T: Ord,
    {
        self.sort_by(T::cmp);
    }

    /// Reorder the live elements by `compare` (unstable among equals).
    ///
    /// Elements are not moved during comparison: an index array is sorted
    /// against borrowed elements, then the container is rebuilt in the
    /// sorted order. The multiset of elements is preserved. All cursors
    /// into this container are invalidated; a panicking comparator leaves
    /// the container untouched.
    pub fn sort_by<F>(&mut self, mut compare: F)
    where
        F: FnMut(&T, &T) -> Ordering,
    {
        if self.len < 2 {
            return;
        }
        let total = self.len;
        let mut keys: Vec<usize> = (0..total).collect();
        {
            let refs: Vec<&T> = self.iter().collect();
            keys.sort_unstable_by(|&a, &b| compare(refs[a], refs[b]));
        }

        let first = self.sizes.clamp(total);
        let old = std::mem::replace(self, Self::from_sizes(self.sizes));
        let mut buffer: Vec<T> = Vec::with_capacity(total);
        buffer.extend(old);

        // Apply the permutation with swaps: `locate[i]` tracks the current
        // index of the element that started at `i`, `origin[j]` the
        // starting index of the element now at `j`.
        let mut locate: Vec<usize> = (0..total).collect();
        let mut origin: Vec<usize> = (0..total).collect();
        for dst in 0..total {
            let want = keys[dst];
            let src = locate[want];
            buffer.swap(dst, src);
            let displaced = origin[dst];
            origin[dst] = want;
            origin[src] = displaced;
            locate[want] = dst;
            locate[displaced] = src;
        }

        self.build_from(buffer, total, first);
    }

    /// Move every element of `other` into this container, leaving `other`
    /// empty. O(groups), no element is copied or moved in memory, and
    /// cursors into either container remain valid against `self`.
    ///
    /// The result is one source's sequence followed by the other's: the
    /// chain with less unused back capacity goes in front (so the
    /// destination's elements usually come first, but the roles swap when
    /// the destination would waste more). The final group of the front
    /// chain has its unused back capacity converted into an erased run.
    /// Sizing bounds merge to the smaller minimum and the larger maximum;
    /// erased-slot reuse keeps preferring the front chain's most recent
    /// runs.
    pub fn splice(&mut self, other: &mut Self) {
        if other.len == 0 {
            return;
        }
        let min = self.sizes.min().min(other.sizes.min());
        let max = self.sizes.max().max(other.sizes.max());
        if self.len == 0 {
            // Adopt the source chain wholesale (any kept-but-empty group
            // of the destination is dropped).
            let mut taken = std::mem::replace(other, Self::from_sizes(other.sizes));
            taken.sizes = GroupSizes::new(min, max);
            *self = taken;
            return;
        }
        if self.trailing_capacity() > other.trailing_capacity() {
            self.swap(other);
        }
        self.sizes = GroupSizes::new(min, max);

        // The back chain's erasure registrations go in under the front
        // chain's, keeping the front's most recent runs first in reuse
        // priority.
        let mut front = std::mem::take(&mut self.erased_groups);
        self.erased_groups = std::mem::take(&mut other.erased_groups);
        self.erased_groups.append(&mut front);

        self.seal_trailing_capacity();

        let base = self.groups.len();
        self.groups.reserve(other.groups.len());
        for (offset, group) in other.groups.drain(..).enumerate() {
            self.capacity += group.capacity as usize;
            self.positions.insert(group.id, base + offset);
            self.groups.push(group);
        }
        other.positions.clear();
        self.len += other.len;
        other.len = 0;
        other.capacity = 0;
        other.begin = Cursor::NULL;
        other.end = Cursor::NULL;
        self.refresh_bounds();
    }

    /// Repack so that `capacity() == len()` exactly, freeing all unused
    /// slots. Empties of groups entirely when the container is empty.
    /// No-op when capacity is already exact; otherwise rebuilds, which
    /// invalidates all cursors. The exact total may require a final group
    /// below the policy minimum.
    pub fn shrink_to_fit(&mut self) {
        if self.len == self.capacity {
            return;
        }
        if self.len == 0 {
            self.clear();
            return;
        }
        let first = self.len.min(self.sizes.max() as usize) as u16;
        self.repack(first);
    }

    /// Preallocate capacity for at least `amount` elements, limited to
    /// what a single group can hold: the request is clamped into the
    /// policy bounds, so it never exceeds the maximum group capacity.
    /// No-op when current capacity already suffices. On an empty
    /// container this allocates exactly one group; on a non-empty one it
    /// rebuilds with an enlarged first group, invalidating all cursors.
    pub fn reserve(&mut self, amount: usize) {
        if amount == 0 || amount <= self.capacity {
            return;
        }
        let target = self.sizes.clamp(amount);
        if self.len == 0 {
            self.clear();
            self.push_group(target);
            self.refresh_bounds();
        } else {
            let first = target.max(self.sizes.clamp(self.len));
            self.repack(first);
        }
    }

    /// Adopt new group capacity bounds. Existing groups are kept when
    /// they all fit the new bounds; otherwise the container is rebuilt
    /// under the new policy (first group sized to the population, within
    /// bounds), invalidating all cursors.
    ///
    /// # Panics
    ///
    /// Panics if `min < 3` or `min > max`.
    pub fn change_group_sizes(&mut self, min: u16, max: u16) {
        self.sizes = GroupSizes::new(min, max);
        let violates = self
            .groups
            .iter()
            .any(|group| group.capacity < min || group.capacity > max);
        if violates {
            self.repack(self.sizes.clamp(self.len));
        }
    }

    /// Adopt a new minimum group capacity, keeping the maximum. Rebuilds
    /// only if an existing group falls below the new minimum.
    ///
    /// # Panics
    ///
    /// Panics if `min < 3` or `min` exceeds the current maximum.
    pub fn change_minimum_group_size(&mut self, min: u16) {
        self.change_group_sizes(min, self.sizes.max());
    }

    /// Adopt a new maximum group capacity, keeping the minimum. Rebuilds
    /// only if an existing group exceeds the new maximum.
    ///
    /// # Panics
    ///
    /// Panics if `max` is below the current minimum.
    pub fn change_maximum_group_size(&mut self, max: u16) {
        self.change_group_sizes(self.sizes.min(), max);
    }

    /// Drop every element and group, then adopt new capacity bounds.
    /// Equivalent to [`clear`](Warren::clear) followed by adopting the
    /// bounds, with no rebuild.
    ///
    /// # Panics
    ///
    /// Panics if `min < 3` or `min > max`.
    pub fn reinitialize(&mut self, min: u16, max: u16) {
        let sizes = GroupSizes::new(min, max);
        self.clear();
        self.sizes = sizes;
    }
}
