//! Cursor traversal: single steps, bulk advance, distance, and
//! conversions between cursors, indices, and element references.
//!
//! A forward step from a live slot reads the skipfield entry one past it:
//! zero means the neighbor is live, nonzero is the length of an erased
//! run and the step jumps the whole run. Landing on a group's last
//! endpoint crosses into the next group at its first live slot. Backward
//! steps mirror this leftward.
//!
//! [`advance`](Warren::advance) is faster than repeated single steps: it
//! hops whole groups using their live counts and only walks the skipfield
//! inside the two boundary groups. [`distance`](Warren::distance) sums
//! the same way.

use std::cmp::Ordering;

use crate::cursor::Cursor;
use crate::group::Group;
use crate::warren::Warren;

impl<T> Warren<T> {
    /// Cursor to the live element after `at`, or [`end`](Warren::end)
    /// when `at` is the last element. Stepping from `end` stays at `end`.
    ///
    /// # Panics
    ///
    /// Panics if `at` belongs to another container or to a group that no
    /// longer exists.
    pub fn next_cursor(&self, at: Cursor) -> Cursor {
        self.advance(at, 1)
    }

    /// Cursor to the live element before `at`, or
    /// [`begin`](Warren::begin) when `at` is the first element. `at` may
    /// be [`end`](Warren::end).
    ///
    /// # Panics
    ///
    /// Panics if `at` belongs to another container or to a group that no
    /// longer exists.
    pub fn prev_cursor(&self, at: Cursor) -> Cursor {
        self.advance(at, -1)
    }

    /// Move `amount` live elements forward (positive) or backward
    /// (negative), clamping at [`end`](Warren::end) and
    /// [`begin`](Warren::begin).
    ///
    /// O(groups crossed), not O(elements crossed): whole groups are
    /// hopped by their live counts, with skipfield walks only inside the
    /// first and last groups touched.
    ///
    /// # Panics
    ///
    /// Panics if `at` belongs to another container or to a group that no
    /// longer exists.
    pub fn advance(&self, at: Cursor, amount: isize) -> Cursor {
        if self.groups.is_empty() {
            return at;
        }
        if amount >= 0 {
            self.advance_forward(at, amount as usize)
        } else {
            self.advance_backward(at, amount.unsigned_abs())
        }
    }

    /// Number of forward steps from `from` to `to`.
    ///
    /// O(groups between them) plus skipfield walks in the two boundary
    /// groups. `distance(begin(), end())` equals [`len`](Warren::len).
    ///
    /// # Panics
    ///
    /// Panics if either cursor does not belong to this container, or if
    /// `from` is ordered after `to`.
    pub fn distance(&self, from: Cursor, to: Cursor) -> usize {
        if from == to {
            return 0;
        }
        let pa = self.pos_of(from.group);
        let pb = self.pos_of(to.group);
        let (sa, sb) = (from.slot as usize, to.slot as usize);
        assert!(
            (pa, sa) <= (pb, sb),
            "distance requires the first cursor not to follow the second"
        );
        if pa == pb {
            return Self::live_span(&self.groups[pa], sa, sb);
        }
        let first = &self.groups[pa];
        let mut total = Self::live_span(first, sa, first.last_endpoint());
        for group in &self.groups[pa + 1..pb] {
            total += group.len as usize;
        }
        let last = &self.groups[pb];
        total + Self::live_span(last, last.first_live() as usize, sb)
    }

    /// Relative order of two cursors in container order: group chain
    /// position first, slot index within a group second.
    ///
    /// # Panics
    ///
    /// Panics if either cursor does not belong to this container.
    pub fn cursor_order(&self, a: Cursor, b: Cursor) -> Ordering {
        let pa = self.pos_of(a.group);
        let pb = self.pos_of(b.group);
        (pa, a.slot).cmp(&(pb, b.slot))
    }

    /// Zero-based position of `at` in container order; equivalent to
    /// `distance(begin(), at)`.
    ///
    /// # Panics
    ///
    /// Panics if `at` does not belong to this container.
    pub fn index_of(&self, at: Cursor) -> usize {
        self.distance(self.begin, at)
    }

    /// Cursor to the element at zero-based position `index`, clamping to
    /// [`end`](Warren::end) when `index >= len()`.
    pub fn cursor_at(&self, index: usize) -> Cursor {
        if self.groups.is_empty() {
            return self.begin;
        }
        self.advance_forward(self.begin, index)
    }

    /// Recover the cursor for an element reference obtained from this
    /// container. Returns `None` if the reference does not point into any
    /// group's live storage.
    pub fn cursor_of(&self, element: &T) -> Option<Cursor> {
        let slot_size = std::mem::size_of::<crate::group::Slot<T>>();
        let addr = element as *const T as usize;
        for group in self.groups.iter().rev() {
            let base = group.slots.as_ptr() as usize;
            let span = group.last_endpoint() * slot_size;
            if addr >= base && addr < base + span {
                let slot = ((addr - base) / slot_size) as u16;
                return group.get(slot).map(|_| Cursor::new(group.id, slot));
            }
        }
        None
    }

    fn advance_forward(&self, at: Cursor, mut amount: usize) -> Cursor {
        let mut pos = self.pos_of(at.group);
        let mut slot = at.slot as usize;
        if amount == 0 {
            return at;
        }
        loop {
            let group = &self.groups[pos];

            // From the group's first live slot, whole-group hops cover
            // `len` steps each.
            if slot == group.first_live() as usize && amount >= group.len as usize {
                if pos + 1 == self.groups.len() {
                    return self.end;
                }
                amount -= group.len as usize;
                pos += 1;
                let next = &self.groups[pos];
                slot = next.first_live() as usize;
                if amount == 0 {
                    return Cursor::new(next.id, slot as u16);
                }
                continue;
            }

            if group.free_list_head.is_none() {
                // Dense group: position arithmetic instead of walking.
                let left_in_group = group.last_endpoint() - slot;
                if amount < left_in_group {
                    return Cursor::new(group.id, (slot + amount) as u16);
                }
                amount -= left_in_group;
            } else {
                let used = group.last_endpoint();
                while amount > 0 && slot < used {
                    slot = slot + 1 + group.skipfield.get(slot + 1) as usize;
                    amount -= 1;
                }
                if slot < used {
                    return Cursor::new(group.id, slot as u16);
                }
            }

            // Exhausted this group; land on the next one's first live.
            if pos + 1 == self.groups.len() {
                return self.end;
            }
            pos += 1;
            let next = &self.groups[pos];
            slot = next.first_live() as usize;
            if amount == 0 {
                return Cursor::new(next.id, slot as u16);
            }
        }
    }

    fn advance_backward(&self, at: Cursor, mut amount: usize) -> Cursor {
        let mut pos = self.pos_of(at.group);
        let mut slot = at.slot as usize;
        loop {
            let group = &self.groups[pos];
            let first_live = group.first_live() as usize;

            if slot > first_live {
                if group.free_list_head.is_none() {
                    // Dense group: every slot before `slot` is live.
                    if amount <= slot {
                        return Cursor::new(group.id, (slot - amount) as u16);
                    }
                    amount -= slot;
                    slot = first_live;
                } else {
                    while amount > 0 && slot > first_live {
                        slot = slot - 1 - group.skipfield.get(slot - 1) as usize;
                        amount -= 1;
                    }
                    if amount == 0 {
                        return Cursor::new(group.id, slot as u16);
                    }
                }
            }

            // At the group's first live slot with steps remaining: cross
            // into the previous group's last live slot (one step).
            if pos == 0 {
                return self.begin;
            }
            amount -= 1;
            pos -= 1;
            let prev = &self.groups[pos];
            slot = prev.last_live() as usize;
            if amount == 0 {
                return Cursor::new(prev.id, slot as u16);
            }

            // From a last live slot, whole-group hops cover `len` steps.
            while amount >= self.groups[pos].len as usize {
                if pos == 0 {
                    return self.begin;
                }
                amount -= self.groups[pos].len as usize;
                pos -= 1;
                let hopped = &self.groups[pos];
                slot = hopped.last_live() as usize;
                if amount == 0 {
                    return Cursor::new(hopped.id, slot as u16);
                }
            }
        }
    }

    /// Count live slots in `[from, to)` of one group. `from` is expected
    /// to be live or the start of an erased run; `to` is exclusive.
    fn live_span(group: &Group<T>, from: usize, to: usize) -> usize {
        if group.free_list_head.is_none() {
            return to - from;
        }
        let mut i = from + group.skipfield.get(from) as usize;
        let mut count = 0;
        while i < to {
            count += 1;
            i = i + 1 + group.skipfield.get(i + 1) as usize;
        }
        count
    }
}
