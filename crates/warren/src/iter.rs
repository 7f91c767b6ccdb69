//! Iterators over live elements.
//!
//! All three iterators walk the group chain front-to-back (and
//! back-to-front for the double-ended halves), using the skipfield to
//! jump erased runs. A shared `remaining` count makes the two ends meet
//! exactly once, so every iterator is exact-size and fused.
//!
//! [`IterMut`] hands out `&mut T` without unsafe code by carving each
//! group's slot slice with `split_at_mut` as it goes: every yielded
//! reference owns its disjoint piece of the slice. When the two ends
//! converge on the final unconsumed group, whichever side runs out of
//! groups first takes over the other side's partially walked state.

use std::iter::FusedIterator;

use crate::cursor::Cursor;
use crate::group::{Group, Slot};
use crate::warren::Warren;

/// Borrowing iterator over a [`Warren`], in container order.
///
/// Created by [`Warren::iter`].
pub struct Iter<'a, T> {
    groups: &'a [Group<T>],
    front_group: usize,
    front_slot: usize,
    back_group: usize,
    back_slot: usize,
    remaining: usize,
}

impl<'a, T> Iter<'a, T> {
    pub(crate) fn new(warren: &'a Warren<T>) -> Self {
        let groups = warren.groups.as_slice();
        let mut iter = Iter {
            groups,
            front_group: 0,
            front_slot: 0,
            back_group: 0,
            back_slot: 0,
            remaining: warren.len,
        };
        if warren.len > 0 {
            iter.front_slot = groups[0].first_live() as usize;
            iter.back_group = groups.len() - 1;
            iter.back_slot = groups[iter.back_group].last_live() as usize;
        }
        iter
    }

    /// Cursor for the element [`next`](Iterator::next) would yield, or
    /// the container's end position when exhausted.
    pub fn cursor(&self) -> Option<Cursor> {
        if self.remaining == 0 {
            return None;
        }
        let group = &self.groups[self.front_group];
        Some(Cursor::new(group.id, self.front_slot as u16))
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        if self.remaining == 0 {
            return None;
        }
        let group = &self.groups[self.front_group];
        let value = group.slots[self.front_slot].as_ref();
        debug_assert!(value.is_some(), "iterator front is not on a live slot");
        self.remaining -= 1;
        if self.remaining > 0 {
            let mut slot = self.front_slot + 1 + group.skipfield.get(self.front_slot + 1) as usize;
            if slot == group.last_endpoint() && self.front_group + 1 < self.groups.len() {
                self.front_group += 1;
                slot = self.groups[self.front_group].first_live() as usize;
            }
            self.front_slot = slot;
        }
        value
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> DoubleEndedIterator for Iter<'_, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let group = &self.groups[self.back_group];
        let value = group.slots[self.back_slot].as_ref();
        debug_assert!(value.is_some(), "iterator back is not on a live slot");
        self.remaining -= 1;
        if self.remaining > 0 {
            if self.back_slot == group.first_live() as usize {
                self.back_group -= 1;
                self.back_slot = self.groups[self.back_group].last_live() as usize;
            } else {
                self.back_slot =
                    self.back_slot - 1 - group.skipfield.get(self.back_slot - 1) as usize;
            }
        }
        value
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {
    fn len(&self) -> usize {
        self.remaining
    }
}

impl<T> FusedIterator for Iter<'_, T> {}

impl<T> Clone for Iter<'_, T> {
    fn clone(&self) -> Self {
        Iter {
            groups: self.groups,
            front_group: self.front_group,
            front_slot: self.front_slot,
            back_group: self.back_group,
            back_slot: self.back_slot,
            remaining: self.remaining,
        }
    }
}

/// Double-ended walk over one group's live slots, yielding `&mut T` by
/// splitting the slot slice into disjoint pieces.
struct GroupIterMut<'a, T> {
    slots: &'a mut [Slot<T>],
    skip: &'a [u16],
    /// Group-relative index of `slots[0]`.
    base: usize,
    front: usize,
    back: usize,
    done: bool,
}

impl<'a, T> GroupIterMut<'a, T> {
    fn new(group: &'a mut Group<T>) -> Self {
        let used = group.slots.len();
        let done = group.len == 0;
        let front = group.skipfield.get(0) as usize;
        let back = if done {
            0
        } else {
            used - 1 - group.skipfield.get(used - 1) as usize
        };
        let Group {
            slots, skipfield, ..
        } = group;
        GroupIterMut {
            slots: slots.as_mut_slice(),
            skip: skipfield.prefix(used + 1),
            base: 0,
            front,
            back,
            done,
        }
    }

    fn next(&mut self) -> Option<&'a mut T> {
        if self.done {
            return None;
        }
        let idx = self.front - self.base;
        let slots = std::mem::take(&mut self.slots);
        let (taken, rest) = slots.split_at_mut(idx + 1);
        self.slots = rest;
        self.base = self.front + 1;
        if self.front == self.back {
            self.done = true;
        } else {
            self.front = self.front + 1 + self.skip[self.front + 1] as usize;
        }
        let value = taken.last_mut()?.as_mut();
        debug_assert!(value.is_some(), "iterator front is not on a live slot");
        value
    }

    fn next_back(&mut self) -> Option<&'a mut T> {
        if self.done {
            return None;
        }
        let idx = self.back - self.base;
        let slots = std::mem::take(&mut self.slots);
        let (rest, taken) = slots.split_at_mut(idx);
        self.slots = rest;
        if self.back == self.front {
            self.done = true;
        } else {
            self.back = self.back - 1 - self.skip[self.back - 1] as usize;
        }
        let value = taken.first_mut()?.as_mut();
        debug_assert!(value.is_some(), "iterator back is not on a live slot");
        value
    }
}

/// Mutably borrowing iterator over a [`Warren`], in container order.
///
/// Created by [`Warren::iter_mut`].
pub struct IterMut<'a, T> {
    middle: std::slice::IterMut<'a, Group<T>>,
    front: Option<GroupIterMut<'a, T>>,
    back: Option<GroupIterMut<'a, T>>,
    remaining: usize,
}

impl<'a, T> IterMut<'a, T> {
    pub(crate) fn new(warren: &'a mut Warren<T>) -> Self {
        IterMut {
            middle: warren.groups.iter_mut(),
            front: None,
            back: None,
            remaining: warren.len,
        }
    }
}

impl<'a, T> Iterator for IterMut<'a, T> {
    type Item = &'a mut T;

    fn next(&mut self) -> Option<&'a mut T> {
        if self.remaining == 0 {
            return None;
        }
        loop {
            if let Some(group) = &mut self.front {
                if let Some(value) = group.next() {
                    self.remaining -= 1;
                    return Some(value);
                }
            }
            match self.middle.next() {
                Some(group) => self.front = Some(GroupIterMut::new(group)),
                None => {
                    // Only the back side's group remains; take it over.
                    self.front = self.back.take();
                    self.front.as_ref()?;
                }
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> DoubleEndedIterator for IterMut<'_, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        loop {
            if let Some(group) = &mut self.back {
                if let Some(value) = group.next_back() {
                    self.remaining -= 1;
                    return Some(value);
                }
            }
            match self.middle.next_back() {
                Some(group) => self.back = Some(GroupIterMut::new(group)),
                None => {
                    self.back = self.front.take();
                    self.back.as_ref()?;
                }
            }
        }
    }
}

impl<T> ExactSizeIterator for IterMut<'_, T> {
    fn len(&self) -> usize {
        self.remaining
    }
}

impl<T> FusedIterator for IterMut<'_, T> {}

/// Double-ended walk over one owned group, moving values out.
struct OwnedGroup<T> {
    group: Group<T>,
    front: usize,
    back: usize,
    done: bool,
}

impl<T> OwnedGroup<T> {
    fn new(group: Group<T>) -> Self {
        let used = group.last_endpoint();
        let done = group.len == 0;
        let front = group.first_live() as usize;
        let back = if done {
            0
        } else {
            used - 1 - group.skipfield.get(used - 1) as usize
        };
        OwnedGroup {
            group,
            front,
            back,
            done,
        }
    }

    fn next(&mut self) -> Option<T> {
        if self.done {
            return None;
        }
        let value = self.group.slots[self.front].take_value();
        debug_assert!(value.is_some(), "iterator front is not on a live slot");
        if self.front == self.back {
            self.done = true;
        } else {
            self.front = self.front + 1 + self.group.skipfield.get(self.front + 1) as usize;
        }
        value
    }

    fn next_back(&mut self) -> Option<T> {
        if self.done {
            return None;
        }
        let value = self.group.slots[self.back].take_value();
        debug_assert!(value.is_some(), "iterator back is not on a live slot");
        if self.back == self.front {
            self.done = true;
        } else {
            self.back = self.back - 1 - self.group.skipfield.get(self.back - 1) as usize;
        }
        value
    }
}

/// Owning iterator over a [`Warren`], in container order.
///
/// Created by the [`IntoIterator`] impl for `Warren<T>`. Unconsumed
/// elements are dropped with the iterator.
pub struct IntoIter<T> {
    middle: std::vec::IntoIter<Group<T>>,
    front: Option<OwnedGroup<T>>,
    back: Option<OwnedGroup<T>>,
    remaining: usize,
}

impl<T> IntoIter<T> {
    fn new(warren: Warren<T>) -> Self {
        IntoIter {
            remaining: warren.len,
            middle: warren.groups.into_iter(),
            front: None,
            back: None,
        }
    }
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        if self.remaining == 0 {
            return None;
        }
        loop {
            if let Some(group) = &mut self.front {
                if let Some(value) = group.next() {
                    self.remaining -= 1;
                    return Some(value);
                }
            }
            match self.middle.next() {
                Some(group) => self.front = Some(OwnedGroup::new(group)),
                None => {
                    self.front = self.back.take();
                    self.front.as_ref()?;
                }
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> DoubleEndedIterator for IntoIter<T> {
    fn next_back(&mut self) -> Option<T> {
        if self.remaining == 0 {
            return None;
        }
        loop {
            if let Some(group) = &mut self.back {
                if let Some(value) = group.next_back() {
                    self.remaining -= 1;
                    return Some(value);
                }
            }
            match self.middle.next_back() {
                Some(group) => self.back = Some(OwnedGroup::new(group)),
                None => {
                    self.back = self.front.take();
                    self.back.as_ref()?;
                }
            }
        }
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {
    fn len(&self) -> usize {
        self.remaining
    }
}

impl<T> FusedIterator for IntoIter<T> {}

impl<T> IntoIterator for Warren<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> IntoIter<T> {
        IntoIter::new(self)
    }
}

impl<'a, T> IntoIterator for &'a Warren<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}

impl<'a, T> IntoIterator for &'a mut Warren<T> {
    type Item = &'a mut T;
    type IntoIter = IterMut<'a, T>;

    fn into_iter(self) -> IterMut<'a, T> {
        self.iter_mut()
    }
}
