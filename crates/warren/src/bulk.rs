//! Bulk insertion and erasure.
//!
//! Both operations work on spans rather than repeating the single-slot
//! paths: fill-insert consumes whole erased runs (splitting the last one
//! when it is larger than the remainder) before extending the chain, and
//! range-erase folds each touched span into one erased run per group,
//! dropping wholly-covered groups outright.
//!
//! Panic safety follows the single-insert discipline: values are cloned
//! before any structural edit they feed, so a panicking `Clone` leaves
//! the container valid and holding exactly the elements inserted so far.

use crate::cursor::Cursor;

use crate::warren::Warren;

impl<T> Warren<T> {
    /// Insert `count` clones of `value`.
    ///
    /// Erased slots are reused first, most recently freed runs before
    /// older ones; then the final group's unused back capacity is filled;
    /// any remainder goes into freshly allocated groups (full-size groups
    /// plus one sized to the exact remainder). Never invalidates cursors
    /// or addresses of existing elements.
    pub fn insert_fill(&mut self, count: usize, value: T)
    where
        T: Clone,
    {
        if count == 0 {
            return;
        }
        if count == 1 {
            self.insert(value);
            return;
        }
        if self.groups.is_empty() {
            // First group sized for the whole fill, within policy bounds.
            let capacity = self.sizes.clamp(count);
            self.push_group(capacity);
        }
        let mut remaining = count;
        let mut scratch: Vec<T> = Vec::new();

        // Reusable erased runs, most recently registered group first.
        while remaining > 0 {
            let Some(&id) = self.erased_groups.last() else {
                break;
            };
            let pos = self.pos_of(id);
            let Some(head) = self.groups[pos].free_list_head else {
                debug_assert!(false, "erasures list held a group with no free slots");
                self.unregister_erased(id);
                continue;
            };
            let run_len = self.groups[pos].skipfield.get(head as usize) as usize;
            debug_assert!(run_len >= 1, "free-list head is not a run head");
            let take = run_len.min(remaining);
            scratch.extend(std::iter::repeat_with(|| value.clone()).take(take));

            let exhausted = {
                let group = &mut self.groups[pos];
                if take == run_len {
                    group.pop_free_head();
                } else {
                    // The tail of the run survives as a shorter run and
                    // takes over the free-list node.
                    let new_head = head + take as u16;
                    group.relocate_free_node(head, new_head);
                    group.skipfield.write_run(new_head as usize, (run_len - take) as u16);
                }
                group.skipfield.zero_span(head as usize, take);
                for (offset, item) in scratch.drain(..).enumerate() {
                    group.occupy(head + offset as u16, item);
                }
                group.free_list_head.is_none()
            };
            self.len += take;
            remaining -= take;
            if exhausted {
                self.unregister_erased(id);
            }
        }

        // Unused back capacity of the final group.
        if remaining > 0 {
            if let Some(last) = self.groups.last_mut() {
                let room = last.capacity as usize - last.last_endpoint();
                let take = room.min(remaining);
                for _ in 0..take {
                    let item = value.clone();
                    last.push_back(item);
                    self.len += 1;
                }
                remaining -= take;
            }
        }

        // Fresh groups: full-size while the remainder warrants, then one
        // sized to the exact remainder.
        while remaining > 0 {
            let capacity = remaining.min(self.sizes.max() as usize) as u16;
            let pos = self.push_group(capacity);
            let group = &mut self.groups[pos];
            for _ in 0..capacity {
                let item = value.clone();
                group.push_back(item);
                self.len += 1;
            }
            remaining -= capacity as usize;
        }

        self.refresh_bounds();
    }

    /// Erase every element in `[first, last)`, in container order.
    ///
    /// Three phases: the tail of `first`'s group is folded into one erased
    /// run, wholly-covered groups are deallocated outright, and the head
    /// of `last`'s group is folded likewise. Groups emptied by the range
    /// follow the single-erase rules (deallocated, or reset in place when
    /// sole); erasing the full contents of a multi-group container drops
    /// every group. Elements outside the range keep their addresses and
    /// cursors.
    ///
    /// # Panics
    ///
    /// Panics if either cursor does not belong to this container, if
    /// `first` does not reference a live element, if `last` is neither a
    /// live element nor [`end`](Warren::end), or if `first` follows
    /// `last`.
    pub fn erase_range(&mut self, first: Cursor, last: Cursor) {
        if first == last {
            return;
        }
        let pa = self.pos_of(first.group);
        let pb = self.pos_of(last.group);
        let (sa, sb) = (first.slot as usize, last.slot as usize);
        assert!(
            (pa, sa) <= (pb, sb),
            "erase range requires `first` not to follow `last`"
        );
        assert!(
            self.groups[pa].get(first.slot).is_some(),
            "erase range start does not reference a live element"
        );
        assert!(
            last == self.end || self.groups[pb].get(last.slot).is_some(),
            "erase range end must reference a live element or be the end cursor"
        );

        if pa == pb {
            let erased = self.erase_span_in_group(pa, sa, sb);
            debug_assert!(erased > 0);
            if self.groups[pa].len == 0 {
                self.retire_empty_group(pa);
            }
            self.refresh_bounds();
            return;
        }

        // Phase 1: finish the first group from `first`, unless the range
        // already covers all of its live elements.
        let mut whole_from = pa;
        if sa > self.groups[pa].first_live() as usize {
            let used = self.groups[pa].last_endpoint();
            self.erase_span_in_group(pa, sa, used);
            whole_from = pa + 1;
        }

        // Phase 2: drop wholly-covered groups. When `last` is the end
        // cursor the final group is wholly covered too.
        let last_fully = sb == self.groups[pb].last_endpoint();
        let whole_to = if last_fully { pb + 1 } else { pb };
        self.remove_groups_span(whole_from, whole_to);

        // Phase 3: the head of the last group, up to `last`. The group
        // keeps `last`'s element, so it cannot empty.
        if !last_fully {
            let pos = whole_from;
            let from = self.groups[pos].first_live() as usize;
            if from < sb {
                self.erase_span_in_group(pos, from, sb);
                debug_assert!(self.groups[pos].len > 0);
            }
        }

        self.refresh_bounds();
    }

    /// Erase every live element in slots `[from, to)` of the group at
    /// `pos`, folding the span, together with any run ending just before
    /// it, into a single erased run with one free-list node. Free-list
    /// nodes of runs inside the span are unlinked. Returns the number of
    /// elements dropped; the caller disposes of a group this empties.
    ///
    /// `from` must be a live slot; `to` must be a live slot's index or the
    /// group's last endpoint.
    fn erase_span_in_group(&mut self, pos: usize, from: usize, to: usize) -> usize {
        if from >= to {
            return 0;
        }
        let (id, erased, register) = {
            let group = &mut self.groups[pos];
            let had_free = group.free_list_head.is_some();
            let mut erased = 0usize;
            let mut i = from;
            while i < to {
                let skip = group.skipfield.get(i) as usize;
                if skip == 0 {
                    drop(group.take(i as u16));
                    erased += 1;
                    i += 1;
                } else {
                    // A run wholly inside the span: its node dissolves
                    // into the folded run's single node.
                    group.unlink_free(i as u16);
                    i += skip;
                }
            }

            let span = to - from;
            let left = if from == 0 {
                0
            } else {
                group.skipfield.get(from - 1) as usize
            };
            if left > 0 {
                // Extend the run ending at from-1; its head keeps the
                // free-list node.
                group.skipfield.write_run(from - left, (left + span) as u16);
            } else {
                group.skipfield.write_run(from, span as u16);
                group.push_free_head(from as u16);
            }
            (group.id, erased, !had_free)
        };
        self.len -= erased;
        if register {
            self.register_erased(id);
        }
        erased
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fill_into_empty_sizes_first_group_for_the_count() {
        let mut warren = Warren::with_group_sizes(4, 100);
        warren.insert_fill(10, 7u32);
        assert_eq!(warren.len(), 10);
        assert_eq!(warren.group_count(), 1);
        assert_eq!(warren.capacity(), 10);
        assert!(warren.iter().all(|v| *v == 7));
        warren.audit();
    }

    #[test]
    fn fill_clamps_first_group_to_policy() {
        let mut warren = Warren::with_group_sizes(8, 16);
        warren.insert_fill(3, 1u32);
        assert_eq!(warren.capacity(), 8);
        warren.insert_fill(2, 2);
        // Back capacity of the first group absorbs the second fill.
        assert_eq!(warren.capacity(), 8);
        let collected: Vec<_> = warren.iter().copied().collect();
        assert_eq!(collected, vec![1, 1, 1, 2, 2]);
        warren.audit();
    }

    #[test]
    fn fill_spills_into_full_groups_plus_exact_remainder() {
        let mut warren = Warren::with_group_sizes(4, 10);
        warren.insert_fill(25, 9u8);
        assert_eq!(warren.len(), 25);
        // 10 + 10 + 5: two full groups and an exact-remainder tail.
        assert_eq!(warren.group_count(), 3);
        assert_eq!(warren.capacity(), 25);
        warren.audit();
    }

    #[test]
    fn fill_consumes_whole_runs_most_recent_first() {
        let mut warren = Warren::with_group_sizes(10, 10);
        let cursors: Vec<_> = (0..10).map(|i| warren.insert(i)).collect();
        // Two runs: [2,3] then [6,7]; the second is the fresher one.
        warren.erase(cursors[2]);
        warren.erase(cursors[3]);
        warren.erase(cursors[6]);
        warren.erase(cursors[7]);
        warren.insert_fill(4, 99);
        assert_eq!(warren.len(), 10);
        assert_eq!(warren.capacity(), 10);
        let collected: Vec<_> = warren.iter().copied().collect();
        assert_eq!(collected, vec![0, 1, 99, 99, 4, 5, 99, 99, 8, 9]);
        warren.audit();
    }

    #[test]
    fn fill_splits_an_oversized_run() {
        let mut warren = Warren::with_group_sizes(10, 10);
        let cursors: Vec<_> = (0..10).map(|i| warren.insert(i)).collect();
        for c in &cursors[3..8] {
            warren.erase(*c); // one run of 5
        }
        warren.audit();
        warren.insert_fill(2, 77);
        assert_eq!(warren.len(), 7);
        let collected: Vec<_> = warren.iter().copied().collect();
        assert_eq!(collected, vec![0, 1, 2, 77, 77, 8, 9]);
        warren.audit();
        // The surviving three-slot run is still reusable.
        warren.insert_fill(3, 88);
        assert_eq!(warren.capacity(), 10);
        let collected: Vec<_> = warren.iter().copied().collect();
        assert_eq!(collected, vec![0, 1, 2, 77, 77, 88, 88, 88, 8, 9]);
        warren.audit();
    }

    #[test]
    fn fill_then_back_then_new_groups_in_one_call() {
        let mut warren = Warren::with_group_sizes(4, 4);
        let cursors: Vec<_> = (0..6).map(|i| warren.insert(i)).collect();
        warren.erase(cursors[1]);
        warren.audit();
        // 1 reused slot + 2 back slots + 4 in one new group.
        warren.insert_fill(7, 50);
        assert_eq!(warren.len(), 12);
        assert_eq!(warren.capacity(), 12);
        let collected: Vec<_> = warren.iter().copied().collect();
        assert_eq!(
            collected,
            vec![0, 50, 2, 3, 4, 5, 50, 50, 50, 50, 50, 50]
        );
        warren.audit();
    }

    #[test]
    fn fill_zero_and_one_shortcuts() {
        let mut warren: Warren<u32> = Warren::with_group_sizes(4, 8);
        warren.insert_fill(0, 1);
        assert!(warren.is_empty());
        assert_eq!(warren.capacity(), 0);
        warren.insert_fill(1, 5);
        assert_eq!(warren.len(), 1);
        assert_eq!(warren.capacity(), 4);
        warren.audit();
    }

    #[test]
    fn filled_constructor_round_trip() {
        let warren = Warren::filled_with_group_sizes(9, 3u16, 4, 4);
        assert_eq!(warren.len(), 9);
        assert_eq!(warren.iter().filter(|v| **v == 3).count(), 9);
        warren.audit();
    }

    #[test]
    fn erase_range_inside_one_group() {
        let mut warren = Warren::with_group_sizes(10, 10);
        let cursors: Vec<_> = (0..10).map(|i| warren.insert(i)).collect();
        warren.erase_range(cursors[2], cursors[6]);
        assert_eq!(warren.len(), 6);
        let collected: Vec<_> = warren.iter().copied().collect();
        assert_eq!(collected, vec![0, 1, 6, 7, 8, 9]);
        warren.audit();
        // The folded run is one reusable block.
        let c = warren.insert(42);
        assert_eq!(c.slot_index(), 2);
        warren.audit();
    }

    #[test]
    fn erase_range_folds_contained_runs() {
        let mut warren = Warren::with_group_sizes(12, 12);
        let cursors: Vec<_> = (0..12).map(|i| warren.insert(i)).collect();
        warren.erase(cursors[4]);
        warren.erase(cursors[7]);
        warren.erase(cursors[8]);
        warren.audit();
        // Span covers both existing runs plus live 3, 5, 6, 9.
        warren.erase_range(cursors[3], cursors[10]);
        assert_eq!(warren.len(), 5);
        let collected: Vec<_> = warren.iter().copied().collect();
        assert_eq!(collected, vec![0, 1, 2, 10, 11]);
        warren.audit();
    }

    #[test]
    fn erase_range_merges_with_preceding_run() {
        let mut warren = Warren::with_group_sizes(10, 10);
        let cursors: Vec<_> = (0..10).map(|i| warren.insert(i)).collect();
        warren.erase(cursors[2]);
        warren.erase(cursors[3]);
        warren.audit();
        // [4, 7) sits flush against the run at [2, 4): one merged run.
        warren.erase_range(cursors[4], cursors[7]);
        assert_eq!(warren.len(), 5);
        let collected: Vec<_> = warren.iter().copied().collect();
        assert_eq!(collected, vec![0, 1, 7, 8, 9]);
        warren.audit();
        // LIFO reuse starts at the merged run's head.
        let c = warren.insert(50);
        assert_eq!(c.slot_index(), 2);
        warren.audit();
    }

    #[test]
    fn erase_range_across_groups_drops_interior_groups() {
        let mut warren = Warren::with_group_sizes(4, 4);
        let cursors: Vec<_> = (0..16).map(|i| warren.insert(i)).collect();
        assert_eq!(warren.group_count(), 4);
        // From mid group 0 to mid group 3: groups 1 and 2 vanish.
        warren.erase_range(cursors[2], cursors[13]);
        assert_eq!(warren.len(), 5);
        assert_eq!(warren.capacity(), 8);
        assert_eq!(warren.group_count(), 2);
        let collected: Vec<_> = warren.iter().copied().collect();
        assert_eq!(collected, vec![0, 1, 13, 14, 15]);
        warren.audit();
    }

    #[test]
    fn erase_range_starting_at_a_groups_first_element_drops_it_whole() {
        let mut warren = Warren::with_group_sizes(4, 4);
        let cursors: Vec<_> = (0..12).map(|i| warren.insert(i)).collect();
        warren.erase_range(cursors[4], cursors[9]);
        assert_eq!(warren.len(), 7);
        assert_eq!(warren.group_count(), 2);
        assert_eq!(warren.capacity(), 8);
        let collected: Vec<_> = warren.iter().copied().collect();
        assert_eq!(collected, vec![0, 1, 2, 3, 9, 10, 11]);
        warren.audit();
    }

    #[test]
    fn erase_range_to_end_retreats_end() {
        let mut warren = Warren::with_group_sizes(4, 4);
        let cursors: Vec<_> = (0..10).map(|i| warren.insert(i)).collect();
        warren.erase_range(cursors[5], warren.end());
        assert_eq!(warren.len(), 5);
        assert_eq!(warren.group_count(), 2);
        let collected: Vec<_> = warren.iter().copied().collect();
        assert_eq!(collected, vec![0, 1, 2, 3, 4]);
        // 4 is now the last element before end.
        assert_eq!(warren.prev_cursor(warren.end()), cursors[4]);
        warren.audit();
    }

    #[test]
    fn erase_full_range_of_multi_group_container_drops_all_groups() {
        let mut warren = Warren::with_group_sizes(4, 4);
        for i in 0..10 {
            warren.insert(i);
        }
        warren.erase_range(warren.begin(), warren.end());
        assert!(warren.is_empty());
        assert_eq!(warren.capacity(), 0);
        assert_eq!(warren.begin(), warren.end());
        warren.audit();
    }

    #[test]
    fn erase_full_range_of_sole_group_resets_in_place() {
        let mut warren = Warren::with_group_sizes(8, 8);
        for i in 0..5 {
            warren.insert(i);
        }
        warren.erase_range(warren.begin(), warren.end());
        assert!(warren.is_empty());
        assert_eq!(warren.capacity(), 8);
        assert_eq!(warren.group_count(), 1);
        warren.audit();
        let c = warren.insert(7);
        assert_eq!(c.slot_index(), 0);
        warren.audit();
    }

    #[test]
    fn erase_range_of_begin_prefix_advances_begin() {
        let mut warren = Warren::with_group_sizes(8, 8);
        let cursors: Vec<_> = (0..6).map(|i| warren.insert(i)).collect();
        warren.erase_range(warren.begin(), cursors[3]);
        assert_eq!(warren.get(warren.begin()), Some(&3));
        assert_eq!(warren.len(), 3);
        warren.audit();
    }

    #[test]
    fn erase_empty_range_is_a_no_op() {
        let mut warren = Warren::with_group_sizes(8, 8);
        let c = warren.insert(1);
        warren.erase_range(c, c);
        assert_eq!(warren.len(), 1);
        let mut empty: Warren<u32> = Warren::new();
        let e = empty.begin();
        empty.erase_range(e, e);
        assert!(empty.is_empty());
        warren.audit();
        empty.audit();
    }

    #[test]
    #[should_panic(expected = "not to follow")]
    fn erase_range_rejects_reversed_cursors() {
        let mut warren = Warren::with_group_sizes(8, 8);
        let cursors: Vec<_> = (0..5).map(|i| warren.insert(i)).collect();
        warren.erase_range(cursors[3], cursors[1]);
    }

    #[test]
    #[should_panic(expected = "start does not reference a live element")]
    fn erase_range_rejects_erased_start() {
        let mut warren = Warren::with_group_sizes(8, 8);
        let cursors: Vec<_> = (0..5).map(|i| warren.insert(i)).collect();
        warren.erase(cursors[1]);
        warren.erase_range(cursors[1], cursors[4]);
    }

    #[test]
    fn range_survivors_keep_their_addresses() {
        let mut warren = Warren::with_group_sizes(4, 4);
        let cursors: Vec<_> = (0..12).map(|i| warren.insert(i as u64)).collect();
        let keep = [cursors[0], cursors[10], cursors[11]];
        let addrs: Vec<_> = keep
            .iter()
            .map(|c| warren.get(*c).map(|v| v as *const u64))
            .collect();
        warren.erase_range(cursors[1], cursors[10]);
        for (c, addr) in keep.iter().zip(addrs) {
            assert_eq!(warren.get(*c).map(|v| v as *const u64), addr);
        }
        warren.audit();
    }

    #[cfg(not(miri))]
    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn fill_matches_repeated_single_inserts(
                prefill in 0usize..40,
                gaps in proptest::collection::vec(0usize..40, 0..10),
                count in 0usize..120,
            ) {
                let mut bulk = Warren::with_group_sizes(4, 16);
                let mut single = Warren::with_group_sizes(4, 16);
                let bulk_cursors: Vec<_> = (0..prefill).map(|i| bulk.insert(i)).collect();
                let single_cursors: Vec<_> = (0..prefill).map(|i| single.insert(i)).collect();
                for gap in &gaps {
                    if prefill > 0 {
                        let idx = gap % prefill;
                        if bulk.get(bulk_cursors[idx]).is_some() {
                            bulk.erase(bulk_cursors[idx]);
                            single.erase(single_cursors[idx]);
                        }
                    }
                }
                bulk.insert_fill(count, 999);
                for _ in 0..count {
                    single.insert(999);
                }
                bulk.audit();
                prop_assert_eq!(bulk.len(), single.len());
                let a: Vec<_> = bulk.iter().copied().collect();
                let b: Vec<_> = single.iter().copied().collect();
                prop_assert_eq!(a, b);
            }

            #[test]
            fn random_range_erase_matches_model(
                len in 2usize..80,
                start in 0usize..80,
                span in 1usize..80,
            ) {
                let mut warren = Warren::with_group_sizes(4, 8);
                let cursors: Vec<_> = (0..len).map(|i| warren.insert(i)).collect();
                let start = start % len;
                let stop = (start + span).min(len);
                let last = if stop == len { warren.end() } else { cursors[stop] };
                warren.erase_range(cursors[start], last);
                warren.audit();
                let expected: Vec<_> = (0..start).chain(stop..len).collect();
                let collected: Vec<_> = warren.iter().copied().collect();
                prop_assert_eq!(collected, expected.clone());
                prop_assert_eq!(warren.len(), expected.len());
            }
        }
    }
}
