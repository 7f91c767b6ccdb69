//! Splice, sort, bulk fill and erase, and capacity reshaping.
//!
//! These are the operations that restructure the group chain wholesale.
//! Splice moves groups intact, so cursors from both containers must keep
//! resolving; sort and the reshaping operations rebuild the chain, so
//! old cursors must stop resolving; bulk fill and range erase must land
//! exactly where the single-element operations would.

use warren::{Cursor, Warren};

/// Insert every value in order, collecting the returned cursors.
fn insert_all<T>(warren: &mut Warren<T>, values: impl IntoIterator<Item = T>) -> Vec<Cursor> {
    values.into_iter().map(|v| warren.insert(v)).collect()
}

/// Snapshot the container's iteration order.
fn contents<T: Copy>(warren: &Warren<T>) -> Vec<T> {
    warren.iter().copied().collect()
}

// ── Splice ────────────────────────────────────────────────────────

#[test]
fn splice_concatenates_and_keeps_cursors_valid() {
    let mut a = Warren::with_group_sizes(3, 3);
    let a_cursors = insert_all(&mut a, [1, 2]);
    let mut b = Warren::with_group_sizes(3, 3);
    let b_cursors = insert_all(&mut b, [3, 4]);

    a.splice(&mut b);

    assert_eq!(contents(&a), vec![1, 2, 3, 4]);
    assert_eq!(a.len(), 4);
    assert!(b.is_empty());
    assert_eq!(b.capacity(), 0, "the source gives up its groups");

    for (cursor, expected) in a_cursors.iter().zip([1, 2]) {
        assert_eq!(
            a.get(*cursor),
            Some(&expected),
            "destination cursor for {expected} must survive the splice"
        );
    }
    for (cursor, expected) in b_cursors.iter().zip([3, 4]) {
        assert_eq!(
            a.get(*cursor),
            Some(&expected),
            "source cursor for {expected} must resolve in the destination"
        );
    }

    // The front chain's unused tail slot became an erased run, so the
    // next insert lands between the two spliced sequences.
    let cursor = a.insert(9);
    assert_eq!(contents(&a), vec![1, 2, 9, 3, 4]);
    assert_eq!(a.get(cursor), Some(&9));
    assert_eq!(a.capacity(), 6, "sealing the tail gap must not allocate");
}

#[test]
fn splice_puts_the_roomier_tail_last() {
    let mut a = Warren::with_group_sizes(8, 8);
    insert_all(&mut a, [1, 2, 3]); // five unused back slots
    let mut b = Warren::with_group_sizes(4, 4);
    insert_all(&mut b, [4, 5, 6, 7]); // none

    a.splice(&mut b);

    // The chain with less unused back capacity goes in front, so the
    // source sequence precedes the destination's here.
    assert_eq!(contents(&a), vec![4, 5, 6, 7, 1, 2, 3]);
    assert_eq!(a.capacity(), 12);
    assert_eq!(a.group_size_bounds(), (4, 8), "bounds merge across the splice");
    assert!(b.is_empty());

    // The kept tail gap still absorbs appends without allocating.
    a.insert(8);
    assert_eq!(contents(&a), vec![4, 5, 6, 7, 1, 2, 3, 8]);
    assert_eq!(a.capacity(), 12);
}

// ── Sort ──────────────────────────────────────────────────────────

#[test]
fn sort_descending_reorders_and_invalidates_cursors() {
    let mut warren = Warren::with_group_sizes(4, 8);
    let cursors = insert_all(&mut warren, [3, 1, 2]);

    warren.sort_by(|a, b| b.cmp(a));

    assert_eq!(contents(&warren), vec![3, 2, 1]);
    assert_eq!(warren.len(), 3);
    for cursor in cursors {
        assert_eq!(
            warren.get(cursor),
            None,
            "pre-sort cursors must not resolve after the rebuild"
        );
    }
}

#[test]
fn sort_compacts_erasure_holes() {
    let mut warren = Warren::with_group_sizes(4, 4);
    let cursors = insert_all(&mut warren, [9, 4, 7, 1, 8, 2]);
    warren.erase(cursors[2]); // drop the 7
    assert!(warren.capacity() > warren.len());

    warren.sort();

    assert_eq!(contents(&warren), vec![1, 2, 4, 8, 9]);
    assert_eq!(warren.capacity(), 5, "the rebuild packs out the hole");
}

// ── Bulk fill and range erase ─────────────────────────────────────

#[test]
fn fill_erase_range_fill_round_trip() {
    let mut warren = Warren::with_group_sizes(4, 8);
    warren.insert_fill(20, 7u32);
    assert_eq!(warren.len(), 20);
    assert_eq!(warren.capacity(), 20, "fill sizes groups to the exact count");

    // Erase elements 5..15: a tail span, a whole middle stretch, and a
    // head span across three groups.
    let first = warren.advance(warren.begin(), 5);
    let last = warren.advance(warren.begin(), 15);
    warren.erase_range(first, last);
    assert_eq!(warren.len(), 10);
    assert_eq!(warren.distance(warren.begin(), warren.end()), 10);

    // Refill exactly into the folded runs: no allocation, and the new
    // stamp occupies exactly the erased middle.
    warren.insert_fill(10, 8u32);
    assert_eq!(warren.len(), 20);
    assert_eq!(warren.capacity(), 20);

    let mut expected = vec![7u32; 5];
    expected.extend(std::iter::repeat(8).take(10));
    expected.extend(std::iter::repeat(7).take(5));
    assert_eq!(contents(&warren), expected);
}

#[test]
fn erase_range_drops_wholly_covered_groups() {
    let mut warren = Warren::with_group_sizes(4, 4);
    let cursors = insert_all(&mut warren, 0..16);
    assert_eq!(warren.group_count(), 4);

    warren.erase_range(cursors[2], cursors[13]);

    assert_eq!(contents(&warren), vec![0, 1, 13, 14, 15]);
    assert_eq!(warren.group_count(), 2, "fully covered groups are freed");
    assert_eq!(warren.capacity(), 8);
    assert_eq!(warren.get(cursors[14]), Some(&14));
}

// ── Capacity reshaping ────────────────────────────────────────────

#[test]
fn reshapes_preserve_contents() {
    let mut warren = Warren::with_group_sizes(4, 16);
    let cursors = insert_all(&mut warren, 0..14u32);
    for index in [1, 2, 5, 11] {
        warren.erase(cursors[index]);
    }
    let survivors = contents(&warren);

    warren.shrink_to_fit();
    assert_eq!(warren.capacity(), warren.len());
    assert_eq!(contents(&warren), survivors);

    warren.reserve(30);
    // A reservation never exceeds one maximum-size group.
    assert_eq!(warren.capacity(), 16);
    assert_eq!(contents(&warren), survivors);

    warren.change_group_sizes(8, 8);
    assert_eq!(warren.group_size_bounds(), (8, 8));
    assert_eq!(contents(&warren), survivors);
    assert!(
        warren.capacity() >= warren.len(),
        "regrouping keeps room for every element"
    );
}

#[test]
fn policy_change_without_violation_keeps_cursors() {
    let mut warren = Warren::with_group_sizes(8, 8);
    let cursors = insert_all(&mut warren, 0..6);

    warren.change_group_sizes(4, 16);

    assert_eq!(warren.group_size_bounds(), (4, 16));
    assert_eq!(
        warren.get(cursors[3]),
        Some(&3),
        "no group violates the widened bounds, so nothing rebuilds"
    );
}

#[test]
fn reinitialize_restarts_with_new_bounds() {
    let mut warren = Warren::with_group_sizes(4, 8);
    warren.extend(0..10);

    warren.reinitialize(16, 64);

    assert!(warren.is_empty());
    assert_eq!(warren.capacity(), 0);
    assert_eq!(warren.group_size_bounds(), (16, 64));

    warren.insert(5);
    assert_eq!(warren.capacity(), 16, "the first group follows the new minimum");
}
