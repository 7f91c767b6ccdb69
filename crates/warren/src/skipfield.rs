//! Run-length skipfield backing one group.
//!
//! One `u16` per slot plus a trailing sentinel that always reads zero, so
//! forward traversal can read `entries[i + 1]` without a bounds branch. An
//! occupied slot (and any slot past the group's used region) reads zero. A
//! maximal run of `n` contiguously erased slots stores `n` in both its
//! first and its last entry; interior entries are never read and may hold
//! stale values from earlier runs.

/// Skipfield for a single group. Length is group capacity + 1.
#[derive(Clone)]
pub(crate) struct Skipfield {
    entries: Vec<u16>,
}

impl Skipfield {
    pub(crate) fn new(capacity: u16) -> Self {
        Self {
            entries: vec![0; capacity as usize + 1],
        }
    }

    /// Value at `index`. The sentinel entry is readable like any other.
    #[inline]
    pub(crate) fn get(&self, index: usize) -> u16 {
        self.entries[index]
    }

    #[inline]
    pub(crate) fn set(&mut self, index: usize, value: u16) {
        self.entries[index] = value;
    }

    #[inline]
    pub(crate) fn zero(&mut self, index: usize) {
        self.entries[index] = 0;
    }

    /// Zero `len` entries starting at `start` (a reused run becoming live).
    pub(crate) fn zero_span(&mut self, start: usize, len: usize) {
        for entry in &mut self.entries[start..start + len] {
            *entry = 0;
        }
    }

    /// Write the boundary entries of a run of `len` erased slots starting
    /// at `start`. A run of length 1 writes a single entry.
    pub(crate) fn write_run(&mut self, start: usize, len: u16) {
        debug_assert!(len >= 1);
        self.entries[start] = len;
        self.entries[start + len as usize - 1] = len;
    }

    /// Clear every entry (sole-group reset).
    pub(crate) fn reset(&mut self) {
        for entry in &mut self.entries {
            *entry = 0;
        }
    }

    /// First `n` entries, index-aligned with the group's used slots.
    #[inline]
    pub(crate) fn prefix(&self, n: usize) -> &[u16] {
        &self.entries[..n]
    }

    pub(crate) fn heap_bytes(&self) -> usize {
        self.entries.capacity() * std::mem::size_of::<u16>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_skipfield_is_all_zero_including_sentinel() {
        let sf = Skipfield::new(4);
        for i in 0..=4 {
            assert_eq!(sf.get(i), 0);
        }
    }

    #[test]
    fn write_run_marks_both_boundaries() {
        let mut sf = Skipfield::new(8);
        sf.write_run(2, 3);
        assert_eq!(sf.get(2), 3);
        assert_eq!(sf.get(4), 3);
        assert_eq!(sf.get(5), 0);
    }

    #[test]
    fn single_slot_run_is_one_entry() {
        let mut sf = Skipfield::new(4);
        sf.write_run(1, 1);
        assert_eq!(sf.get(1), 1);
        assert_eq!(sf.get(0), 0);
        assert_eq!(sf.get(2), 0);
    }

    #[test]
    fn zero_span_clears_a_reused_run() {
        let mut sf = Skipfield::new(8);
        sf.write_run(0, 5);
        sf.zero_span(0, 5);
        for i in 0..=8 {
            assert_eq!(sf.get(i), 0);
        }
    }

    #[test]
    fn sentinel_survives_full_capacity_run() {
        let mut sf = Skipfield::new(6);
        sf.write_run(0, 6);
        assert_eq!(sf.get(0), 6);
        assert_eq!(sf.get(5), 6);
        assert_eq!(sf.get(6), 0);
    }
}
