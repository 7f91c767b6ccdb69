//! Bucket-allocated unordered container with stable element addresses.
//!
//! A [`Warren`] stores elements of one type in a chain of fixed-capacity
//! groups. Inserting or erasing an element never moves any other element:
//! references and [`Cursor`]s to live elements stay valid through
//! arbitrary churn, which is the property `Vec` and friends cannot give.
//! Erased slots are recorded in per-group skipfields and embedded free
//! lists, reused LIFO by later insertions, and jumped over in O(1) per
//! contiguous run during iteration.
//!
//! # Architecture
//!
//! ```text
//! Warren<T> (header)
//! ├── Vec<Group<T>>            one bucket per link of the chain
//! │   ├── Vec<Slot<T>>         Occupied(T) | Free { prev, next }
//! │   └── Skipfield            run lengths at erased-run boundaries
//! ├── IndexMap<GroupId, usize> cursor resolution (id → chain position)
//! ├── SmallVec<GroupId>        groups holding reusable erased slots
//! └── begin / end Cursors      maintained by every mutation
//! ```
//!
//! Group buffers are never resized, so slot addresses are stable for the
//! life of their group. Growth appends groups; a group emptied by erasure
//! is deallocated (the sole remaining group is reset in place instead).
//!
//! # Invalidation contract
//!
//! Plain [`insert`](Warren::insert) and [`erase`](Warren::erase) preserve
//! all other cursors. The rebuild operations invalidate every outstanding
//! cursor, as documented on each: [`sort_by`](Warren::sort_by),
//! [`shrink_to_fit`](Warren::shrink_to_fit), [`reserve`](Warren::reserve)
//! on a non-empty container, and [`change_group_sizes`](Warren::change_group_sizes)
//! when it repacks. [`splice`](Warren::splice) keeps cursors into both
//! containers valid against the destination.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

mod bulk;
pub mod config;
pub mod cursor;
mod group;
pub mod iter;
mod repack;
mod skipfield;
mod traverse;
pub mod warren;

// Public re-exports for the primary API surface.
pub use config::GroupSizes;
pub use cursor::{Cursor, GroupId};
pub use iter::{IntoIter, Iter, IterMut};
pub use warren::Warren;
