//! Warren quickstart: an object pool under insert/erase churn.
//!
//! Demonstrates:
//!   1. Creating a warren with explicit group-size bounds
//!   2. Inserting elements and keeping cursors across unrelated churn
//!   3. Erasing through cursors while surviving addresses stay put
//!   4. Slot reuse: respawns land in the freshest freed slots
//!   5. Bulk fill, range erase, sort, and splice
//!   6. Reclaiming memory with shrink_to_fit
//!
//! Run with:
//!   cargo run --example quickstart

use warren::{Cursor, Warren};

// ─── Helpers ────────────────────────────────────────────────────

/// Live elements in container order, space-joined.
fn roster(pool: &Warren<u32>) -> String {
    pool.iter().map(u32::to_string).collect::<Vec<_>>().join(" ")
}

// ─── Main ───────────────────────────────────────────────────────

fn main() {
    println!("=== Warren Quickstart ===\n");

    // 1. Small groups so the group chain stays visible in the output.
    let mut pool: Warren<u32> = Warren::with_group_sizes(4, 8);
    println!(
        "Created pool: group size bounds {:?}, capacity {}",
        pool.group_size_bounds(),
        pool.capacity()
    );

    // 2. Spawn ten elements, keeping every cursor.
    let cursors: Vec<Cursor> = (0..10).map(|id| pool.insert(id)).collect();
    println!(
        "\nSpawned {} across {} groups (capacity {}):",
        pool.len(),
        pool.group_count(),
        pool.capacity()
    );
    println!("  {}", roster(&pool));

    // 3. Erase three elements around a watched one. Its address and
    //    cursor survive untouched.
    let watched: *const u32 = pool.get(cursors[7]).unwrap();
    for &c in &cursors[2..5] {
        pool.erase(c);
    }
    println!(
        "\nErased 2, 3, 4: len {}, capacity {}",
        pool.len(),
        pool.capacity()
    );

    // 4. Respawns reuse the freed slots, most recent erasure first.
    for id in 10..13 {
        pool.insert(id);
    }
    println!(
        "Respawned 10, 11, 12 into the holes (capacity still {}):",
        pool.capacity()
    );
    println!("  {}", roster(&pool));
    assert!(std::ptr::eq(watched, pool.get(cursors[7]).unwrap()));
    println!("  watched element 7 kept its address and cursor");

    // 5. Sweep out the odd survivors with the erase cursor loop.
    let mut c = pool.begin();
    while c != pool.end() {
        if pool.get(c).unwrap() % 2 == 1 {
            c = pool.erase(c);
        } else {
            c = pool.next_cursor(c);
        }
    }
    println!("\nAfter the odd sweep ({} live):", pool.len());
    println!("  {}", roster(&pool));

    // 6. Bulk fill consumes every hole before touching back capacity.
    pool.insert_fill(11, 77);
    println!(
        "\nFilled 11 x 77: len {} == capacity {}, still {} groups",
        pool.len(),
        pool.capacity(),
        pool.group_count()
    );
    println!("  {}", roster(&pool));

    // 7. Range erase drops wholly covered groups outright.
    let first = pool.cursor_at(4);
    let last = pool.cursor_at(12);
    pool.erase_range(first, last);
    println!(
        "\nErased [4, 12): len {}, capacity {}, {} groups",
        pool.len(),
        pool.capacity(),
        pool.group_count()
    );
    println!("  {}", roster(&pool));

    // 8. Sort repacks densely and invalidates outstanding cursors.
    pool.sort();
    println!(
        "\nSorted (repacked to {} group, capacity {}):",
        pool.group_count(),
        pool.capacity()
    );
    println!("  {}", roster(&pool));

    // 9. Splice adopts another warren's groups whole; cursors into the
    //    source keep working against the destination.
    let mut late: Warren<u32> = Warren::with_group_sizes(4, 8);
    late.extend([100, 101, 102]);
    let held = late.begin();
    pool.splice(&mut late);
    println!(
        "\nSpliced a 3-element pool in: len {}, capacity {}, source len {}",
        pool.len(),
        pool.capacity(),
        late.len()
    );
    println!("  {}", roster(&pool));
    println!("  held source cursor resolves to {:?}", pool.get(held));

    // 10. Shrink back to an exact fit.
    let before = pool.memory_bytes();
    pool.shrink_to_fit();
    println!(
        "\nShrunk to fit: capacity {} == len {}, memory {} -> {} bytes",
        pool.capacity(),
        pool.len(),
        before,
        pool.memory_bytes()
    );

    println!("\nDone.");
}
