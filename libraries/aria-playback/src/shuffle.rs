//! Shuffle selection
//!
//! Shuffle does not permute the queue. Each "next" draws uniformly from every
//! queue entry except the current one, so the same track never plays twice in
//! a row.

use rand::Rng;

/// Pick the next shuffled index
///
/// Returns `None` when there is nothing to pick (queue of length 0 or 1).
/// With no current entry every index is eligible.
pub fn pick_next_index<R: Rng + ?Sized>(
    len: usize,
    current: Option<usize>,
    rng: &mut R,
) -> Option<usize> {
    if len <= 1 {
        return None;
    }

    match current {
        Some(current) if current < len => {
            // Draw from len - 1 slots and skip over the current index
            let pick = rng.gen_range(0..len - 1);
            Some(if pick >= current { pick + 1 } else { pick })
        }
        _ => Some(rng.gen_range(0..len)),
    }
}
