//! Free-block search for each placement policy.
//!
//! Every function only reads the layout. The caller owns the split and the
//! cursor update.

use super::block::Block;
use crate::types::PlacementPolicy;

/// Find the block index where a request of `size` units should go.
///
/// `cursor` is only consulted by circular-fit.
pub(crate) fn find_block(
    blocks: &[Block],
    size: usize,
    policy: PlacementPolicy,
    cursor: usize,
) -> Option<usize> {
    match policy {
        PlacementPolicy::FirstFit => first_fit(blocks, size),
        PlacementPolicy::BestFit => best_fit(blocks, size),
        PlacementPolicy::WorstFit => worst_fit(blocks, size),
        PlacementPolicy::CircularFit => circular_fit(blocks, size, cursor),
    }
}

fn first_fit(blocks: &[Block], size: usize) -> Option<usize> {
    blocks.iter().position(|b| b.fits(size))
}

fn best_fit(blocks: &[Block], size: usize) -> Option<usize> {
    let mut best: Option<(usize, usize)> = None;
    for (i, block) in blocks.iter().enumerate() {
        if !block.fits(size) {
            continue;
        }
        // Strict comparison keeps the earliest index on ties
        match best {
            Some((_, best_size)) if block.size >= best_size => {}
            _ => best = Some((i, block.size)),
        }
    }
    best.map(|(i, _)| i)
}

fn worst_fit(blocks: &[Block], size: usize) -> Option<usize> {
    let mut worst: Option<(usize, usize)> = None;
    for (i, block) in blocks.iter().enumerate() {
        if !block.fits(size) {
            continue;
        }
        match worst {
            Some((_, worst_size)) if block.size <= worst_size => {}
            _ => worst = Some((i, block.size)),
        }
    }
    worst.map(|(i, _)| i)
}

fn circular_fit(blocks: &[Block], size: usize, cursor: usize) -> Option<usize> {
    let n = blocks.len();
    if n == 0 {
        return None;
    }
    (0..n)
        .map(|offset| (cursor + offset) % n)
        .find(|&i| blocks[i].fits(size))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> Vec<Block> {
        vec![
            Block::free(20),
            Block::used(10, 1),
            Block::free(50),
            Block::free(20),
            Block::used(5, 2),
            Block::free(50),
        ]
    }

    #[test]
    fn test_first_fit() {
        let blocks = layout();
        assert_eq!(find_block(&blocks, 15, PlacementPolicy::FirstFit, 0), Some(0));
        assert_eq!(find_block(&blocks, 30, PlacementPolicy::FirstFit, 0), Some(2));
        assert_eq!(find_block(&blocks, 51, PlacementPolicy::FirstFit, 0), None);
    }

    #[test]
    fn test_best_fit_prefers_earliest_smallest() {
        let blocks = layout();
        assert_eq!(find_block(&blocks, 15, PlacementPolicy::BestFit, 0), Some(0));
        assert_eq!(find_block(&blocks, 21, PlacementPolicy::BestFit, 0), Some(2));
    }

    #[test]
    fn test_worst_fit_prefers_earliest_largest() {
        let blocks = layout();
        assert_eq!(find_block(&blocks, 1, PlacementPolicy::WorstFit, 0), Some(2));
        assert_eq!(find_block(&blocks, 60, PlacementPolicy::WorstFit, 0), None);
    }

    #[test]
    fn test_circular_fit_wraps_from_cursor() {
        let blocks = layout();
        assert_eq!(find_block(&blocks, 15, PlacementPolicy::CircularFit, 3), Some(3));
        assert_eq!(find_block(&blocks, 30, PlacementPolicy::CircularFit, 3), Some(5));
        // Wraps past the end back to index 0
        assert_eq!(find_block(&blocks, 15, PlacementPolicy::CircularFit, 4), Some(5));
        assert_eq!(find_block(&blocks, 30, PlacementPolicy::CircularFit, 6), Some(2));
        assert_eq!(find_block(&blocks, 10, PlacementPolicy::CircularFit, 1), Some(2));
    }

    #[test]
    fn test_used_blocks_never_match() {
        let blocks = vec![Block::used(100, 1)];
        for policy in PlacementPolicy::ALL {
            assert_eq!(find_block(&blocks, 1, policy, 0), None);
        }
    }
}
