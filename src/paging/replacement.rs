//! Victim selection. Only called when every frame is occupied.

use super::frame::Frame;
use crate::types::{PageId, ReplacementPolicy};

/// Pick the frame to evict. Ties always go to the lowest frame index.
///
/// `future` is the unprocessed suffix of the trace; only `Optimal` reads it.
pub(crate) fn select_victim(
    policy: ReplacementPolicy,
    frames: &[Frame],
    future: &[PageId],
) -> usize {
    match policy {
        ReplacementPolicy::Fifo => min_by_clock(frames, |f| f.loaded_at),
        ReplacementPolicy::Lru => min_by_clock(frames, |f| f.last_used),
        ReplacementPolicy::Optimal => farthest_next_use(frames, future),
    }
}

fn min_by_clock(frames: &[Frame], clock: impl Fn(&Frame) -> usize) -> usize {
    // min_by_key returns the first minimum
    frames
        .iter()
        .enumerate()
        .min_by_key(|&(_, frame)| clock(frame))
        .map_or(0, |(i, _)| i)
}

fn farthest_next_use(frames: &[Frame], future: &[PageId]) -> usize {
    let mut victim = 0;
    let mut farthest: Option<usize> = None;

    for (i, frame) in frames.iter().enumerate() {
        let Some(page) = frame.page_id else {
            return i;
        };
        match future.iter().position(|&p| p == page) {
            // Never referenced again
            None => return i,
            Some(next_use) => {
                if farthest.map_or(true, |f| next_use > f) {
                    farthest = Some(next_use);
                    victim = i;
                }
            }
        }
    }

    victim
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frames(pages: &[(PageId, usize, usize)]) -> Vec<Frame> {
        pages
            .iter()
            .enumerate()
            .map(|(i, &(page, last_used, loaded_at))| Frame {
                frame_id: i,
                page_id: Some(page),
                last_used,
                loaded_at,
            })
            .collect()
    }

    #[test]
    fn test_fifo_picks_oldest_load() {
        let frames = frames(&[(1, 9, 3), (2, 1, 0), (3, 2, 5)]);
        assert_eq!(select_victim(ReplacementPolicy::Fifo, &frames, &[]), 1);
    }

    #[test]
    fn test_lru_picks_least_recent() {
        let frames = frames(&[(1, 9, 3), (2, 4, 0), (3, 2, 5)]);
        assert_eq!(select_victim(ReplacementPolicy::Lru, &frames, &[]), 2);
    }

    #[test]
    fn test_clock_ties_go_to_lowest_index() {
        let frames = frames(&[(1, 4, 2), (2, 1, 2), (3, 1, 7)]);
        assert_eq!(select_victim(ReplacementPolicy::Fifo, &frames, &[]), 0);
        assert_eq!(select_victim(ReplacementPolicy::Lru, &frames, &[]), 1);
    }

    #[test]
    fn test_optimal_farthest_next_use() {
        let frames = frames(&[(1, 0, 0), (2, 0, 0), (3, 0, 0)]);
        assert_eq!(
            select_victim(ReplacementPolicy::Optimal, &frames, &[2, 1, 2, 3, 1]),
            2
        );
    }

    #[test]
    fn test_optimal_prefers_first_page_never_used_again() {
        let frames = frames(&[(1, 0, 0), (2, 0, 0), (3, 0, 0)]);
        assert_eq!(
            select_victim(ReplacementPolicy::Optimal, &frames, &[1, 1, 1]),
            1
        );
        assert_eq!(select_victim(ReplacementPolicy::Optimal, &frames, &[]), 0);
    }
}
