//! Compare every policy of both engines on the same workloads
//!
//! Placement: the same mixed request stream, with every fourth process
//! released, is run against each placement policy.
//! Replacement: several reference strings are replayed with 2..=5 frames.

use memory_policy_sim::{
    parse_trace, ContiguousAllocator, PagingConfig, PagingSimulator, PlacementPolicy,
    ReplacementPolicy, SimError,
};

const REQUESTS: [usize; 16] = [
    120, 40, 200, 60, 35, 90, 150, 20, 75, 110, 45, 30, 180, 55, 25, 95,
];

struct PlacementResult {
    policy: PlacementPolicy,
    placed: usize,
    refused: usize,
    fragmentation: f64,
    largest_free: usize,
}

impl PlacementResult {
    fn print_header() {
        println!(
            "\n{:<14} {:>8} {:>8} {:>15} {:>13}",
            "Policy", "Placed", "Refused", "Fragmentation", "Largest Free"
        );
        println!("{}", "=".repeat(62));
    }

    fn print(&self) {
        println!(
            "{:<14} {:>8} {:>8} {:>14.2}% {:>13}",
            self.policy, self.placed, self.refused, self.fragmentation, self.largest_free
        );
    }
}

fn run_placement(policy: PlacementPolicy) -> PlacementResult {
    let mut allocator = ContiguousAllocator::new(1024).expect("valid memory size");
    let mut placed = 0;
    let mut refused = 0;

    for (i, &size) in REQUESTS.iter().cycle().take(48).enumerate() {
        match allocator.allocate(size, policy) {
            Ok(_) => placed += 1,
            Err(SimError::InsufficientMemory { .. }) => refused += 1,
            Err(e) => panic!("unexpected error: {}", e),
        }

        // Release the oldest resident process every fourth request
        if i % 4 == 3 {
            if let Some(index) = allocator.blocks().iter().position(|b| b.is_used()) {
                let _ = allocator.free(index);
            }
        }
    }

    PlacementResult {
        policy,
        placed,
        refused,
        fragmentation: allocator.external_fragmentation(),
        largest_free: allocator.largest_free_block(),
    }
}

fn run_replacement(trace: &[u32], frames: usize, policy: ReplacementPolicy) -> usize {
    let config = PagingConfig::with_frames(frames, policy);
    let mut sim = PagingSimulator::new(&config, trace.to_vec()).expect("valid paging config");
    sim.run_to_end();
    sim.page_faults()
}

fn main() {
    println!("=== Placement Policies (1024 units, 48 requests) ===");
    PlacementResult::print_header();
    for policy in PlacementPolicy::ALL {
        run_placement(policy).print();
    }

    println!("\n=== Replacement Policies (page faults) ===");
    let traces = [
        ("textbook", "7,0,1,2,0,3,0,4,2,3,0,3,2,1,2,0,1,7,0,1"),
        ("belady", "1,2,3,4,1,2,5,1,2,3,4,5"),
        ("loop", "1,2,3,4,5,1,2,3,4,5,1,2,3,4,5"),
    ];

    for (name, raw) in traces {
        let trace = parse_trace(raw);
        println!("\n{} ({} refs)", name, trace.len());
        println!("{:<8} {:>6} {:>6} {:>8}", "Frames", "FIFO", "LRU", "Optimal");
        for frames in 2..=5 {
            println!(
                "{:<8} {:>6} {:>6} {:>8}",
                frames,
                run_replacement(&trace, frames, ReplacementPolicy::Fifo),
                run_replacement(&trace, frames, ReplacementPolicy::Lru),
                run_replacement(&trace, frames, ReplacementPolicy::Optimal),
            );
        }
    }
}
