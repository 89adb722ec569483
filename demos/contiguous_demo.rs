//! Example: Contiguous Allocation
//!
//! Fills memory with fixed-size processes using the auto-run driver, releases
//! a few blocks to punch holes, then shows how each placement policy reacts.
//!
//! Run with `RUST_LOG=debug` to see every allocation and release.

use memory_policy_sim::driver::shared;
use memory_policy_sim::{
    AllocationWorkload, AllocatorConfig, AutoRunner, ContiguousAllocator, DriverConfig,
    PlacementPolicy, StopReason,
};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    println!("=== Contiguous Allocation Demo ===\n");

    let config = AllocatorConfig {
        total_memory: 200,
        process_size: 30,
        policy: PlacementPolicy::FirstFit,
    };
    let sim = shared(AllocationWorkload::fixed(&config).unwrap());

    // 1. Auto-run until memory is full
    println!("📦 Phase 1: Allocating {}-unit processes until full...", config.process_size);
    let driver = DriverConfig {
        step_interval: Duration::from_millis(50),
        max_steps: None,
    };
    let runner = AutoRunner::new(&sim, driver);
    let reason = runner.run_blocking(|allocation, snapshot| {
        println!(
            "  P{} -> block {} ({} units free)",
            allocation.process_id, allocation.block_index, snapshot.metrics.free
        );
    });
    match reason {
        StopReason::Exhausted(e) => println!("✅ Stopped: {}\n", e),
        other => println!("⚠️  Stopped unexpectedly: {:?}\n", other),
    }
    print_status("Memory Full", sim.lock().allocator());

    // 2. Release every other process
    println!("🗑️  Releasing P1, P3 and P5...");
    {
        let mut guard = sim.lock();
        let allocator = guard.allocator_mut();
        for pid in [1, 3, 5] {
            if let Ok(Some(release)) = allocator.free_process(pid) {
                println!("  P{} released, hole at block {}", pid, release.merged_index);
            }
        }
    }
    print_status("After Release", sim.lock().allocator());

    // 3. Compare policies on the fragmented layout
    println!("🔍 Phase 2: Placing a 20-unit process with each policy...");
    let fragmented = sim.lock().allocator().blocks().to_vec();
    for policy in PlacementPolicy::ALL {
        let mut allocator = ContiguousAllocator::from_blocks(fragmented.clone()).unwrap();
        match allocator.allocate(20, policy) {
            Ok(allocation) => println!(
                "  {:<13} -> block {} (fragmentation {:.2}%)",
                policy,
                allocation.block_index,
                allocator.external_fragmentation()
            ),
            Err(e) => println!("  {:<13} -> {}", policy, e),
        }
    }
}

fn print_status(stage: &str, allocator: &ContiguousAllocator) {
    let metrics = allocator.metrics();

    println!("--- Status: {} ---", stage);
    print!("  Layout:            ");
    for block in allocator.blocks() {
        match block.process_id() {
            Some(pid) => print!("[P{}:{}]", pid, block.size()),
            None => print!("[free:{}]", block.size()),
        }
    }
    println!();
    println!("  Processes:         {}", metrics.process_count);
    println!("  Used / Free:       {} / {}", metrics.used, metrics.free);
    println!("  Largest Free:      {}", metrics.largest_free_block);
    println!("  Fragmentation:     {:.2}%", metrics.external_fragmentation);
    println!("--------------------------------\n");
}
