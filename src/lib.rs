//! # Memory Policy Simulator
//!
//! Deterministic, step-driven simulations of classic operating-system memory
//! management policies.
//!
//! ## Features
//!
//! - **Contiguous allocation**: first, best, worst and circular fit over a
//!   linear memory, with block splitting, coalescing on release and external
//!   fragmentation metrics
//! - **Paging**: FIFO, LRU and Optimal page replacement over a reference trace
//! - **Auto-run driver**: paced step loop with cooperative cancellation,
//!   observer callbacks and a background event channel
//!
//! ## Example
//!
//! ```rust
//! use memory_policy_sim::{ContiguousAllocator, PlacementPolicy};
//! use memory_policy_sim::{parse_trace, PagingConfig, PagingSimulator, ReplacementPolicy};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Place a process in 100 units of memory
//! let mut memory = ContiguousAllocator::new(100)?;
//! let allocation = memory.allocate(30, PlacementPolicy::FirstFit)?;
//! assert_eq!(allocation.process_id, 1);
//! assert_eq!(memory.free_memory(), 70);
//!
//! // Release it again
//! memory.free(allocation.block_index)?;
//! assert_eq!(memory.process_count(), 0);
//!
//! // Replay a reference string through two LRU frames
//! let config = PagingConfig::with_frames(2, ReplacementPolicy::Lru);
//! let mut paging = PagingSimulator::new(&config, parse_trace("1, 2, 1, 3"))?;
//! paging.run_to_end();
//! assert_eq!(paging.page_faults(), 3);
//! # Ok(())
//! # }
//! ```

pub mod contiguous;
pub mod driver;
pub mod paging;
pub mod profiling;
pub mod types;

pub use contiguous::{
    Allocation, AllocationWorkload, AllocatorSnapshot, Block, ContiguousAllocator, MemoryMetrics,
    Release,
};
pub use driver::{
    AutoRunExt, AutoRunner, CancellationToken, RunEvent, RunHandle, Simulation, StopReason,
};
pub use profiling::{ProfileStats, Profiler};
pub use paging::{Access, Frame, PagingSimulator, PagingSnapshot, StepResult};
pub use types::{
    parse_trace, AllocatorConfig, DriverConfig, PageId, PagingConfig, PlacementPolicy, ProcessId,
    ReplacementPolicy, Result, SimError,
};
