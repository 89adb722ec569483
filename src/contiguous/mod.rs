//! Contiguous allocation: a linear memory split into ordered blocks, served
//! by first/best/worst/circular fit.

mod allocator;
mod block;
mod placement;
mod workload;

pub use allocator::{Allocation, AllocatorSnapshot, ContiguousAllocator, MemoryMetrics, Release};
pub use block::Block;
pub use workload::AllocationWorkload;
