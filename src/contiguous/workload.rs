use super::allocator::{Allocation, AllocatorSnapshot, ContiguousAllocator};
use crate::driver::Simulation;
use crate::types::{AllocatorConfig, PlacementPolicy, Result};

/// An allocator paired with a placement policy and a source of request sizes.
///
/// Each `advance` allocates one process. The first refusal ends the run.
pub struct AllocationWorkload<F = Box<dyn FnMut() -> usize + Send>> {
    allocator: ContiguousAllocator,
    policy: PlacementPolicy,
    sizes: F,
}

impl AllocationWorkload {
    /// Every request asks for `config.process_size` units
    pub fn fixed(config: &AllocatorConfig) -> Result<Self> {
        let allocator = ContiguousAllocator::with_config(config)?;
        let size = config.process_size;
        Ok(Self::new(allocator, config.policy, Box::new(move || size)))
    }
}

impl<F> AllocationWorkload<F>
where
    F: FnMut() -> usize,
{
    /// Drive an existing allocator with sizes drawn from `sizes`
    pub fn new(allocator: ContiguousAllocator, policy: PlacementPolicy, sizes: F) -> Self {
        Self {
            allocator,
            policy,
            sizes,
        }
    }

    /// Change the policy used by later requests
    pub fn set_policy(&mut self, policy: PlacementPolicy) {
        self.policy = policy;
    }

    pub fn policy(&self) -> PlacementPolicy {
        self.policy
    }

    pub fn allocator(&self) -> &ContiguousAllocator {
        &self.allocator
    }

    /// Mutable access for manual releases between steps
    pub fn allocator_mut(&mut self) -> &mut ContiguousAllocator {
        &mut self.allocator
    }

    pub fn into_allocator(self) -> ContiguousAllocator {
        self.allocator
    }
}

impl<F> Simulation for AllocationWorkload<F>
where
    F: FnMut() -> usize + Send,
{
    type Outcome = Allocation;
    type Snapshot = AllocatorSnapshot;

    fn advance(&mut self) -> Result<Option<Allocation>> {
        let size = (self.sizes)();
        self.allocator.allocate(size, self.policy).map(Some)
    }

    fn snapshot(&self) -> AllocatorSnapshot {
        self.allocator.snapshot()
    }
}
