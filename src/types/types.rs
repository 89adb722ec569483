use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Identifier stamped on an allocated block. Minted from 1 upwards.
pub type ProcessId = u32;

/// Logical page number referenced by a paging trace.
pub type PageId = u32;

/// Placement policy used by the contiguous allocator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PlacementPolicy {
    /// Lowest-indexed free block that fits
    #[default]
    FirstFit,

    /// Smallest free block that fits (earliest on ties)
    BestFit,

    /// Largest free block that fits (earliest on ties)
    WorstFit,

    /// First fit starting from a cursor that persists between requests
    CircularFit,
}

impl PlacementPolicy {
    /// All policies, in the order they are usually presented
    pub const ALL: [PlacementPolicy; 4] = [
        PlacementPolicy::FirstFit,
        PlacementPolicy::BestFit,
        PlacementPolicy::WorstFit,
        PlacementPolicy::CircularFit,
    ];

    /// Identifier accepted by `FromStr`
    pub fn as_str(&self) -> &'static str {
        match self {
            PlacementPolicy::FirstFit => "first-fit",
            PlacementPolicy::BestFit => "best-fit",
            PlacementPolicy::WorstFit => "worst-fit",
            PlacementPolicy::CircularFit => "circular-fit",
        }
    }
}

impl fmt::Display for PlacementPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlacementPolicy {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "first-fit" => Ok(PlacementPolicy::FirstFit),
            "best-fit" => Ok(PlacementPolicy::BestFit),
            "worst-fit" => Ok(PlacementPolicy::WorstFit),
            "circular-fit" => Ok(PlacementPolicy::CircularFit),
            other => Err(SimError::UnknownPolicy(other.to_string())),
        }
    }
}

/// Victim selection policy used by the paging simulator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ReplacementPolicy {
    /// Evict the page that was loaded earliest
    #[default]
    Fifo,

    /// Evict the page referenced least recently
    Lru,

    /// Evict the page whose next use lies farthest in the future
    Optimal,
}

impl ReplacementPolicy {
    pub const ALL: [ReplacementPolicy; 3] = [
        ReplacementPolicy::Fifo,
        ReplacementPolicy::Lru,
        ReplacementPolicy::Optimal,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReplacementPolicy::Fifo => "fifo",
            ReplacementPolicy::Lru => "lru",
            ReplacementPolicy::Optimal => "optimal",
        }
    }
}

impl fmt::Display for ReplacementPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReplacementPolicy {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fifo" => Ok(ReplacementPolicy::Fifo),
            "lru" => Ok(ReplacementPolicy::Lru),
            "optimal" => Ok(ReplacementPolicy::Optimal),
            other => Err(SimError::UnknownPolicy(other.to_string())),
        }
    }
}

/// Configuration for the contiguous allocator
#[derive(Debug, Clone)]
pub struct AllocatorConfig {
    /// Total memory in units (default: 1024)
    pub total_memory: usize,

    /// Size requested by each auto-run allocation (default: 64)
    pub process_size: usize,

    /// Placement policy (default: first-fit)
    pub policy: PlacementPolicy,
}

impl Default for AllocatorConfig {
    fn default() -> Self {
        Self {
            total_memory: 1024,
            process_size: 64,
            policy: PlacementPolicy::FirstFit,
        }
    }
}

impl AllocatorConfig {
    /// Small memory that fills after a handful of requests
    pub fn classroom() -> Self {
        Self {
            total_memory: 100,
            process_size: 30,
            policy: PlacementPolicy::FirstFit,
        }
    }

    /// Check that sizes are usable before building an allocator
    pub fn validate(&self) -> Result<()> {
        if self.total_memory == 0 {
            return Err(SimError::InvalidConfig(
                "total memory must be positive".to_string(),
            ));
        }
        if self.process_size == 0 || self.process_size > self.total_memory {
            return Err(SimError::InvalidSize {
                size: self.process_size,
                max: self.total_memory,
            });
        }
        Ok(())
    }
}

/// Configuration for the paging simulator
#[derive(Debug, Clone)]
pub struct PagingConfig {
    /// Number of physical frames (default: 4)
    pub frame_count: usize,

    /// Size of a page/frame in memory units (default: 4096). Informational only.
    pub page_size: usize,

    /// Replacement policy (default: FIFO)
    pub policy: ReplacementPolicy,
}

impl Default for PagingConfig {
    fn default() -> Self {
        Self {
            frame_count: 4,
            page_size: 4096,
            policy: ReplacementPolicy::Fifo,
        }
    }
}

impl PagingConfig {
    /// Config with the given frame count and policy, default page size
    pub fn with_frames(frame_count: usize, policy: ReplacementPolicy) -> Self {
        Self {
            frame_count,
            policy,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.frame_count == 0 {
            return Err(SimError::InvalidConfig(
                "frame count must be positive".to_string(),
            ));
        }
        if self.page_size == 0 {
            return Err(SimError::InvalidConfig(
                "page size must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Pacing for the auto-run driver
#[derive(Debug, Clone)]
pub struct DriverConfig {
    /// Pause between two steps so the renderer can catch up
    pub step_interval: Duration,

    /// Stop after this many steps (default: unbounded)
    pub max_steps: Option<usize>,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self::allocation()
    }
}

impl DriverConfig {
    /// Pacing used when auto-running allocations (300ms per step)
    pub fn allocation() -> Self {
        Self {
            step_interval: Duration::from_millis(300),
            max_steps: None,
        }
    }

    /// Pacing used when auto-running a paging trace (500ms per step)
    pub fn paging() -> Self {
        Self {
            step_interval: Duration::from_millis(500),
            max_steps: None,
        }
    }

    /// No pause between steps
    pub fn instant() -> Self {
        Self {
            step_interval: Duration::ZERO,
            max_steps: None,
        }
    }
}

/// Parse a page reference trace such as `"7, 0, 1, 2"`.
///
/// Tokens are separated by commas and/or whitespace. Anything that is not a
/// non-negative integer is dropped.
pub fn parse_trace(input: &str) -> Vec<PageId> {
    input
        .split(|c: char| c == ',' || c.is_whitespace())
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .filter_map(|token| token.parse::<PageId>().ok())
        .collect()
}

/// Errors that can occur in the simulators
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SimError {
    #[error("Insufficient memory (requested: {requested}, largest free block: {largest_free})")]
    InsufficientMemory { requested: usize, largest_free: usize },

    #[error("Invalid request size (size: {size}, max: {max})")]
    InvalidSize { size: usize, max: usize },

    #[error("Invalid block index (index: {index}, blocks: {len})")]
    InvalidBlockIndex { index: usize, len: usize },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Unknown policy identifier: {0}")]
    UnknownPolicy(String),
}

pub type Result<T> = std::result::Result<T, SimError>;
