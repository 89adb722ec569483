use std::sync::Arc;

use tracing::{debug, info, trace};

use super::frame::Frame;
use super::replacement::select_victim;
use crate::driver::Simulation;
use crate::profiling::Profiler;
use crate::types::{PageId, PagingConfig, ReplacementPolicy, Result};

/// What happened to one page reference
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Page was already resident in `frame`
    Hit { frame: usize },

    /// Page was loaded into `frame`, replacing `evicted` if the frame was occupied
    Fault {
        frame: usize,
        evicted: Option<PageId>,
    },
}

/// Result of processing one request from the trace
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepResult {
    /// Logical time at which the request was processed
    pub step: usize,
    pub page: PageId,
    pub access: Access,
}

impl StepResult {
    pub fn is_fault(&self) -> bool {
        matches!(self.access, Access::Fault { .. })
    }

    /// Frame that changed, for transient highlighting. `None` on a hit.
    pub fn highlight(&self) -> Option<usize> {
        match self.access {
            Access::Hit { .. } => None,
            Access::Fault { frame, .. } => Some(frame),
        }
    }
}

/// Everything a renderer needs after one step
#[derive(Debug, Clone, PartialEq)]
pub struct PagingSnapshot {
    pub frames: Vec<Frame>,
    pub current_step: usize,
    pub page_faults: usize,
    pub hits: usize,
    pub trace_len: usize,
    pub highlight: Option<usize>,
}

impl PagingSnapshot {
    /// Faults per processed reference (0.0 - 1.0)
    pub fn fault_rate(&self) -> f64 {
        if self.current_step == 0 {
            0.0
        } else {
            self.page_faults as f64 / self.current_step as f64
        }
    }

    pub fn is_complete(&self) -> bool {
        self.current_step >= self.trace_len
    }
}

/// Fixed set of frames serving a page-reference trace
pub struct PagingSimulator {
    frames: Vec<Frame>,

    /// Read-only reference string; `trace[current_step..]` is the future
    trace: Arc<[PageId]>,

    /// Logical clock, also the index of the next request
    current_step: usize,

    page_faults: usize,

    policy: ReplacementPolicy,

    page_size: usize,

    highlight: Option<usize>,

    profiler: Profiler,
}

impl PagingSimulator {
    /// Create a simulator with all frames empty
    pub fn new(config: &PagingConfig, trace: impl Into<Arc<[PageId]>>) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            frames: (0..config.frame_count).map(Frame::empty).collect(),
            trace: trace.into(),
            current_step: 0,
            page_faults: 0,
            policy: config.policy,
            page_size: config.page_size,
            highlight: None,
            profiler: Profiler::new(),
        })
    }

    /// Process the next request in the trace.
    ///
    /// Returns `None` once the trace is exhausted.
    pub fn step(&mut self) -> Option<StepResult> {
        let page = *self.trace.get(self.current_step)?;
        let now = self.current_step;

        let access = match self.frames.iter().position(|f| f.page_id == Some(page)) {
            Some(frame) => {
                self.frames[frame].touch(now);
                self.profiler.record_hit();
                debug!(step = now, page, frame, "page hit");
                Access::Hit { frame }
            }
            None => {
                self.page_faults += 1;
                let frame = match self.frames.iter().position(Frame::is_empty) {
                    Some(empty) => empty,
                    None => {
                        let future = &self.trace[now..];
                        let victim = select_victim(self.policy, &self.frames, future);
                        trace!(step = now, policy = %self.policy, victim, "selected victim");
                        victim
                    }
                };
                let evicted = self.frames[frame].load(page, now);
                self.profiler.record_fault(evicted.is_some());
                debug!(step = now, page, frame, ?evicted, "page fault");
                Access::Fault { frame, evicted }
            }
        };

        self.current_step += 1;
        let result = StepResult {
            step: now,
            page,
            access,
        };
        self.highlight = result.highlight();
        Some(result)
    }

    /// Process every remaining request
    pub fn run_to_end(&mut self) -> Vec<StepResult> {
        std::iter::from_fn(|| self.step()).collect()
    }

    /// Change the policy used for later evictions
    pub fn set_policy(&mut self, policy: ReplacementPolicy) {
        self.policy = policy;
    }

    /// Empty every frame and rewind to the start of the trace
    pub fn reset(&mut self) {
        for frame in &mut self.frames {
            *frame = Frame::empty(frame.frame_id);
        }
        self.current_step = 0;
        self.page_faults = 0;
        self.highlight = None;
        info!(frames = self.frames.len(), "paging simulator reset");
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn trace(&self) -> &[PageId] {
        &self.trace
    }

    /// Requests not yet processed
    pub fn remaining(&self) -> &[PageId] {
        &self.trace[self.current_step.min(self.trace.len())..]
    }

    pub fn current_step(&self) -> usize {
        self.current_step
    }

    pub fn page_faults(&self) -> usize {
        self.page_faults
    }

    pub fn hits(&self) -> usize {
        self.current_step - self.page_faults
    }

    pub fn policy(&self) -> ReplacementPolicy {
        self.policy
    }

    pub fn is_complete(&self) -> bool {
        self.current_step >= self.trace.len()
    }

    /// Size of the simulated physical memory in units
    pub fn physical_memory_size(&self) -> usize {
        self.frames.len() * self.page_size
    }

    /// Pages currently resident, by frame index
    pub fn resident_pages(&self) -> Vec<Option<PageId>> {
        self.frames.iter().map(Frame::page_id).collect()
    }

    pub fn snapshot(&self) -> PagingSnapshot {
        PagingSnapshot {
            frames: self.frames.clone(),
            current_step: self.current_step,
            page_faults: self.page_faults,
            hits: self.hits(),
            trace_len: self.trace.len(),
            highlight: self.highlight,
        }
    }

    /// Get access to the profiler for metrics
    pub fn profiler(&self) -> &Profiler {
        &self.profiler
    }
}

impl Simulation for PagingSimulator {
    type Outcome = StepResult;
    type Snapshot = PagingSnapshot;

    fn advance(&mut self) -> Result<Option<StepResult>> {
        Ok(self.step())
    }

    fn snapshot(&self) -> PagingSnapshot {
        PagingSimulator::snapshot(self)
    }
}

impl std::fmt::Debug for PagingSimulator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PagingSimulator")
            .field("frame_count", &self.frames.len())
            .field("policy", &self.policy)
            .field("current_step", &self.current_step)
            .field("trace_len", &self.trace.len())
            .field("page_faults", &self.page_faults)
            .finish()
    }
}
