//! Paging: a fixed set of frames serving a page-reference trace with FIFO,
//! LRU or Optimal replacement.

mod frame;
mod replacement;
mod simulator;

pub use frame::Frame;
pub use simulator::{Access, PagingSimulator, PagingSnapshot, StepResult};
