use crate::types::ProcessId;

/// A contiguous run of memory units, either free or owned by one process.
///
/// A block is "used" exactly when it carries a process id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Block {
    pub(crate) size: usize,
    pub(crate) process_id: Option<ProcessId>,
}

impl Block {
    /// Create a free block
    pub fn free(size: usize) -> Self {
        Self {
            size,
            process_id: None,
        }
    }

    /// Create a block owned by `process_id`
    pub fn used(size: usize, process_id: ProcessId) -> Self {
        Self {
            size,
            process_id: Some(process_id),
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn is_used(&self) -> bool {
        self.process_id.is_some()
    }

    pub fn is_free(&self) -> bool {
        self.process_id.is_none()
    }

    pub fn process_id(&self) -> Option<ProcessId> {
        self.process_id
    }

    /// Whether a request of `size` units could be placed here
    #[inline]
    pub(crate) fn fits(&self, size: usize) -> bool {
        self.is_free() && self.size >= size
    }
}
