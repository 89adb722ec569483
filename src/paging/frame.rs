use crate::types::PageId;

/// A physical frame holding at most one page.
///
/// `last_used` and `loaded_at` are logical-clock readings and are only
/// meaningful while a page is resident.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Frame {
    pub(crate) frame_id: usize,
    pub(crate) page_id: Option<PageId>,
    pub(crate) last_used: usize,
    pub(crate) loaded_at: usize,
}

impl Frame {
    pub(crate) fn empty(frame_id: usize) -> Self {
        Self {
            frame_id,
            page_id: None,
            last_used: 0,
            loaded_at: 0,
        }
    }

    /// Replace the resident page, restamping both clocks.
    /// Returns the page that was evicted, if any.
    pub(crate) fn load(&mut self, page: PageId, now: usize) -> Option<PageId> {
        let evicted = self.page_id.replace(page);
        self.last_used = now;
        self.loaded_at = now;
        evicted
    }

    #[inline]
    pub(crate) fn touch(&mut self, now: usize) {
        self.last_used = now;
    }

    pub fn frame_id(&self) -> usize {
        self.frame_id
    }

    pub fn page_id(&self) -> Option<PageId> {
        self.page_id
    }

    pub fn is_empty(&self) -> bool {
        self.page_id.is_none()
    }

    pub fn last_used(&self) -> usize {
        self.last_used
    }

    pub fn loaded_at(&self) -> usize {
        self.loaded_at
    }
}
