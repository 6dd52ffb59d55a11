//! Keyed content hashing shared by both pool key forms.

use ahash::RandomState;

use crate::blob::BlobHandle;

/// Hashes pool keys by their content bytes.
///
/// One keyed state serves both key forms — raw `&[u8]` content and pooled
/// handles — so a lookup by bytes lands in the same bucket as the stored
/// entry without materializing a temporary blob. Size is implied by the
/// content; refcount and address never feed the hash, so refcount churn
/// cannot move or lose an entry.
pub(crate) struct ContentHasher {
    state: RandomState,
}

impl ContentHasher {
    pub(crate) fn new() -> Self {
        Self {
            state: RandomState::new(),
        }
    }

    /// Hashes raw content bytes.
    pub(crate) fn hash_content(&self, content: &[u8]) -> u64 {
        self.state.hash_one(content)
    }

    /// Hashes a pooled handle by the content it points at.
    ///
    /// # Safety
    ///
    /// The backing blob must be alive.
    pub(crate) unsafe fn hash_handle(&self, handle: BlobHandle) -> u64 {
        // SAFETY: forwarded caller contract.
        self.hash_content(unsafe { handle.view() })
    }
}

impl Default for ContentHasher {
    fn default() -> Self {
        Self::new()
    }
}
