//! The Blob type - a refcounted, sentinel-terminated byte allocation.

use std::fmt;
use std::mem::ManuallyDrop;
use std::ptr::NonNull;

use crate::blob::layout;
use crate::blob::BlobHandle;
use crate::error::InternError;

/// An immutable byte sequence in a single refcounted allocation.
///
/// The allocation holds a fixed header (content length and refcount)
/// immediately followed by the content bytes and a trailing nul, and is
/// obtained from the current thread's memory resource (see [`crate::mem`]).
/// A `Blob` is the size of one pointer and points directly at the content,
/// so [`data`](Blob::data) needs no arithmetic.
///
/// # Sharing
///
/// `Blob` is move-only: there is no `Clone`, so a second owner is always
/// expressed by [`incr_ref_count`](Blob::incr_ref_count) on the existing
/// allocation, never by a duplicate one. The refcount starts at exactly 1,
/// representing the owner returned by [`new`](Blob::new); it is bookkeeping
/// for callers and pools — dropping the `Blob` frees the allocation
/// regardless of the counter.
///
/// # Example
///
/// ```
/// use internrs::Blob;
///
/// let blob = Blob::new(b"1234567")?;
/// assert_eq!(blob.size(), 7);
/// assert_eq!(blob.ref_count(), 1);
/// assert_eq!(blob.view(), b"1234567");
/// # Ok::<(), internrs::InternError>(())
/// ```
pub struct Blob {
    content: NonNull<u8>,
}

impl Blob {
    /// Allocates a blob holding a copy of `content`.
    ///
    /// The allocation requests exactly `8 + content.len() + 1` bytes from
    /// the thread's memory resource. The result's refcount is 1.
    ///
    /// # Errors
    ///
    /// Returns [`InternError::ContentTooLarge`] if the content length does
    /// not fit the header's `u32` size field. Allocation failure is not an
    /// error value; it follows the memory resource's own convention.
    ///
    /// # Example
    ///
    /// ```
    /// use internrs::Blob;
    ///
    /// let blob = Blob::new(b"hello")?;
    /// assert_eq!(blob.size(), 5);
    /// # Ok::<(), internrs::InternError>(())
    /// ```
    pub fn new(content: &[u8]) -> Result<Self, InternError> {
        let size = u32::try_from(content.len()).map_err(|_| InternError::ContentTooLarge {
            actual: content.len(),
            max: u32::MAX as usize,
        })?;
        Ok(Self {
            content: layout::create(content, size),
        })
    }

    /// Returns the content length in bytes (sentinel excluded).
    pub fn size(&self) -> u32 {
        // SAFETY: `self.content` points at a live blob block.
        unsafe { layout::read_size(self.content) }
    }

    /// Returns the current refcount.
    pub fn ref_count(&self) -> u32 {
        // SAFETY: `self.content` points at a live blob block.
        unsafe { layout::read_ref_count(self.content) }
    }

    /// Borrows the content bytes.
    ///
    /// The view stays valid exactly as long as the blob itself.
    pub fn view(&self) -> &[u8] {
        // SAFETY: `self.content` points at a live blob block and the
        // returned borrow is tied to `self`.
        unsafe { layout::content_bytes(self.content) }
    }

    /// Returns the nul-terminated content pointer.
    ///
    /// The pointee is the content followed by a trailing `0` byte, so
    /// collaborators expecting C-style string access can consume it without
    /// re-deriving the length. Valid as long as the blob is alive.
    pub fn data(&self) -> *const u8 {
        self.content.as_ptr()
    }

    /// Increments the refcount by 1.
    ///
    /// # Panics
    ///
    /// Panics with "Attempt to increase max refcount" if the count is
    /// already `u32::MAX` — a refcounting bug in the caller, not a
    /// recoverable condition.
    pub fn incr_ref_count(&self) {
        // SAFETY: `self.content` points at a live blob block; no header
        // borrows exist.
        unsafe { layout::incr_ref_count(self.content) }
    }

    /// Decrements the refcount by 1.
    ///
    /// Reaching 0 is the caller's signal that no logical owner remains:
    /// the blob should then be removed from any pool and dropped.
    ///
    /// # Panics
    ///
    /// Panics with "Attempt to decrease zero refcount" if the count is
    /// already 0 — a refcounting bug in the caller, not a recoverable
    /// condition.
    pub fn decr_ref_count(&self) {
        // SAFETY: `self.content` points at a live blob block; no header
        // borrows exist.
        unsafe { layout::decr_ref_count(self.content) }
    }

    /// Returns a non-owning handle aliasing this blob's allocation.
    ///
    /// The handle is only valid while the blob is alive; see
    /// [`BlobHandle`] for the access contract.
    pub fn handle(&self) -> BlobHandle {
        BlobHandle::from_content(self.content)
    }

    /// Consumes the blob without freeing it, returning the aliasing handle.
    ///
    /// Ownership of the allocation is transferred to the handle, exactly
    /// like [`Box::into_raw`]; reclaim it with
    /// [`from_handle`](Blob::from_handle) to free the memory.
    pub fn into_handle(self) -> BlobHandle {
        let this = ManuallyDrop::new(self);
        BlobHandle::from_content(this.content)
    }

    /// Rebuilds the owning blob from a handle produced by
    /// [`into_handle`](Blob::into_handle).
    ///
    /// # Safety
    ///
    /// `handle` must alias a live allocation whose ownership was given up
    /// via `into_handle` and not already reclaimed, and the current
    /// thread's memory resource must be the one that allocated it.
    pub unsafe fn from_handle(handle: BlobHandle) -> Self {
        Self {
            content: handle.content(),
        }
    }

    /// Overwrites the refcount, bypassing the increment/decrement bounds.
    #[cfg(test)]
    pub(crate) fn set_ref_count(&self, count: u32) {
        // SAFETY: `self.content` points at a live blob block.
        unsafe { layout::write_ref_count(self.content, count) }
    }
}

impl Drop for Blob {
    fn drop(&mut self) {
        // SAFETY: a live `Blob` exclusively owns its block; after drop the
        // pointer is unreachable through this value.
        unsafe { layout::destroy(self.content) }
    }
}

/// Content equality: two blobs are equal iff their content bytes are,
/// whatever their addresses or refcounts.
impl PartialEq for Blob {
    fn eq(&self, other: &Self) -> bool {
        self.view() == other.view()
    }
}

impl Eq for Blob {}

impl fmt::Debug for Blob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Blob")
            .field("size", &self.size())
            .field("ref_count", &self.ref_count())
            .finish()
    }
}
