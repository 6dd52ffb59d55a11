//! Non-owning blob handles.

use std::fmt;
use std::ptr::NonNull;

use crate::blob::layout;

/// A non-owning, copyable alias of a [`Blob`](crate::Blob)'s allocation.
///
/// Pools store handles rather than blobs: membership is pointer-only, and
/// the blob's lifetime stays with whoever owns the [`Blob`](crate::Blob)
/// (or took it over via [`Blob::into_handle`](crate::Blob::into_handle)).
///
/// A handle does not track liveness, so every accessor that dereferences
/// the allocation is `unsafe`: the caller guarantees the backing blob has
/// not been dropped. [`as_ptr`](BlobHandle::as_ptr) alone is safe — it
/// only reveals the address.
#[derive(Clone, Copy)]
pub struct BlobHandle {
    content: NonNull<u8>,
}

impl BlobHandle {
    pub(crate) fn from_content(content: NonNull<u8>) -> Self {
        Self { content }
    }

    pub(crate) fn content(self) -> NonNull<u8> {
        self.content
    }

    /// Returns the nul-terminated content pointer without dereferencing it.
    ///
    /// Two handles alias the same blob iff their pointers are equal.
    pub fn as_ptr(self) -> *const u8 {
        self.content.as_ptr()
    }

    /// Reads the content length.
    ///
    /// # Safety
    ///
    /// The backing blob must be alive.
    pub unsafe fn size(self) -> u32 {
        // SAFETY: forwarded caller contract.
        unsafe { layout::read_size(self.content) }
    }

    /// Reads the current refcount.
    ///
    /// # Safety
    ///
    /// The backing blob must be alive.
    pub unsafe fn ref_count(self) -> u32 {
        // SAFETY: forwarded caller contract.
        unsafe { layout::read_ref_count(self.content) }
    }

    /// Borrows the content bytes for a caller-chosen lifetime.
    ///
    /// # Safety
    ///
    /// The backing blob must be alive, and must stay alive for the whole
    /// of `'a`.
    pub unsafe fn view<'a>(self) -> &'a [u8] {
        // SAFETY: forwarded caller contract.
        unsafe { layout::content_bytes(self.content) }
    }

    /// Increments the refcount by 1.
    ///
    /// # Safety
    ///
    /// The backing blob must be alive.
    ///
    /// # Panics
    ///
    /// Panics with "Attempt to increase max refcount" if the count is
    /// already `u32::MAX`.
    pub unsafe fn incr_ref_count(self) {
        // SAFETY: forwarded caller contract.
        unsafe { layout::incr_ref_count(self.content) }
    }

    /// Decrements the refcount by 1.
    ///
    /// # Safety
    ///
    /// The backing blob must be alive.
    ///
    /// # Panics
    ///
    /// Panics with "Attempt to decrease zero refcount" if the count is
    /// already 0.
    pub unsafe fn decr_ref_count(self) {
        // SAFETY: forwarded caller contract.
        unsafe { layout::decr_ref_count(self.content) }
    }
}

impl fmt::Debug for BlobHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("BlobHandle").field(&self.content).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blob::Blob;

    #[test]
    fn test_handle_reads_through_to_blob() {
        let blob = Blob::new(b"shared").unwrap();
        let handle = blob.handle();

        unsafe {
            assert_eq!(handle.size(), 6);
            assert_eq!(handle.ref_count(), 1);
            assert_eq!(handle.view(), b"shared");
        }
        assert_eq!(handle.as_ptr(), blob.data());
    }

    #[test]
    fn test_handle_refcount_mutation_is_visible_to_owner() {
        let blob = Blob::new(b"counted").unwrap();
        let handle = blob.handle();

        unsafe {
            handle.incr_ref_count();
            handle.incr_ref_count();
        }
        assert_eq!(blob.ref_count(), 3);

        unsafe { handle.decr_ref_count() };
        assert_eq!(blob.ref_count(), 2);
    }

    #[test]
    fn test_copies_alias_the_same_allocation() {
        let blob = Blob::new(b"alias").unwrap();
        let a = blob.handle();
        let b = a;
        assert_eq!(a.as_ptr(), b.as_ptr());
    }
}
