//! The Interner type - pool plus lifetime management.

use std::fmt;

use crate::blob::{Blob, BlobHandle};
use crate::error::InternError;
use crate::pool::BlobPool;

/// Deduplicating owner of interned blobs.
///
/// `Interner` wires the pieces together so call sites do not repeat the
/// protocol: [`intern`](Interner::intern) looks the content up in the pool
/// and either bumps the existing blob's refcount (hit) or constructs a new
/// blob and pools it (miss); [`release`](Interner::release) drops one
/// ownership and retires the blob — erase from the pool, destroy the
/// allocation — once its refcount reaches 0.
///
/// An interned blob is in exactly one of two states: *interned* (pooled,
/// refcount ≥ 1) or *retired* (erased and destroyed). There is no way back;
/// re-interning the same content after retirement builds a brand-new blob.
///
/// Unlike [`BlobPool`], the interner owns its blobs: whatever is still
/// pooled when the interner drops is destroyed with it, outstanding
/// refcounts notwithstanding. Handles must not be used past their
/// interner's lifetime.
///
/// # Example
///
/// ```
/// use internrs::Interner;
///
/// let mut interner = Interner::new();
///
/// let a = interner.intern(b"key")?;
/// let b = interner.intern(b"key")?;
/// assert_eq!(a.as_ptr(), b.as_ptr());
/// assert_eq!(unsafe { a.ref_count() }, 2);
///
/// unsafe {
///     interner.release(b);
///     interner.release(a); // refcount hits 0: erased and destroyed
/// }
/// assert!(!interner.contains(b"key"));
/// # Ok::<(), internrs::InternError>(())
/// ```
pub struct Interner {
    pool: BlobPool,
}

impl Interner {
    /// Creates an empty interner.
    pub fn new() -> Self {
        Self {
            pool: BlobPool::new(),
        }
    }

    /// Creates an empty interner sized for at least `capacity` distinct
    /// values.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            pool: BlobPool::with_capacity(capacity),
        }
    }

    /// Interns `content`, returning a handle the caller now co-owns.
    ///
    /// On a pool hit the existing blob's refcount is incremented and its
    /// handle returned; on a miss a new blob is constructed from the
    /// thread's memory resource and pooled with refcount 1. Either way the
    /// returned handle stays valid until the matching
    /// [`release`](Interner::release) — or the interner's drop.
    ///
    /// # Errors
    ///
    /// Returns [`InternError::ContentTooLarge`] if `content` is longer than
    /// a blob can record.
    ///
    /// # Example
    ///
    /// ```
    /// use internrs::Interner;
    ///
    /// let mut interner = Interner::new();
    /// let handle = interner.intern(b"value")?;
    /// assert_eq!(unsafe { handle.view() }, b"value");
    /// # unsafe { interner.release(handle) };
    /// # Ok::<(), internrs::InternError>(())
    /// ```
    pub fn intern(&mut self, content: &[u8]) -> Result<BlobHandle, InternError> {
        if let Some(handle) = self.pool.find(content) {
            // SAFETY: pooled blobs are owned by this interner and alive.
            unsafe { handle.incr_ref_count() };
            return Ok(handle);
        }

        let handle = Blob::new(content)?.into_handle();
        // SAFETY: the interner keeps the blob alive until the entry is
        // erased in `release` or destroyed in `drop`.
        unsafe { self.pool.insert(handle) };
        Ok(handle)
    }

    /// Gives up one ownership of an interned blob.
    ///
    /// Decrements the refcount; at 0 the blob is retired — erased from the
    /// pool and its allocation returned to the memory resource.
    ///
    /// # Safety
    ///
    /// `handle` must have been returned by [`intern`](Interner::intern) on
    /// this interner and not yet released down to 0.
    ///
    /// # Panics
    ///
    /// Panics with "Attempt to decrease zero refcount" on a handle whose
    /// count is already 0 (a double release that slipped past the safety
    /// contract above).
    pub unsafe fn release(&mut self, handle: BlobHandle) {
        // SAFETY: per the caller contract the blob is alive and pooled.
        unsafe {
            handle.decr_ref_count();
            if handle.ref_count() == 0 {
                self.pool.erase(handle);
                drop(Blob::from_handle(handle));
            }
        }
    }

    /// Returns true iff `content` is currently interned.
    pub fn contains(&self, content: &[u8]) -> bool {
        self.pool.contains(content)
    }

    /// Returns the number of distinct interned values.
    pub fn len(&self) -> usize {
        self.pool.len()
    }

    /// Returns true if nothing is interned.
    pub fn is_empty(&self) -> bool {
        self.pool.is_empty()
    }
}

impl Drop for Interner {
    fn drop(&mut self) {
        // The owning container destroys whatever is still pooled at
        // teardown; outstanding handles die with it.
        for handle in self.pool.drain() {
            // SAFETY: every pooled blob is owned by this interner, and the
            // drain removed its only other alias.
            drop(unsafe { Blob::from_handle(handle) });
        }
    }
}

impl Default for Interner {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Interner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Interner").field("len", &self.len()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_miss_constructs_with_refcount_one() {
        let mut interner = Interner::new();
        let handle = interner.intern(b"fresh").unwrap();

        assert_eq!(unsafe { handle.ref_count() }, 1);
        assert_eq!(unsafe { handle.view() }, b"fresh");
        assert!(interner.contains(b"fresh"));
        assert_eq!(interner.len(), 1);

        unsafe { interner.release(handle) };
    }

    #[test]
    fn test_hit_shares_the_allocation() {
        let mut interner = Interner::new();
        let a = interner.intern(b"shared").unwrap();
        let b = interner.intern(b"shared").unwrap();
        let c = interner.intern(b"shared").unwrap();

        assert_eq!(a.as_ptr(), b.as_ptr());
        assert_eq!(a.as_ptr(), c.as_ptr());
        assert_eq!(unsafe { a.ref_count() }, 3);
        assert_eq!(interner.len(), 1);

        unsafe {
            interner.release(a);
            interner.release(b);
            interner.release(c);
        }
        assert!(interner.is_empty());
    }

    #[test]
    fn test_release_keeps_shared_blobs_interned() {
        let mut interner = Interner::new();
        let a = interner.intern(b"kept").unwrap();
        let b = interner.intern(b"kept").unwrap();

        unsafe { interner.release(a) };
        // One owner remains: still interned.
        assert!(interner.contains(b"kept"));
        assert_eq!(unsafe { b.ref_count() }, 1);

        unsafe { interner.release(b) };
        assert!(!interner.contains(b"kept"));
    }

    #[test]
    fn test_reintern_after_retirement_is_a_new_blob() {
        let mut interner = Interner::new();
        let first = interner.intern(b"cycle").unwrap();
        unsafe { interner.release(first) };
        assert!(!interner.contains(b"cycle"));

        let second = interner.intern(b"cycle").unwrap();
        assert_eq!(unsafe { second.ref_count() }, 1);
        assert!(interner.contains(b"cycle"));
        unsafe { interner.release(second) };
    }

    #[test]
    fn test_distinct_contents_get_distinct_blobs() {
        let mut interner = Interner::new();
        let a = interner.intern(b"one").unwrap();
        let b = interner.intern(b"two").unwrap();

        assert_ne!(a.as_ptr(), b.as_ptr());
        assert_eq!(interner.len(), 2);

        unsafe {
            interner.release(a);
            interner.release(b);
        }
    }

    #[test]
    fn test_empty_content_interns() {
        let mut interner = Interner::new();
        let a = interner.intern(b"").unwrap();
        let b = interner.intern(b"").unwrap();

        assert_eq!(a.as_ptr(), b.as_ptr());
        assert_eq!(unsafe { a.size() }, 0);

        unsafe {
            interner.release(a);
            interner.release(b);
        }
    }
}
