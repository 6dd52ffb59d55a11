//! The BlobPool type - a content-keyed set of blob handles.

use std::fmt;

use hashbrown::HashTable;
use hashbrown::hash_table::Entry;

use crate::blob::BlobHandle;
use crate::hash::ContentHasher;

/// A content-addressed set of [`BlobHandle`]s.
///
/// The pool deduplicates by content bytes: at most one handle with a given
/// byte sequence is ever stored, and lookups take raw `&[u8]` content, so
/// existence checks never allocate a throwaway blob. Refcounts play no part
/// in keying — mutating a pooled blob's count neither moves nor removes its
/// entry.
///
/// # Ownership
///
/// The pool owns no blobs. Membership is pointer-only; whoever holds the
/// [`Blob`](crate::Blob) (or its leaked handle) remains responsible for
/// keeping it alive while pooled and for destroying it after
/// [`erase`](BlobPool::erase) — ordinarily once its refcount reaches 0.
///
/// # Example
///
/// ```
/// use internrs::{Blob, BlobPool};
///
/// let blob = Blob::new(b"foo")?;
/// let mut pool = BlobPool::new();
///
/// // SAFETY: `blob` stays alive for its whole pool membership.
/// unsafe { pool.insert(blob.handle()) };
/// assert!(pool.contains(b"foo"));
/// assert!(!pool.contains(b"bar"));
///
/// unsafe { pool.erase(blob.handle()) };
/// assert!(pool.is_empty());
/// # Ok::<(), internrs::InternError>(())
/// ```
pub struct BlobPool {
    table: HashTable<BlobHandle>,
    hasher: ContentHasher,
}

impl BlobPool {
    /// Creates an empty pool.
    pub fn new() -> Self {
        Self {
            table: HashTable::new(),
            hasher: ContentHasher::new(),
        }
    }

    /// Creates an empty pool sized for at least `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            table: HashTable::with_capacity(capacity),
            hasher: ContentHasher::new(),
        }
    }

    /// Returns the number of pooled handles.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns true if no handles are pooled.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Returns true iff some pooled blob has exactly this content.
    ///
    /// O(1) expected; the query hashes the raw bytes directly.
    pub fn contains(&self, content: &[u8]) -> bool {
        self.find(content).is_some()
    }

    /// Returns the pooled handle with exactly this content, if any.
    pub fn find(&self, content: &[u8]) -> Option<BlobHandle> {
        let hash = self.hasher.hash_content(content);
        self.table
            // SAFETY: pooled handles are live per the `insert` contract.
            .find(hash, |&stored| unsafe { stored.view() } == content)
            .copied()
    }

    /// Adds a handle to the pool.
    ///
    /// Returns `true` if the handle was inserted, `false` if a blob with
    /// equal content is already pooled (the insert is then a no-op — one
    /// stored definition per content; callers wanting to share it should
    /// have taken the [`find`](BlobPool::find)-and-increment path instead).
    ///
    /// # Safety
    ///
    /// The backing blob must be alive now and stay alive until the handle
    /// is erased or the pool is dropped; the pool dereferences stored
    /// handles during lookups.
    pub unsafe fn insert(&mut self, handle: BlobHandle) -> bool {
        // SAFETY: the caller guarantees `handle` is live.
        let content = unsafe { handle.view() };
        let hash = self.hasher.hash_content(content);
        let hasher = &self.hasher;
        let entry = self.table.entry(
            hash,
            // SAFETY: pooled handles are live per this method's contract.
            |&stored| unsafe { stored.view() } == content,
            // SAFETY: same liveness argument, for rehashing.
            |&stored| unsafe { hasher.hash_handle(stored) },
        );
        match entry {
            Entry::Occupied(_) => false,
            Entry::Vacant(vacant) => {
                vacant.insert(handle);
                true
            }
        }
    }

    /// Removes a handle from the pool.
    ///
    /// Returns `true` if an entry with the handle's content was removed.
    /// The blob itself is untouched — destruction stays with the caller.
    ///
    /// # Safety
    ///
    /// The backing blob must be alive (its content is read to locate the
    /// entry).
    pub unsafe fn erase(&mut self, handle: BlobHandle) -> bool {
        // SAFETY: the caller guarantees `handle` is live.
        let content = unsafe { handle.view() };
        let hash = self.hasher.hash_content(content);
        match self
            .table
            // SAFETY: pooled handles are live per the `insert` contract.
            .find_entry(hash, |&stored| unsafe { stored.view() } == content)
        {
            Ok(entry) => {
                // One entry per content, so the match is the handle's own.
                debug_assert_eq!(entry.get().as_ptr(), handle.as_ptr());
                entry.remove();
                true
            }
            Err(_) => false,
        }
    }

    /// Removes and yields every pooled handle.
    pub(crate) fn drain(&mut self) -> impl Iterator<Item = BlobHandle> + '_ {
        self.table.drain()
    }
}

impl Default for BlobPool {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for BlobPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlobPool").field("len", &self.len()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blob::Blob;

    #[test]
    fn test_insert_then_contains_by_content() {
        let blob = Blob::new(b"foo").unwrap();
        let mut pool = BlobPool::new();

        assert!(unsafe { pool.insert(blob.handle()) });
        assert!(pool.contains(b"foo"));
        assert!(!pool.contains(b"fo"));
        assert!(!pool.contains(b"foo\0"));
        assert_eq!(pool.len(), 1);

        assert!(unsafe { pool.erase(blob.handle()) });
    }

    #[test]
    fn test_find_returns_the_stored_handle() {
        let blob = Blob::new(b"needle").unwrap();
        let mut pool = BlobPool::new();
        unsafe { pool.insert(blob.handle()) };

        let found = pool.find(b"needle").expect("pooled content must be found");
        assert_eq!(found.as_ptr(), blob.data());
        assert!(pool.find(b"haystack").is_none());

        unsafe { pool.erase(blob.handle()) };
    }

    #[test]
    fn test_duplicate_content_insert_is_a_noop() {
        let first = Blob::new(b"dup").unwrap();
        let second = Blob::new(b"dup").unwrap();
        let mut pool = BlobPool::new();

        assert!(unsafe { pool.insert(first.handle()) });
        assert!(!unsafe { pool.insert(second.handle()) });
        assert_eq!(pool.len(), 1);

        // The original entry survives.
        let found = pool.find(b"dup").unwrap();
        assert_eq!(found.as_ptr(), first.data());

        unsafe { pool.erase(first.handle()) };
    }

    #[test]
    fn test_refcount_churn_keeps_membership() {
        let blob = Blob::new(b"foo").unwrap();
        let mut pool = BlobPool::new();
        unsafe { pool.insert(blob.handle()) };

        // The hasher only looks at the content, so the blob is still found.
        blob.incr_ref_count();
        blob.incr_ref_count();
        blob.incr_ref_count();

        assert!(pool.contains(b"foo"));
        assert_eq!(pool.len(), 1);

        unsafe { pool.erase(blob.handle()) };
    }

    #[test]
    fn test_erase_is_membership_only() {
        let blob = Blob::new(b"kept").unwrap();
        let mut pool = BlobPool::new();
        unsafe { pool.insert(blob.handle()) };

        assert!(unsafe { pool.erase(blob.handle()) });
        assert!(!unsafe { pool.erase(blob.handle()) });
        assert!(pool.is_empty());

        // The blob is untouched by erase.
        assert_eq!(blob.view(), b"kept");
        assert_eq!(blob.ref_count(), 1);
    }

    #[test]
    fn test_empty_content_is_a_valid_key() {
        let blob = Blob::new(b"").unwrap();
        let mut pool = BlobPool::new();
        unsafe { pool.insert(blob.handle()) };

        assert!(pool.contains(b""));
        assert_eq!(pool.find(b"").unwrap().as_ptr(), blob.data());

        unsafe { pool.erase(blob.handle()) };
    }

    #[test]
    fn test_many_entries() {
        let blobs: Vec<Blob> = (0..256u32)
            .map(|i| Blob::new(format!("key-{i}").as_bytes()).unwrap())
            .collect();
        let mut pool = BlobPool::with_capacity(64);

        for blob in &blobs {
            assert!(unsafe { pool.insert(blob.handle()) });
        }
        assert_eq!(pool.len(), 256);

        for (i, blob) in blobs.iter().enumerate() {
            let key = format!("key-{i}");
            let found = pool.find(key.as_bytes()).expect("entry must survive growth");
            assert_eq!(found.as_ptr(), blob.data());
        }

        for blob in &blobs {
            assert!(unsafe { pool.erase(blob.handle()) });
        }
        assert!(pool.is_empty());
    }
}
