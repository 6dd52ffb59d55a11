//! Blob allocation layout and raw header access.
//!
//! Layout is: 4 bytes size, 4 bytes refcount, content bytes, trailing nul.
//! The trailing nul is required so collaborators can read the content as a
//! C-style string without a separate length. Handles point directly at the
//! content, so size and refcount live at small negative offsets:
//!
//! ```text
//!     [size:4] [refcount:4] [content] [\0]
//!     ^-8      ^-4          ^handle
//! ```
//!
//! Memory resources guarantee byte alignment only, so header fields are
//! read and written unaligned.

use std::ptr::{self, NonNull};
use std::slice;

use crate::mem;

/// Bytes of header preceding the content.
pub(crate) const HEADER_SIZE: usize = size_of::<u32>() * 2;

const SIZE_OFFSET: isize = -8;
const REFCOUNT_OFFSET: isize = -4;

/// Total allocation size for `len` content bytes.
pub(crate) const fn alloc_size(len: usize) -> usize {
    HEADER_SIZE + len + 1
}

/// Allocates and initializes a blob block from the thread's memory
/// resource, returning the content pointer. The refcount starts at 1.
///
/// `size` must be `bytes.len()` as `u32`; the caller has already range
/// checked it.
pub(crate) fn create(bytes: &[u8], size: u32) -> NonNull<u8> {
    let block = mem::with_thread_resource(|r| r.allocate(alloc_size(bytes.len())));
    // SAFETY: `block` spans `HEADER_SIZE + bytes.len() + 1` bytes, so the
    // header writes, the content copy, and the sentinel all stay in bounds.
    unsafe {
        block.as_ptr().cast::<u32>().write_unaligned(size);
        block
            .as_ptr()
            .add(size_of::<u32>())
            .cast::<u32>()
            .write_unaligned(1);

        let content = block.as_ptr().add(HEADER_SIZE);
        ptr::copy_nonoverlapping(bytes.as_ptr(), content, bytes.len());
        content.add(bytes.len()).write(0);

        NonNull::new_unchecked(content)
    }
}

/// Returns a blob's block to the thread's memory resource.
///
/// # Safety
///
/// `content` must point at the content of a live blob block that was
/// produced by [`create`] under the same thread resource, and must not be
/// used afterwards.
pub(crate) unsafe fn destroy(content: NonNull<u8>) {
    // SAFETY: per the caller contract the header is readable and the block
    // starts HEADER_SIZE bytes before the content.
    unsafe {
        let total = alloc_size(read_size(content) as usize);
        let block = NonNull::new_unchecked(content.as_ptr().sub(HEADER_SIZE));
        mem::with_thread_resource(|r| r.deallocate(block, total));
    }
}

/// Reads the stored content length.
///
/// # Safety
///
/// `content` must point at the content of a live blob block.
pub(crate) unsafe fn read_size(content: NonNull<u8>) -> u32 {
    // SAFETY: the size field sits SIZE_OFFSET bytes before the content.
    unsafe {
        content
            .as_ptr()
            .offset(SIZE_OFFSET)
            .cast::<u32>()
            .read_unaligned()
    }
}

/// Reads the stored refcount.
///
/// # Safety
///
/// `content` must point at the content of a live blob block.
pub(crate) unsafe fn read_ref_count(content: NonNull<u8>) -> u32 {
    // SAFETY: the refcount field sits REFCOUNT_OFFSET bytes before the
    // content.
    unsafe {
        content
            .as_ptr()
            .offset(REFCOUNT_OFFSET)
            .cast::<u32>()
            .read_unaligned()
    }
}

/// Overwrites the stored refcount.
///
/// # Safety
///
/// `content` must point at the content of a live blob block, and no borrow
/// of the header may be outstanding (content borrows are unaffected).
pub(crate) unsafe fn write_ref_count(content: NonNull<u8>, count: u32) {
    // SAFETY: same field as `read_ref_count`.
    unsafe {
        content
            .as_ptr()
            .offset(REFCOUNT_OFFSET)
            .cast::<u32>()
            .write_unaligned(count);
    }
}

/// Increments the refcount, panicking on a count already at the maximum.
///
/// # Safety
///
/// Same contract as [`write_ref_count`].
pub(crate) unsafe fn incr_ref_count(content: NonNull<u8>) {
    // SAFETY: forwarded caller contract.
    let count = unsafe { read_ref_count(content) };
    assert!(count != u32::MAX, "Attempt to increase max refcount");
    // SAFETY: forwarded caller contract.
    unsafe { write_ref_count(content, count + 1) };
}

/// Decrements the refcount, panicking on a count already at zero.
///
/// # Safety
///
/// Same contract as [`write_ref_count`].
pub(crate) unsafe fn decr_ref_count(content: NonNull<u8>) {
    // SAFETY: forwarded caller contract.
    let count = unsafe { read_ref_count(content) };
    assert!(count != 0, "Attempt to decrease zero refcount");
    // SAFETY: forwarded caller contract.
    unsafe { write_ref_count(content, count - 1) };
}

/// Borrows the content bytes, sentinel excluded.
///
/// # Safety
///
/// `content` must point at the content of a live blob block, and the block
/// must stay live for the caller-chosen lifetime `'a`.
pub(crate) unsafe fn content_bytes<'a>(content: NonNull<u8>) -> &'a [u8] {
    // SAFETY: a live block holds exactly `read_size` content bytes starting
    // at `content`.
    unsafe { slice::from_raw_parts(content.as_ptr(), read_size(content) as usize) }
}
