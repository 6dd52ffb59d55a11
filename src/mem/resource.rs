//! Memory resource trait and the built-in implementations.

use std::alloc::{self, Layout};
use std::cell::Cell;
use std::ptr::NonNull;

/// A source of raw byte buffers for blob storage.
///
/// Resources hand out exactly the requested number of bytes with no
/// alignment guarantee beyond byte addressability; blob headers are read
/// and written unaligned accordingly. Requests are always non-zero (a blob
/// occupies at least its header plus the sentinel byte).
///
/// Allocation failure is the resource's own business: implementations may
/// abort, panic, or never fail, but must not return a dangling pointer.
pub trait MemoryResource {
    /// Allocates `size` bytes.
    fn allocate(&self, size: usize) -> NonNull<u8>;

    /// Returns `size` bytes at `ptr`, previously obtained from
    /// [`allocate`](MemoryResource::allocate) with the same `size`.
    fn deallocate(&self, ptr: NonNull<u8>, size: usize);
}

/// The default resource, backed by the global allocator.
///
/// Allocation failure aborts through [`std::alloc::handle_alloc_error`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemResource;

impl MemoryResource for SystemResource {
    fn allocate(&self, size: usize) -> NonNull<u8> {
        let layout = byte_layout(size);
        // SAFETY: `size` is non-zero per the trait contract, so `layout`
        // has non-zero size.
        let ptr = unsafe { alloc::alloc(layout) };
        match NonNull::new(ptr) {
            Some(ptr) => ptr,
            None => alloc::handle_alloc_error(layout),
        }
    }

    fn deallocate(&self, ptr: NonNull<u8>, size: usize) {
        // SAFETY: `ptr` came from `allocate` on this resource with the same
        // `size`, hence the same layout.
        unsafe { alloc::dealloc(ptr.as_ptr(), byte_layout(size)) }
    }
}

fn byte_layout(size: usize) -> Layout {
    Layout::array::<u8>(size).expect("allocation size exceeds address space")
}

/// A decorator that counts live bytes in its inner resource.
///
/// Useful for exact memory accounting: every allocation adds its size to
/// [`used`](TrackingResource::used) and every deallocation subtracts it, so
/// a balanced acquire/release sequence returns the counter to its starting
/// value.
///
/// # Example
///
/// ```
/// use internrs::mem::{MemoryResource, TrackingResource};
///
/// let resource = TrackingResource::new();
/// let ptr = resource.allocate(64);
/// assert_eq!(resource.used(), 64);
///
/// resource.deallocate(ptr, 64);
/// assert_eq!(resource.used(), 0);
/// ```
#[derive(Debug)]
pub struct TrackingResource<R = SystemResource> {
    inner: R,
    used: Cell<usize>,
}

impl TrackingResource<SystemResource> {
    /// Creates a tracker over the global allocator.
    pub fn new() -> Self {
        Self::wrap(SystemResource)
    }
}

impl<R: MemoryResource> TrackingResource<R> {
    /// Creates a tracker over an arbitrary inner resource.
    pub fn wrap(inner: R) -> Self {
        Self {
            inner,
            used: Cell::new(0),
        }
    }

    /// Returns the number of currently live bytes.
    pub fn used(&self) -> usize {
        self.used.get()
    }
}

impl Default for TrackingResource<SystemResource> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: MemoryResource> MemoryResource for TrackingResource<R> {
    fn allocate(&self, size: usize) -> NonNull<u8> {
        let ptr = self.inner.allocate(size);
        self.used.set(self.used.get() + size);
        ptr
    }

    fn deallocate(&self, ptr: NonNull<u8>, size: usize) {
        self.inner.deallocate(ptr, size);
        self.used.set(self.used.get() - size);
    }
}
