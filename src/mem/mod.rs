//! Memory resources backing blob allocations.
//!
//! Every blob obtains its single allocation from a [`MemoryResource`] and
//! returns it to the same resource on destruction. The resource in effect is
//! installed per thread with [`set_thread_resource`]; threads without an
//! installed resource fall back to the global allocator via
//! [`SystemResource`]. One resource per thread matches the crate's
//! single-writer model: a family of blobs and its pool live and die on one
//! logical owner.
//!
//! # Example
//!
//! ```
//! use std::rc::Rc;
//! use internrs::mem::{self, TrackingResource};
//! use internrs::Blob;
//!
//! let resource = Rc::new(TrackingResource::new());
//! mem::set_thread_resource(resource.clone());
//!
//! let blob = Blob::new(b"abc")?;
//! assert_eq!(resource.used(), 8 + 3 + 1);
//!
//! drop(blob);
//! assert_eq!(resource.used(), 0);
//! # Ok::<(), internrs::InternError>(())
//! ```

mod resource;

pub use resource::{MemoryResource, SystemResource, TrackingResource};

use std::cell::RefCell;
use std::rc::Rc;

// Per-thread resource override
thread_local! {
    static THREAD_RESOURCE: RefCell<Option<Rc<dyn MemoryResource>>> = const { RefCell::new(None) };
}

/// Installs the memory resource used by blob construction and destruction
/// on the current thread.
///
/// Blobs must be destroyed on the thread (and under the resource) that
/// allocated them; installing a new resource while blobs from the previous
/// one are alive leaves their deallocation to the new resource.
pub fn set_thread_resource(resource: Rc<dyn MemoryResource>) {
    THREAD_RESOURCE.with(|current| *current.borrow_mut() = Some(resource));
}

/// Runs `f` against the current thread's resource, or [`SystemResource`]
/// if none was installed.
pub(crate) fn with_thread_resource<T>(f: impl FnOnce(&dyn MemoryResource) -> T) -> T {
    let installed = THREAD_RESOURCE.with(|current| current.borrow().clone());
    match installed {
        Some(resource) => f(resource.as_ref()),
        None => f(&SystemResource),
    }
}
