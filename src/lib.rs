//! internrs
//!
//! Content-addressed byte-blob interning for Rust.
//!
//! `internrs` stores an immutable byte sequence once, in a single
//! manually-managed allocation that carries its own length and reference
//! count inline, and deduplicates equal-content values through a pool that
//! can be queried by raw bytes without building a temporary value. It is
//! designed as a small, composable primitive for:
//!
//! - document stores with many repeated keys/values
//! - symbol tables and string pools
//! - per-shard value deduplication
//!
//! The crate intentionally:
//! - does NOT garbage-collect or keep weak references
//! - does NOT evict from the pool
//! - does NOT synchronize across threads
//! - does NOT interpret blob content
//!
//! It only does one thing: **bytes in → one shared refcounted blob out**
//!
//! # Interning
//!
//! ```
//! use internrs::Interner;
//!
//! fn main() -> Result<(), internrs::InternError> {
//!     let mut interner = Interner::new();
//!
//!     let a = interner.intern(b"session_id")?;
//!     let b = interner.intern(b"session_id")?;
//!     assert_eq!(a.as_ptr(), b.as_ptr()); // one allocation, two owners
//!
//!     unsafe {
//!         interner.release(a);
//!         interner.release(b);
//!     }
//!     assert!(interner.is_empty());
//!     Ok(())
//! }
//! ```
//!
//! # Manual lifetime management
//!
//! ```
//! use internrs::{Blob, BlobPool};
//!
//! fn main() -> Result<(), internrs::InternError> {
//!     let blob = Blob::new(b"payload")?;
//!     assert_eq!(blob.size(), 7);
//!     assert_eq!(blob.ref_count(), 1);
//!
//!     let mut pool = BlobPool::new();
//!     // SAFETY: `blob` outlives its pool membership below.
//!     unsafe { pool.insert(blob.handle()) };
//!     assert!(pool.contains(b"payload"));
//!
//!     unsafe { pool.erase(blob.handle()) };
//!     Ok(())
//! }
//! ```

#![deny(unsafe_op_in_unsafe_fn)]
#![warn(missing_docs)]

mod blob;
mod error;
mod intern;
mod pool;

mod hash; // internal content hashing for pool keys
pub mod mem;

//
// Public surface (intentionally tiny)
//

pub use blob::{Blob, BlobHandle};
pub use error::InternError;
pub use intern::Interner;
pub use pool::BlobPool;
