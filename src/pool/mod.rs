//! Content-addressed pooling.
//!
//! - [`BlobPool`] - non-owning set of blob handles, unique by content bytes

mod set;

pub use set::BlobPool;
