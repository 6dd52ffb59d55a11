//! Content hashing for pool keys.
//!
//! This module provides the one hashing scheme shared by every form a pool
//! key can take, so lookups by raw bytes agree with stored handles. It is
//! an implementation detail and not part of the public API.
//!
//! - [`ContentHasher`] - keyed aHash state applied to content bytes only

mod content;

pub(crate) use content::ContentHasher;
