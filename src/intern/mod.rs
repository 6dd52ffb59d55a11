//! Interning driver.
//!
//! - [`Interner`] - owns a pool plus blob lifetime, and encodes the
//!   hit/miss/release protocol

mod interner;

pub use interner::Interner;
