//! ## Intro
//!
//! A heap-allocated vector whose capacity is chosen once, at construction,
//! and never changes afterwards.
//!
//! [`FixedVec`] allocates its buffer exactly once. Pushing past the capacity
//! is an error instead of a reallocation, so element addresses stay stable
//! for the whole life of the vector and no hidden allocation ever happens on
//! a hot path.
//!
//! Elements are constructed in place through closures (`emplace_back`,
//! `emplace`, `emplace_at`, `with_emplaced`), so types that are neither
//! [`Clone`] nor cheap to move can be stored without a temporary.
//!
//! ```
//! # use fixedvec::{Error, FixedVec, fixedvec};
//! let mut vec: FixedVec<i32> = FixedVec::with_capacity(4);
//! assert_eq!(vec.capacity(), 4);
//!
//! vec.push(1)?;
//! vec.emplace_back(|| 3)?;
//! vec.emplace(1, || 2)?;
//! assert_eq!(vec, [1, 2, 3]);
//!
//! vec.insert_n(0, 1, 0)?;
//! assert_eq!(vec.push(4), Err(Error::Full));
//!
//! let vec = fixedvec![10, 20, 30];
//! assert_eq!(vec.capacity(), 3);
//! # Ok::<(), Error>(())
//! ```
//!
//! ## Errors
//!
//! Every fallible operation returns [`Error`] and leaves the vector
//! untouched when its precondition fails: [`Error::Full`] when the capacity
//! would be exceeded, [`Error::Empty`] for `pop` on an empty vector and
//! [`Error::OutOfBounds`] for a bad position.
//! Indexing with `[]` panics like a slice does; use [`FixedVec::at`] for a
//! checked lookup.
//!
//! ## Iterators
//!
//! [`Iter`] and [`IterMut`] are random-access: besides the usual iterator
//! adapters they support `it + n`, `it - n`, distance and ordering between
//! positions of the same vector. They borrow the vector, so any mutation that
//! relocates elements cannot run while an iterator is alive.
//!
//! ## `no_std` support
//!
//! This crate requires only `core` and `alloc`.
//!
//! ## Optional features
//!
//! ### `serde`
//!
//! When this optional dependency is enabled, [`FixedVec`] implements the
//! [`serde::Serialize`] and [`serde::Deserialize`] traits, and
//! [`FixedVec::deserialize_with_capacity`] reads into a bounded buffer.
//!
//! [`serde::Serialize`]: https://docs.rs/serde/latest/serde/trait.Serialize.html
//! [`serde::Deserialize`]: https://docs.rs/serde/latest/serde/trait.Deserialize.html
#![cfg_attr(not(test), no_std)]

extern crate alloc;

mod utils;

mod error;
pub use error::Error;

mod storage;

pub mod fixed_vec;
#[doc(inline)]
pub use fixed_vec::{FixedVec, IntoIter};

pub mod iter;
#[doc(inline)]
pub use iter::{Iter, IterMut};

#[cfg(feature = "serde")]
mod serde;
