//! Growable contiguous sequence built from two layers: `RawStorage`, which owns
//! uninitialized memory and nothing else, and `Sequence`, which constructs and drops
//! values inside it.
//!
//! ```
//! use memseq::Sequence;
//!
//! let mut seq = Sequence::new();
//! seq.push_back(1);
//! seq.push_back(3);
//! seq.insert(1, 2);
//! assert_eq!(&[1, 2, 3], seq.as_slice());
//! assert_eq!(4, seq.capacity());
//!
//! seq.erase(0);
//! assert_eq!(&[2, 3], seq.as_slice());
//! ```
//!
//! Enable the `logging` feature to report allocations and reallocations through `log`.

#[macro_use]
mod logging;

mod error;
mod raw;
mod transfer;
mod sequence;
mod edit;

pub use error::{StorageError, ConstructError};
pub use raw::RawStorage;
pub use transfer::{TransferPolicy, Relocate, CloneOnGrow};
pub use sequence::Sequence;

#[cfg(test)]
pub mod dropflag;
