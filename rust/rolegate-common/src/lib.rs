#![warn(missing_docs)]

//! This crate constitutes a library of light weight helpers that are shared
//! across the other rolegate crates: the [`Address`] type that every record is
//! located by, the pure [address deriver](derive_address), and the clock
//! abstraction that expiry checks read from.

mod sync;
pub use sync::*;

mod address;
pub use address::*;

mod derive;
pub use derive::*;

pub mod time;
pub use time::{Clock, FixedClock, SystemClock};
