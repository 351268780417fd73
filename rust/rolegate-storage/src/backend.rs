use async_trait::async_trait;
use futures_util::Stream;
use rolegate_common::{Address, ConditionalSync};

use crate::{RolegateStorageError, WriteBatch};

mod memory;
pub use memory::*;

#[cfg(not(target_arch = "wasm32"))]
mod fs;
#[cfg(not(target_arch = "wasm32"))]
pub use fs::*;

/// A [RecordStore] is a facade over some storage substrate that keeps record
/// bytes against their [Address].
///
/// Stores never mutate records one at a time: every change arrives as a
/// [WriteBatch] that the store must apply atomically.
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
pub trait RecordStore: Clone + ConditionalSync {
    /// Retrieve the record (if any) stored at the given address
    async fn get(&self, address: &Address) -> Result<Option<Vec<u8>>, RolegateStorageError>;

    /// Apply every write in the batch, or none of them
    async fn commit(&mut self, batch: WriteBatch) -> Result<(), RolegateStorageError>;
}

/// A trait that may be implemented by any [`RecordStore`] that has the
/// ability to stream its contents in their entirety. Bulk read queries
/// (e.g. "every role under this root") are built on top of it.
pub trait RecordSource: RecordStore {
    /// Stream a copy of every `(address, record)` pair in the store
    fn scan(&self) -> impl Stream<Item = Result<(Address, Vec<u8>), RolegateStorageError>>;
}
