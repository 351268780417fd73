use rolegate_common::Address;

use crate::{RecordStore, RolegateStorageError, Write, WriteBatch};

/// A staged view over a [`RecordStore`].
///
/// A [`Transaction`] is a conjunction of the store and a [`WriteBatch`]
/// overlay: all writes go to the overlay, and all reads check the overlay
/// first before falling back to the store. A closed address reads as absent
/// even if the store still holds it.
///
/// Nothing reaches the store until the caller takes the batch with
/// [`Transaction::into_batch`] and commits it. Dropping the transaction
/// discards every staged write.
pub struct Transaction<'a, Store>
where
    Store: RecordStore,
{
    store: &'a Store,
    staged: WriteBatch,
}

impl<'a, Store> Transaction<'a, Store>
where
    Store: RecordStore,
{
    /// Begin a transaction over `store`.
    pub fn new(store: &'a Store) -> Self {
        Self {
            store,
            staged: WriteBatch::default(),
        }
    }

    /// Read the record at `address` as this transaction sees it.
    pub async fn get(&self, address: &Address) -> Result<Option<Vec<u8>>, RolegateStorageError> {
        match self.staged.get(address) {
            Some(Write::Put(bytes)) => Ok(Some(bytes.clone())),
            Some(Write::Close) => Ok(None),
            None => self.store.get(address).await,
        }
    }

    /// Whether a record exists at `address` as this transaction sees it.
    pub async fn exists(&self, address: &Address) -> Result<bool, RolegateStorageError> {
        Ok(self.get(address).await?.is_some())
    }

    /// Stage `bytes` at `address`.
    pub fn put(&mut self, address: Address, bytes: Vec<u8>) {
        self.staged.put(address, bytes);
    }

    /// Stage removal of the record at `address`.
    pub fn close(&mut self, address: Address) {
        self.staged.close(address);
    }

    /// Finish staging and hand back the batch to commit.
    pub fn into_batch(self) -> WriteBatch {
        self.staged
    }
}
