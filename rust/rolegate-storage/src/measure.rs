use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use async_trait::async_trait;
use futures_util::Stream;
use rolegate_common::Address;

use crate::{RecordSource, RecordStore, RolegateStorageError, WriteBatch};

/// A [MeasuredRecordStore] acts as a proxy over a [RecordStore]
/// implementation that counts reads and committed batches.
#[derive(Clone)]
pub struct MeasuredRecordStore<Store>
where
    Store: RecordStore,
{
    reads: Arc<AtomicUsize>,
    commits: Arc<AtomicUsize>,
    store: Store,
}

impl<Store> MeasuredRecordStore<Store>
where
    Store: RecordStore,
{
    /// Wrap the provided [RecordStore] so that reads and commits to it may be
    /// measured.
    pub fn new(store: Store) -> Self {
        Self {
            reads: Arc::new(AtomicUsize::default()),
            commits: Arc::new(AtomicUsize::default()),
            store,
        }
    }

    /// The aggregate number of reads from the wrapped [RecordStore]
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::Relaxed)
    }

    /// The aggregate number of batches committed to the wrapped [RecordStore]
    pub fn commits(&self) -> usize {
        self.commits.load(Ordering::Relaxed)
    }
}

#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
impl<Store> RecordStore for MeasuredRecordStore<Store>
where
    Store: RecordStore,
{
    async fn get(&self, address: &Address) -> Result<Option<Vec<u8>>, RolegateStorageError> {
        self.reads.fetch_add(1, Ordering::Relaxed);
        self.store.get(address).await
    }

    async fn commit(&mut self, batch: WriteBatch) -> Result<(), RolegateStorageError> {
        self.commits.fetch_add(1, Ordering::Relaxed);
        self.store.commit(batch).await
    }
}

impl<Store> RecordSource for MeasuredRecordStore<Store>
where
    Store: RecordSource,
{
    fn scan(&self) -> impl Stream<Item = Result<(Address, Vec<u8>), RolegateStorageError>> {
        self.store.scan()
    }
}
