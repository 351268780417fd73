use std::{collections::HashMap, sync::Arc};

use async_stream::try_stream;
use async_trait::async_trait;
use futures_util::Stream;
use rolegate_common::Address;
use tokio::sync::RwLock;

use crate::{RecordSource, RecordStore, RolegateStorageError, Write, WriteBatch};

/// A trivial implementation of [RecordStore] - backed by a [HashMap] - where
/// all records are kept in memory and never persisted.
///
/// Clones share the same underlying map.
#[derive(Clone, Default)]
pub struct MemoryRecordStore {
    entries: Arc<RwLock<HashMap<Address, Vec<u8>>>>,
}

impl MemoryRecordStore {
    /// Number of records currently held.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// True when no records are held.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
impl RecordStore for MemoryRecordStore {
    async fn get(&self, address: &Address) -> Result<Option<Vec<u8>>, RolegateStorageError> {
        let entries = self.entries.read().await;
        Ok(entries.get(address).cloned())
    }

    async fn commit(&mut self, batch: WriteBatch) -> Result<(), RolegateStorageError> {
        let mut entries = self.entries.write().await;
        for (address, write) in batch.iter() {
            match write {
                Write::Put(bytes) => {
                    entries.insert(*address, bytes.clone());
                }
                Write::Close => {
                    entries.remove(address);
                }
            }
        }
        Ok(())
    }
}

impl RecordSource for MemoryRecordStore {
    fn scan(&self) -> impl Stream<Item = Result<(Address, Vec<u8>), RolegateStorageError>> {
        try_stream! {
            let entries = self.entries.read().await;
            for (address, bytes) in entries.iter() {
                yield (*address, bytes.clone());
            }
        }
    }
}
