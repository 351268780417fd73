use std::{
    fmt,
    path::{Path, PathBuf},
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use async_stream::try_stream;
use async_trait::async_trait;
use base58::{FromBase58, ToBase58};
use futures_util::Stream;
use pidlock::Pidlock;
use rolegate_common::Address;
use tokio::io::AsyncWriteExt;

use crate::{RecordSource, RecordStore, RolegateStorageError, Write, WriteBatch};

const RECORDS_DIR: &str = "records";
const JOURNAL_FILE: &str = "journal";
const JOURNAL_STAGING_FILE: &str = "journal.staging";
const LOCK_FILE: &str = "lock";
const STAGING_SUFFIX: &str = ".staging";

/// A file-system-based [RecordStore] implementation. Each record is stored
/// inside `<root>/records` as a file named after its (base58-encoded)
/// address.
///
/// Batches are made atomic with a redo journal: the encoded batch is durably
/// written to `<root>/journal` before any record file is touched, and removed
/// once every write has been applied. A journal left behind by an interrupted
/// commit is replayed the next time the store is opened; a journal that does
/// not verify was never completely written, so its batch never committed and
/// it is discarded. If applying a batch fails part way, the store replays the
/// journal before it serves any further read or commit, and refuses to do
/// either for as long as the replay keeps failing.
///
/// A store directory belongs to one process at a time: [open] takes a PID
/// lock on `<root>/lock` that is held until the last clone of the store is
/// dropped.
///
/// [open]: FileSystemRecordStore::open
#[derive(Clone, Debug)]
pub struct FileSystemRecordStore {
    root_dir: PathBuf,
    interrupted: Arc<AtomicBool>,
    _lock: Arc<StoreLock>,
}

impl FileSystemRecordStore {
    /// Opens (creating if needed) a store rooted at `root_dir`, replaying any
    /// interrupted commit. Fails if another live process has the store open.
    pub async fn open<Pathlike>(root_dir: Pathlike) -> Result<Self, RolegateStorageError>
    where
        Pathlike: AsRef<Path>,
    {
        let root_dir = root_dir.as_ref().to_owned();
        tokio::fs::create_dir_all(root_dir.join(RECORDS_DIR)).await?;

        let lock = StoreLock::acquire(root_dir.join(LOCK_FILE))?;
        let store = Self {
            root_dir,
            interrupted: Arc::new(AtomicBool::new(true)),
            _lock: Arc::new(lock),
        };
        store.recover().await?;
        Ok(store)
    }

    /// The directory this store lives in.
    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    fn record_path(&self, address: &Address) -> PathBuf {
        self.root_dir
            .join(RECORDS_DIR)
            .join(address.as_ref().to_base58())
    }

    fn journal_path(&self) -> PathBuf {
        self.root_dir.join(JOURNAL_FILE)
    }

    /// Rolls a pending journal forward. Cheap when no commit was interrupted.
    async fn recover(&self) -> Result<(), RolegateStorageError> {
        if !self.interrupted.load(Ordering::SeqCst) {
            return Ok(());
        }

        let journal_path = self.journal_path();
        if tokio::fs::try_exists(&journal_path).await? {
            let bytes = tokio::fs::read(&journal_path).await?;
            match WriteBatch::decode(&bytes) {
                Ok(batch) => {
                    tracing::debug!(writes = batch.len(), "Replaying interrupted commit");
                    self.apply(&batch).await?;
                }
                Err(error) => {
                    tracing::warn!(%error, "Discarding incomplete commit journal");
                }
            }
            tokio::fs::remove_file(&journal_path).await?;
        }

        self.interrupted.store(false, Ordering::SeqCst);
        Ok(())
    }

    async fn apply(&self, batch: &WriteBatch) -> Result<(), RolegateStorageError> {
        for (address, write) in batch.iter() {
            let path = self.record_path(address);
            match write {
                Write::Put(bytes) => {
                    let staging = path.with_extension("staging");
                    tokio::fs::write(&staging, bytes).await?;
                    tokio::fs::rename(&staging, &path).await?;
                }
                Write::Close => {
                    if tokio::fs::try_exists(&path).await? {
                        tokio::fs::remove_file(&path).await?;
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
impl RecordStore for FileSystemRecordStore {
    async fn get(&self, address: &Address) -> Result<Option<Vec<u8>>, RolegateStorageError> {
        self.recover().await?;

        let path = self.record_path(address);
        if !tokio::fs::try_exists(&path).await? {
            return Ok(None);
        }

        Ok(Some(tokio::fs::read(path).await?))
    }

    async fn commit(&mut self, batch: WriteBatch) -> Result<(), RolegateStorageError> {
        self.recover().await?;

        if batch.is_empty() {
            return Ok(());
        }

        let staging = self.root_dir.join(JOURNAL_STAGING_FILE);
        {
            let mut file = tokio::fs::File::create(&staging).await?;
            file.write_all(&batch.encode()).await?;
            file.sync_all().await?;
        }
        tokio::fs::rename(&staging, self.journal_path()).await?;

        self.interrupted.store(true, Ordering::SeqCst);
        if let Err(error) = self.apply(&batch).await {
            tracing::warn!(%error, "Commit interrupted; journal kept for replay");
            return Err(error);
        }

        tokio::fs::remove_file(self.journal_path()).await?;
        self.interrupted.store(false, Ordering::SeqCst);
        Ok(())
    }
}

impl RecordSource for FileSystemRecordStore {
    fn scan(&self) -> impl Stream<Item = Result<(Address, Vec<u8>), RolegateStorageError>> {
        try_stream! {
            self.recover().await?;

            let mut directory = tokio::fs::read_dir(self.root_dir.join(RECORDS_DIR)).await?;
            while let Some(entry) = directory.next_entry().await? {
                let file_name = entry.file_name();
                let Some(name) = file_name.to_str() else {
                    continue;
                };
                if name.ends_with(STAGING_SUFFIX) {
                    continue;
                }
                let Some(address) = name
                    .from_base58()
                    .ok()
                    .and_then(|bytes| Address::try_from(bytes).ok())
                else {
                    continue;
                };

                let bytes = tokio::fs::read(entry.path()).await?;
                yield (address, bytes);
            }
        }
    }
}

/// Holds the PID lock on a store directory, releasing it when dropped.
struct StoreLock(Pidlock);

impl StoreLock {
    fn acquire(path: PathBuf) -> Result<Self, RolegateStorageError> {
        let path_str = path.to_str().ok_or_else(|| {
            RolegateStorageError::StoreLocked("Lock path is not valid UTF-8".to_string())
        })?;

        let mut lock = Pidlock::new(path_str);
        loop {
            match lock.acquire() {
                Ok(()) => return Ok(Self(lock)),
                Err(pidlock::PidlockError::LockExists) => match lock.get_owner() {
                    Some(pid) => {
                        return Err(RolegateStorageError::StoreLocked(format!(
                            "Store is open in process {pid}"
                        )));
                    }
                    // A stale lock from a dead process was cleared; try again
                    None => (),
                },
                Err(error) => {
                    return Err(RolegateStorageError::StoreLocked(format!(
                        "Failed to acquire lock: {error:?}"
                    )));
                }
            }
        }
    }
}

impl Drop for StoreLock {
    fn drop(&mut self) {
        let _ = self.0.release();
    }
}

impl fmt::Debug for StoreLock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("StoreLock")
    }
}
