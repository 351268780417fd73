#![warn(missing_docs)]

//! This crate contains the record store that rolegate keeps its state in.
//!
//! A store maps [`Address`](rolegate_common::Address)es to opaque record
//! bytes. There is no index: whether a record exists is answered by looking
//! at the one address it must live at. All mutation goes through a
//! [`WriteBatch`], which a backend applies all-or-nothing, and a
//! [`Transaction`] stages writes into such a batch while letting the caller
//! read its own uncommitted writes:
//!
//! ```rust
//! # async fn example() -> Result<(), rolegate_storage::RolegateStorageError> {
//! use rolegate_common::Address;
//! use rolegate_storage::{MemoryRecordStore, RecordStore, Transaction};
//!
//! let mut store = MemoryRecordStore::default();
//! let address = Address::from([1u8; 32]);
//!
//! let mut transaction = Transaction::new(&store);
//! transaction.put(address, vec![1, 2, 3]);
//! assert!(transaction.exists(&address).await?);
//!
//! let batch = transaction.into_batch();
//! store.commit(batch).await?;
//! assert_eq!(store.get(&address).await?, Some(vec![1, 2, 3]));
//! # Ok(())
//! # }
//! ```

mod error;
pub use error::*;

mod batch;
pub use batch::*;

mod backend;
pub use backend::*;

mod transaction;
pub use transaction::*;

mod measure;
pub use measure::*;
