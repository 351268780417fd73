use std::collections::BTreeMap;

use rolegate_common::{ADDRESS_SIZE, Address};

use crate::RolegateStorageError;

const JOURNAL_MAGIC: &[u8; 4] = b"RGJ1";
const CHECKSUM_SIZE: usize = 32;

const CLOSE_TAG: u8 = 0;
const PUT_TAG: u8 = 1;

/// A change to the record at one address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Write {
    /// Store these bytes at the address, replacing whatever is there
    Put(Vec<u8>),
    /// Remove the record at the address
    Close,
}

/// A set of record writes that a [`RecordStore`](crate::RecordStore) applies
/// as one unit: after a successful commit every write is visible, after a
/// failed one none is.
///
/// Writes are keyed by address, so staging two writes to the same address
/// keeps only the later one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteBatch {
    writes: BTreeMap<Address, Write>,
}

impl WriteBatch {
    /// Stage `bytes` to be stored at `address`.
    pub fn put(&mut self, address: Address, bytes: Vec<u8>) {
        self.writes.insert(address, Write::Put(bytes));
    }

    /// Stage removal of the record at `address`.
    pub fn close(&mut self, address: Address) {
        self.writes.insert(address, Write::Close);
    }

    /// The staged write for `address`, if any.
    pub fn get(&self, address: &Address) -> Option<&Write> {
        self.writes.get(address)
    }

    /// True when nothing is staged.
    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }

    /// Number of distinct addresses written.
    pub fn len(&self) -> usize {
        self.writes.len()
    }

    /// Iterate the staged writes in address order.
    pub fn iter(&self) -> impl Iterator<Item = (&Address, &Write)> {
        self.writes.iter()
    }

    /// Encodes the batch for the commit journal.
    ///
    /// Layout: magic `RGJ1`, u32 LE entry count, then per entry the 32 byte
    /// address, a tag byte (1 = put, 0 = close) and for puts a u32 LE length
    /// followed by the bytes. A BLAKE3 checksum of everything before it
    /// closes the buffer.
    pub fn encode(&self) -> Vec<u8> {
        let mut buffer = Vec::new();
        buffer.extend_from_slice(JOURNAL_MAGIC);
        buffer.extend_from_slice(&(self.writes.len() as u32).to_le_bytes());

        for (address, write) in &self.writes {
            buffer.extend_from_slice(address.as_ref());
            match write {
                Write::Put(bytes) => {
                    buffer.push(PUT_TAG);
                    buffer.extend_from_slice(&(bytes.len() as u32).to_le_bytes());
                    buffer.extend_from_slice(bytes);
                }
                Write::Close => buffer.push(CLOSE_TAG),
            }
        }

        let checksum = blake3::hash(&buffer);
        buffer.extend_from_slice(checksum.as_bytes());
        buffer
    }

    /// Decodes a batch produced by [`WriteBatch::encode`].
    pub fn decode(bytes: &[u8]) -> Result<Self, RolegateStorageError> {
        let corrupt = |reason: &str| RolegateStorageError::CorruptJournal(reason.to_owned());

        let body_len = bytes
            .len()
            .checked_sub(CHECKSUM_SIZE)
            .ok_or_else(|| corrupt("truncated checksum"))?;
        let (body, checksum) = bytes.split_at(body_len);
        if blake3::hash(body).as_bytes() != checksum {
            return Err(corrupt("checksum mismatch"));
        }

        let mut cursor = JournalCursor { remaining: body };
        if cursor.take(JOURNAL_MAGIC.len())? != JOURNAL_MAGIC {
            return Err(corrupt("unknown journal format"));
        }

        let count = cursor.take_u32()?;
        let mut batch = WriteBatch::default();

        for _ in 0..count {
            let address = Address::try_from(cursor.take(ADDRESS_SIZE)?)
                .map_err(|error| corrupt(&error.to_string()))?;
            match cursor.take(1)?[0] {
                PUT_TAG => {
                    let len = cursor.take_u32()? as usize;
                    batch.put(address, cursor.take(len)?.to_vec());
                }
                CLOSE_TAG => batch.close(address),
                tag => return Err(corrupt(&format!("unknown write tag {tag}"))),
            }
        }

        if !cursor.remaining.is_empty() {
            return Err(corrupt("trailing bytes"));
        }

        Ok(batch)
    }
}

struct JournalCursor<'a> {
    remaining: &'a [u8],
}

impl<'a> JournalCursor<'a> {
    fn take(&mut self, len: usize) -> Result<&'a [u8], RolegateStorageError> {
        if self.remaining.len() < len {
            return Err(RolegateStorageError::CorruptJournal(
                "unexpected end of journal".into(),
            ));
        }
        let (head, tail) = self.remaining.split_at(len);
        self.remaining = tail;
        Ok(head)
    }

    fn take_u32(&mut self) -> Result<u32, RolegateStorageError> {
        let mut word = [0u8; 4];
        word.copy_from_slice(self.take(4)?);
        Ok(u32::from_le_bytes(word))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_keeps_only_the_last_write_per_address() {
        let address = Address::from([3u8; 32]);
        let mut batch = WriteBatch::default();

        batch.put(address, vec![1]);
        batch.close(address);

        assert_eq!(batch.len(), 1);
        assert_eq!(batch.get(&address), Some(&Write::Close));
    }

    #[test]
    fn it_restores_a_journaled_batch() -> anyhow::Result<()> {
        let mut batch = WriteBatch::default();
        batch.put(Address::from([1u8; 32]), vec![9, 9, 9]);
        batch.put(Address::from([2u8; 32]), vec![]);
        batch.close(Address::from([3u8; 32]));

        assert_eq!(WriteBatch::decode(&batch.encode())?, batch);

        Ok(())
    }

    #[test]
    fn it_rejects_a_torn_journal() {
        let mut batch = WriteBatch::default();
        batch.put(Address::from([1u8; 32]), vec![9, 9, 9]);

        let encoded = batch.encode();
        let torn = &encoded[..encoded.len() - 5];

        assert!(matches!(
            WriteBatch::decode(torn),
            Err(RolegateStorageError::CorruptJournal(_))
        ));
    }
}
