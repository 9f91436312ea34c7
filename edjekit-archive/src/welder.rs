use std::{collections::HashMap, io::Cursor};

use edjekit_core::{
    binary::{Serialize, Serializer},
    uuid::Uuid,
};
use tracing::{debug, trace};

use crate::{
    compression::Compression,
    error::WeldError,
    sections::{ArchiveFlags, KeyTableEntry, Summary},
};

/// Archive welder. Collects keyed blobs and assembles them into a complete archive.
///
/// Blobs are laid out in the order they were written, so welding the same sequence of writes
/// always produces the same bytes.
#[derive(Debug, Clone, Default)]
pub struct Welder {
    flags: ArchiveFlags,
    blobs: Vec<StoredBlob>,
    keys: Vec<PendingKey>,
    key_indices: HashMap<String, usize>,
}

#[derive(Debug, Clone)]
struct StoredBlob {
    compression: Compression,
    stored: Vec<u8>,
    size: u32,
}

#[derive(Debug, Clone)]
struct PendingKey {
    key: String,
    blob: usize,
}

impl Welder {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn set_flags(&mut self, flags: ArchiveFlags) {
        self.flags = flags;
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.key_indices.contains_key(key)
    }

    /// Stores `data` under `key`. If compressing doesn't make the blob smaller, it is stored
    /// as-is.
    pub fn write_key(
        &mut self,
        key: &str,
        data: &[u8],
        compression: Compression,
    ) -> Result<(), WeldError> {
        if self.contains_key(key) {
            return Err(WeldError::DuplicateKey(key.to_owned()));
        }
        let size = u32::try_from(data.len()).map_err(|_| WeldError::ArchiveTooBig)?;

        let mut blob = StoredBlob {
            compression,
            stored: compression
                .compress(data)
                .map_err(|reason| WeldError::Compress {
                    key: key.to_owned(),
                    compression,
                    reason,
                })?,
            size,
        };
        if blob.compression != Compression::None && blob.stored.len() >= data.len() {
            trace!(key, "Compression does not pay off; storing raw");
            blob.compression = Compression::None;
            blob.stored = data.to_vec();
        }
        trace!(
            key,
            size,
            stored_size = blob.stored.len(),
            compression = %blob.compression,
            "Writing key"
        );

        self.blobs.push(blob);
        self.push_key(key, self.blobs.len() - 1);
        Ok(())
    }

    fn push_key(&mut self, key: &str, blob: usize) {
        self.key_indices.insert(key.to_owned(), self.keys.len());
        self.keys.push(PendingKey {
            key: key.to_owned(),
            blob,
        });
    }

    pub fn weld(self) -> Result<Vec<u8>, WeldError> {
        debug!(
            keys = self.keys.len(),
            blobs = self.blobs.len(),
            "Welding archive"
        );

        let mut summary = Summary {
            flags: self.flags,
            key_table_len: u32::try_from(self.keys.len()).map_err(|_| WeldError::ArchiveTooBig)?,
            ..Default::default()
        };

        let mut result = Vec::new();
        let mut cursor = Cursor::new(&mut result);

        summary.serialize(&mut Serializer::new(&mut cursor))?;

        // The key table's size doesn't depend on the offsets inside it, so it is first written
        // with placeholder offsets and then overwritten in place once the data is laid out.
        let mut entries = self
            .keys
            .iter()
            .map(|pending| {
                let blob = &self.blobs[pending.blob];
                Ok(KeyTableEntry {
                    key: pending.key.as_str().into(),
                    compression: blob.compression,
                    offset: 0,
                    stored_size: u32::try_from(blob.stored.len())
                        .map_err(|_| WeldError::ArchiveTooBig)?,
                    size: blob.size,
                })
            })
            .collect::<Result<Vec<_>, WeldError>>()?;

        let key_table_offset = cursor.position();
        summary.key_table_offset =
            u32::try_from(key_table_offset).map_err(|_| WeldError::ArchiveTooBig)?;
        for entry in &entries {
            entry.serialize(&mut Serializer::new(&mut cursor))?;
        }

        let data_offset = cursor.position();
        summary.data_offset = u32::try_from(data_offset).map_err(|_| WeldError::ArchiveTooBig)?;
        let mut blob_offsets = Vec::with_capacity(self.blobs.len());
        for blob in &self.blobs {
            blob_offsets
                .push(u32::try_from(cursor.position()).map_err(|_| WeldError::ArchiveTooBig)?);
            Serializer::new(&mut cursor).write_bytes(&blob.stored)?;
        }
        summary.data_size = u32::try_from(cursor.position() - data_offset)
            .map_err(|_| WeldError::ArchiveTooBig)?;
        // The end of the data section must itself be addressable.
        u32::try_from(cursor.position()).map_err(|_| WeldError::ArchiveTooBig)?;

        for (entry, pending) in entries.iter_mut().zip(&self.keys) {
            entry.offset = blob_offsets[pending.blob];
        }
        cursor.set_position(key_table_offset);
        for entry in &entries {
            entry.serialize(&mut Serializer::new(&mut cursor))?;
        }

        summary.content_id = Uuid::from_bytes(md5::compute(&result[key_table_offset as usize..]).0);

        // Go back to the beginning to serialize the summary again, which now contains
        // up to date offsets.
        let mut cursor = Cursor::new(&mut result);
        summary.serialize(&mut Serializer::new(&mut cursor))?;

        debug!(size = result.len(), content_id = %summary.content_id, "Archive welded");
        Ok(result)
    }
}
