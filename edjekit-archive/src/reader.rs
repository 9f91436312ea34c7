use std::{
    collections::HashMap,
    fs::File,
    io::{BufReader, Read, Seek, SeekFrom},
    path::{Path, PathBuf},
};

use edjekit_core::binary::{self, Deserializer, ResultContextExt};
use tracing::{debug, trace};

use crate::{
    error::ArchiveError,
    sections::{KeyTableEntry, Summary},
};

/// Read-only handle to a keyed-blob archive.
///
/// Opening reads the summary and key table; blobs are only read when asked for. The underlying
/// file is never written to and is closed when the handle is dropped.
pub struct KeyedArchive<R = BufReader<File>> {
    path: PathBuf,
    summary: Summary,
    entries: Vec<KeyTableEntry>,
    index: HashMap<String, usize>,
    deserializer: Deserializer<R>,
}

impl KeyedArchive {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ArchiveError> {
        let path = path.as_ref();
        debug!(?path, "Opening archive");
        let file = File::open(path).map_err(|source| ArchiveError::Open {
            path: path.to_owned(),
            source,
        })?;
        Self::from_reader(path, BufReader::new(file))
    }
}

impl<R> KeyedArchive<R>
where
    R: Read + Seek,
{
    /// Reads an archive from an arbitrary stream. `path` is only used in diagnostics.
    pub fn from_reader(path: impl Into<PathBuf>, reader: R) -> Result<Self, ArchiveError> {
        let path = path.into();
        let mut deserializer = Deserializer::new(reader).map_err(|source| ArchiveError::Open {
            path: path.clone(),
            source: std::io::Error::other(source),
        })?;

        let summary = deserializer
            .deserialize::<Summary>()
            .context("cannot deserialize archive summary")
            .map_err(|source| ArchiveError::BadHeader {
                path: path.clone(),
                source,
            })?;
        trace!("Read summary: {summary:#?}");

        let entries = read_key_table(&summary, &mut deserializer).map_err(|source| {
            ArchiveError::BadKeyTable {
                path: path.clone(),
                source,
            }
        })?;
        let index = entries
            .iter()
            .enumerate()
            .map(|(i, entry)| (entry.key.as_str().to_owned(), i))
            .collect();
        debug!(?path, keys = entries.len(), "Archive opened");

        Ok(Self {
            path,
            summary,
            entries,
            index,
            deserializer,
        })
    }

    /// Reads and decompresses the blob stored under `key`.
    pub fn read_key(&mut self, key: &str) -> Result<Vec<u8>, ArchiveError> {
        let entry = self
            .index
            .get(key)
            .map(|&i| &self.entries[i])
            .ok_or_else(|| ArchiveError::KeyNotFound {
                path: self.path.clone(),
                key: key.to_owned(),
            })?;
        trace!(key, offset = entry.offset, stored_size = entry.stored_size, "Reading key");

        let stored = self
            .deserializer
            .seek(SeekFrom::Start(u64::from(entry.offset)))
            .and_then(|_| self.deserializer.read_byte_vec(u64::from(entry.stored_size)))
            .with_context(|| format!("cannot read {} stored bytes", entry.stored_size))
            .map_err(|source| ArchiveError::Read {
                path: self.path.clone(),
                key: key.to_owned(),
                source,
            })?;

        entry
            .compression
            .decompress(&stored, entry.size as usize)
            .map_err(|reason| ArchiveError::Decompress {
                key: key.to_owned(),
                compression: entry.compression,
                reason,
            })
    }

    /// Reads the blob stored under `key` and decodes it as a `T` spanning the whole blob.
    pub fn read_record<T>(&mut self, key: &str) -> Result<T, ArchiveError>
    where
        T: binary::Deserialize,
    {
        let bytes = self.read_key(key)?;
        binary::deserialize(&bytes).map_err(|source| ArchiveError::Decode {
            path: self.path.clone(),
            key: key.to_owned(),
            source,
        })
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Keys in the order they are stored in the key table.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.key.as_str())
    }

    pub fn entries(&self) -> &[KeyTableEntry] {
        &self.entries
    }

    pub fn summary(&self) -> &Summary {
        &self.summary
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Closes the archive. Dropping the handle does the same; this only makes the intent explicit
    /// at call sites.
    pub fn close(self) {
        debug!(path = ?self.path, "Closing archive");
    }
}

fn read_key_table(
    summary: &Summary,
    deserializer: &mut Deserializer<impl Read + Seek>,
) -> Result<Vec<KeyTableEntry>, binary::Error> {
    debug!(
        "Deserializing key table ({} keys at {:08x})",
        summary.key_table_len, summary.key_table_offset
    );
    let data_start = u64::from(summary.data_offset);
    let data_end = data_start + u64::from(summary.data_size);
    if data_end > deserializer.stream_len() {
        return Err(binary::ErrorKind::Deserialize.make(format!(
            "data section ends at {data_end:08x}, past the end of the file ({:08x})",
            deserializer.stream_len()
        )));
    }

    deserializer.seek(SeekFrom::Start(u64::from(summary.key_table_offset)))?;
    let mut entries = Vec::with_capacity((summary.key_table_len as usize).min(4096));
    for i in 0..summary.key_table_len {
        let entry: KeyTableEntry = deserializer
            .deserialize()
            .with_context(|| format!("cannot deserialize key table entry {i}"))?;
        let start = u64::from(entry.offset);
        let end = start + u64::from(entry.stored_size);
        if start < data_start || end > data_end {
            return Err(binary::ErrorKind::Deserialize.make(format!(
                "key {:?} points outside of the data section ({start:08x}..{end:08x})",
                entry.key
            )));
        }
        entries.push(entry);
    }
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::{compression::Compression, error::ArchiveError, welder::Welder};

    use super::KeyedArchive;

    #[test]
    fn archives_open_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.edj");
        let mut welder = Welder::new();
        welder.write_key("edje/file", b"directory", Compression::Zlib).unwrap();
        std::fs::write(&path, welder.weld().unwrap()).unwrap();

        let mut archive = KeyedArchive::open(&path).unwrap();
        assert_eq!(archive.path(), path);
        assert!(archive.contains_key("edje/file"));
        assert_eq!(archive.read_key("edje/file").unwrap(), b"directory");
        assert!(matches!(
            archive.read_key("edje/images/0"),
            Err(ArchiveError::KeyNotFound { key, .. }) if key == "edje/images/0"
        ));
        archive.close();
    }

    #[test]
    fn missing_files_cannot_be_opened() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            KeyedArchive::open(dir.path().join("missing.edj")),
            Err(ArchiveError::Open { .. })
        ));
    }

    #[test]
    fn truncated_archives_are_rejected() {
        let mut welder = Welder::new();
        welder.write_key("key", b"some bytes", Compression::None).unwrap();
        let mut bytes = welder.weld().unwrap();
        bytes.truncate(bytes.len() - 4);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("truncated.edj");
        std::fs::write(&path, bytes).unwrap();
        assert!(matches!(
            KeyedArchive::open(&path),
            Err(ArchiveError::BadKeyTable { .. })
        ));
    }
}
