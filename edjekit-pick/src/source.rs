use std::{
    collections::HashMap,
    fmt, fs,
    path::{Path, PathBuf},
};

use edjekit_archive::{
    format::{self, DIRECTORY_KEY},
    Collection, Directory, KeyedArchive, ResourceEntry, ResourceKind,
};
use tracing::{debug, info};

use crate::error::{CorruptError, FileError, PickError};

/// Identifies an archive opened by a [`SourceSet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ArchiveId(pub(crate) usize);

impl fmt::Display for ArchiveId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// An open source archive along with its directory.
pub struct SourceArchive {
    archive: KeyedArchive,
    directory: Directory,
}

impl SourceArchive {
    /// Opens the archive at `path` and reads its directory. An archive without a single group is
    /// rejected, since there would be nothing to pick from it.
    pub fn open(path: &Path) -> Result<Self, PickError> {
        let mut archive = KeyedArchive::open(path).map_err(|source| FileError::OpenFailed {
            path: path.to_owned(),
            source,
        })?;
        let directory = archive
            .read_record::<Directory>(DIRECTORY_KEY)
            .map_err(|source| CorruptError::UnreadableDirectory {
                path: path.to_owned(),
                source,
            })?;
        if directory.collections.is_empty() {
            return Err(CorruptError::EmptyCollectionTable {
                path: path.to_owned(),
            }
            .into());
        }
        debug!(
            ?path,
            groups = directory.collections.len(),
            images = directory.images.len(),
            samples = directory.samples.len(),
            fonts = directory.fonts.len(),
            "Opened source archive"
        );
        Ok(Self { archive, directory })
    }

    pub fn path(&self) -> &Path {
        self.archive.path()
    }

    pub fn directory(&self) -> &Directory {
        &self.directory
    }

    /// Names of all groups, in directory order.
    pub fn list_groups(&self) -> impl Iterator<Item = &str> {
        self.directory
            .collections
            .iter()
            .map(|entry| entry.name.as_str())
    }

    pub fn has_group(&self, name: &str) -> bool {
        self.directory.collection(name).is_some()
    }

    pub fn resource(&self, kind: ResourceKind, id: u32) -> Option<&ResourceEntry> {
        self.directory.resource(kind, id)
    }

    /// Decodes the collection record of group `name`.
    pub fn describe(&mut self, name: &str) -> Result<Collection, PickError> {
        let entry = self
            .directory
            .collection(name)
            .ok_or_else(|| PickError::MissingGroup {
                path: self.path().to_owned(),
                group: name.to_owned(),
            })?;
        let key = format::collection_key(entry.id);
        let collection = self
            .archive
            .read_record::<Collection>(&key)
            .map_err(|source| CorruptError::UnreadableCollection {
                path: self.path().to_owned(),
                group: name.to_owned(),
                source,
            })?;
        if collection.name != name {
            return Err(CorruptError::NameMismatch {
                path: self.path().to_owned(),
                expected: name.to_owned(),
                found: collection.name.into_string(),
            }
            .into());
        }
        Ok(collection)
    }

    /// Reads the raw bytes of resource `id`.
    pub fn fetch_blob(&mut self, kind: ResourceKind, id: u32) -> Result<Vec<u8>, CorruptError> {
        self.archive
            .read_key(&kind.key(id))
            .map_err(|source| CorruptError::MissingBlob {
                path: self.path().to_owned(),
                kind,
                id,
                source,
            })
    }
}

/// Source archives opened during a pick. Every file is opened at most once, no matter how many
/// inclusions name it; all of them are closed when the set is dropped.
#[derive(Default)]
pub struct SourceSet {
    archives: Vec<SourceArchive>,
    by_path: HashMap<PathBuf, ArchiveId>,
}

impl SourceSet {
    pub fn new() -> Self {
        Default::default()
    }

    /// Returns the id of the archive at `path`, opening it if it isn't open yet.
    pub fn open(&mut self, path: &Path) -> Result<ArchiveId, PickError> {
        // Different spellings of the same file must share one handle.
        let canonical = fs::canonicalize(path).unwrap_or_else(|_| path.to_owned());
        if let Some(&id) = self.by_path.get(&canonical) {
            return Ok(id);
        }

        let archive = SourceArchive::open(path)?;
        let id = ArchiveId(self.archives.len());
        info!(?path, %id, "Using source archive");
        self.archives.push(archive);
        self.by_path.insert(canonical, id);
        Ok(id)
    }

    pub fn get(&self, id: ArchiveId) -> &SourceArchive {
        &self.archives[id.0]
    }

    pub fn get_mut(&mut self, id: ArchiveId) -> &mut SourceArchive {
        &mut self.archives[id.0]
    }

    pub fn path(&self, id: ArchiveId) -> &Path {
        self.get(id).path()
    }

    pub fn len(&self) -> usize {
        self.archives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.archives.is_empty()
    }
}

impl Drop for SourceSet {
    fn drop(&mut self) {
        for archive in self.archives.drain(..) {
            archive.archive.close();
        }
    }
}
