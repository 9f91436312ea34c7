use std::{collections::HashMap, fmt};

use edjekit_archive::{format::FIRST_RESOURCE_ID, ResourceKind};
use edjekit_core::string::ArchiveString;
use tracing::{debug, trace};

use crate::source::ArchiveId;

/// Resource id in the output archive.
pub type NewId = u32;

/// A resource as seen from its source archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ResourceKey {
    pub archive: ArchiveId,
    pub kind: ResourceKind,
    pub local_id: u32,
}

/// MD5 digest of a resource's raw bytes.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint(pub [u8; 16]);

impl Fingerprint {
    pub fn of(bytes: &[u8]) -> Self {
        Self(md5::compute(bytes).0)
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

/// A resource blob that will be written to the output archive.
#[derive(Debug, Clone)]
pub struct ResourceRecord {
    pub kind: ResourceKind,
    pub new_id: NewId,
    /// The first source resource that was assigned this id.
    pub source: ArchiveId,
    pub local_id: u32,
    pub name: ArchiveString,
    pub fingerprint: Fingerprint,
    pub bytes: Vec<u8>,
}

/// Maps source resource ids onto dense output ids, numbered separately for each kind starting at
/// [`FIRST_RESOURCE_ID`].
#[derive(Debug, Default)]
pub struct MergeTable {
    dedupe: bool,
    ids: HashMap<ResourceKey, NewId>,
    fingerprints: HashMap<(ResourceKind, Fingerprint), NewId>,
    images: Vec<ResourceRecord>,
    samples: Vec<ResourceRecord>,
    fonts: Vec<ResourceRecord>,
}

impl MergeTable {
    pub fn new(dedupe: bool) -> Self {
        Self {
            dedupe,
            ..Default::default()
        }
    }

    pub fn dedupe(&self) -> bool {
        self.dedupe
    }

    pub fn lookup(&self, key: ResourceKey) -> Option<NewId> {
        self.ids.get(&key).copied()
    }

    /// Returns the output id of `key`, assigning the next free one if the resource hasn't been
    /// seen yet. `fetch` provides the resource's name and bytes and is called at most once per
    /// key.
    pub fn assign<E>(
        &mut self,
        key: ResourceKey,
        fetch: impl FnOnce() -> Result<(ArchiveString, Vec<u8>), E>,
    ) -> Result<NewId, E> {
        if let Some(new_id) = self.lookup(key) {
            return Ok(new_id);
        }

        let (name, bytes) = fetch()?;
        let fingerprint = Fingerprint::of(&bytes);
        let (new_id, is_new_blob) = self.fingerprint_dedupe(key.kind, fingerprint);
        if is_new_blob {
            trace!(?key, new_id, ?fingerprint, size = bytes.len(), "Assigned resource id");
            self.records_mut(key.kind).push(ResourceRecord {
                kind: key.kind,
                new_id,
                source: key.archive,
                local_id: key.local_id,
                name,
                fingerprint,
                bytes,
            });
        } else {
            debug!(?key, new_id, ?fingerprint, "Resource content already present; sharing its id");
        }
        self.ids.insert(key, new_id);
        Ok(new_id)
    }

    /// Picks the output id for a blob with the given fingerprint. With deduplication on, a blob
    /// matching an earlier one of the same kind gets that blob's id and `false`; otherwise the
    /// next free id and `true`.
    fn fingerprint_dedupe(&mut self, kind: ResourceKind, fingerprint: Fingerprint) -> (NewId, bool) {
        if self.dedupe {
            if let Some(&new_id) = self.fingerprints.get(&(kind, fingerprint)) {
                return (new_id, false);
            }
        }
        let new_id = FIRST_RESOURCE_ID + self.records(kind).len() as NewId;
        if self.dedupe {
            self.fingerprints.insert((kind, fingerprint), new_id);
        }
        (new_id, true)
    }

    /// Blobs of the given kind, ordered by output id.
    pub fn records(&self, kind: ResourceKind) -> &[ResourceRecord] {
        match kind {
            ResourceKind::Image => &self.images,
            ResourceKind::Sample => &self.samples,
            ResourceKind::Font => &self.fonts,
        }
    }

    fn records_mut(&mut self, kind: ResourceKind) -> &mut Vec<ResourceRecord> {
        match kind {
            ResourceKind::Image => &mut self.images,
            ResourceKind::Sample => &mut self.samples,
            ResourceKind::Font => &mut self.fonts,
        }
    }

    /// Number of source resources mapped so far, including ones sharing an id.
    pub fn mapped(&self) -> usize {
        self.ids.len()
    }
}

#[cfg(test)]
mod tests {
    use std::convert::Infallible;

    use pretty_assertions::assert_eq;

    use super::*;

    fn key(archive: ArchiveId, kind: ResourceKind, local_id: u32) -> ResourceKey {
        ResourceKey {
            archive,
            kind,
            local_id,
        }
    }

    fn blob(bytes: &'static [u8]) -> impl FnOnce() -> Result<(ArchiveString, Vec<u8>), Infallible> {
        move || Ok((ArchiveString::from("blob"), bytes.to_vec()))
    }

    fn archive_ids() -> (ArchiveId, ArchiveId) {
        (ArchiveId(0), ArchiveId(1))
    }

    #[test]
    fn ids_are_dense_per_kind() {
        let (a, _) = archive_ids();
        let mut table = MergeTable::new(false);
        assert_eq!(table.assign(key(a, ResourceKind::Image, 7), blob(b"x")).unwrap(), 0);
        assert_eq!(table.assign(key(a, ResourceKind::Image, 3), blob(b"y")).unwrap(), 1);
        assert_eq!(table.assign(key(a, ResourceKind::Font, 3), blob(b"z")).unwrap(), 0);
        assert_eq!(table.records(ResourceKind::Image).len(), 2);
        assert_eq!(table.records(ResourceKind::Sample).len(), 0);
        assert_eq!(table.records(ResourceKind::Font).len(), 1);
    }

    #[test]
    fn assignment_is_idempotent() {
        let (a, _) = archive_ids();
        let mut table = MergeTable::new(false);
        let first = table.assign(key(a, ResourceKind::Image, 3), blob(b"x")).unwrap();
        let again = table
            .assign(key(a, ResourceKind::Image, 3), || -> Result<_, Infallible> {
                panic!("bytes must only be fetched once")
            })
            .unwrap();
        assert_eq!(first, again);
        assert_eq!(table.records(ResourceKind::Image).len(), 1);
    }

    #[test]
    fn same_local_id_in_different_archives_is_distinct() {
        let (a, b) = archive_ids();
        let mut table = MergeTable::new(false);
        assert_eq!(table.assign(key(a, ResourceKind::Image, 0), blob(b"x")).unwrap(), 0);
        assert_eq!(table.assign(key(b, ResourceKind::Image, 0), blob(b"x")).unwrap(), 1);
        assert_eq!(table.records(ResourceKind::Image).len(), 2);
    }

    #[test]
    fn identical_content_is_shared_when_deduplicating() {
        let (a, b) = archive_ids();
        let mut table = MergeTable::new(true);
        assert_eq!(table.assign(key(a, ResourceKind::Image, 0), blob(b"x")).unwrap(), 0);
        assert_eq!(table.assign(key(b, ResourceKind::Image, 5), blob(b"x")).unwrap(), 0);
        assert_eq!(table.assign(key(b, ResourceKind::Image, 6), blob(b"y")).unwrap(), 1);
        // Kinds never share blobs.
        assert_eq!(table.assign(key(b, ResourceKind::Font, 0), blob(b"x")).unwrap(), 0);

        assert_eq!(table.records(ResourceKind::Image).len(), 2);
        assert_eq!(table.mapped(), 4);
        assert_eq!(table.lookup(key(b, ResourceKind::Image, 5)), Some(0));
    }

    #[test]
    fn fetch_errors_leave_the_table_untouched() {
        let (a, _) = archive_ids();
        let mut table = MergeTable::new(false);
        let result = table.assign(key(a, ResourceKind::Sample, 1), || Err("unreadable"));
        assert_eq!(result, Err("unreadable"));
        assert_eq!(table.lookup(key(a, ResourceKind::Sample, 1)), None);
        assert_eq!(table.records(ResourceKind::Sample).len(), 0);
    }

    #[test]
    fn fingerprints_print_as_hex() {
        assert_eq!(
            format!("{:?}", Fingerprint::of(b"")),
            "d41d8cd98f00b204e9800998ecf8427e"
        );
    }
}
