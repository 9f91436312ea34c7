#![allow(dead_code)]

use std::path::{Path, PathBuf};

use edjekit_archive::{
    format::{self, DIRECTORY_KEY},
    Collection, CollectionEntry, Compression, Directory, KeyedArchive, ResourceEntry,
    ResourceKind, Welder,
};
use edjekit_core::binary;
use tempfile::TempDir;

/// Builds layout archives for tests.
#[derive(Default)]
pub struct ArchiveBuilder {
    directory: Directory,
    collections: Vec<Collection>,
    blobs: Vec<(ResourceKind, u32, Vec<u8>)>,
}

impl ArchiveBuilder {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn group(mut self, collection: Collection) -> Self {
        self.directory.collections.push(CollectionEntry {
            id: self.collections.len() as u32,
            name: collection.name.clone(),
        });
        self.collections.push(collection);
        self
    }

    pub fn resource(mut self, kind: ResourceKind, id: u32, name: &str, bytes: &[u8]) -> Self {
        self.directory.resources_mut(kind).push(ResourceEntry {
            id,
            name: name.into(),
        });
        self.blobs.push((kind, id, bytes.to_vec()));
        self
    }

    pub fn image(self, id: u32, name: &str, bytes: &[u8]) -> Self {
        self.resource(ResourceKind::Image, id, name, bytes)
    }

    pub fn sample(self, id: u32, name: &str, bytes: &[u8]) -> Self {
        self.resource(ResourceKind::Sample, id, name, bytes)
    }

    pub fn font(self, id: u32, name: &str, bytes: &[u8]) -> Self {
        self.resource(ResourceKind::Font, id, name, bytes)
    }

    /// Lists a resource in the directory without storing its blob.
    pub fn listed_only(mut self, kind: ResourceKind, id: u32, name: &str) -> Self {
        self.directory.resources_mut(kind).push(ResourceEntry {
            id,
            name: name.into(),
        });
        self
    }

    pub fn build(self) -> Vec<u8> {
        let mut welder = Welder::new();
        welder
            .write_key(
                DIRECTORY_KEY,
                &binary::serialize(&self.directory).unwrap(),
                Compression::Zlib,
            )
            .unwrap();
        for (id, collection) in self.collections.iter().enumerate() {
            welder
                .write_key(
                    &format::collection_key(id as u32),
                    &binary::serialize(collection).unwrap(),
                    Compression::Zlib,
                )
                .unwrap();
        }
        for (kind, id, bytes) in &self.blobs {
            welder
                .write_key(&kind.key(*id), bytes, Compression::None)
                .unwrap();
        }
        welder.weld().unwrap()
    }

    pub fn write(self, path: &Path) {
        std::fs::write(path, self.build()).unwrap();
    }
}

/// A temporary directory holding the archives of one test.
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    pub fn add(&self, name: &str, archive: ArchiveBuilder) -> PathBuf {
        let path = self.path(name);
        archive.write(&path);
        path
    }

    /// Names of all files in the directory, sorted.
    pub fn files(&self) -> Vec<String> {
        let mut files: Vec<_> = std::fs::read_dir(self.dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        files.sort();
        files
    }
}

/// An archive read back for inspection.
pub struct Output {
    pub archive: KeyedArchive,
    pub directory: Directory,
}

impl Output {
    pub fn open(path: &Path) -> Self {
        let mut archive = KeyedArchive::open(path).unwrap();
        let directory = archive.read_record(DIRECTORY_KEY).unwrap();
        Self { archive, directory }
    }

    pub fn group_names(&self) -> Vec<&str> {
        self.directory
            .collections
            .iter()
            .map(|entry| entry.name.as_str())
            .collect()
    }

    pub fn collection(&mut self, name: &str) -> Collection {
        let entry = self
            .directory
            .collection(name)
            .unwrap_or_else(|| panic!("group {name} is not in the output"));
        let key = format::collection_key(entry.id);
        self.archive.read_record(&key).unwrap()
    }

    pub fn resource_ids(&self, kind: ResourceKind) -> Vec<u32> {
        self.directory
            .resources(kind)
            .iter()
            .map(|entry| entry.id)
            .collect()
    }

    pub fn resource_names(&self, kind: ResourceKind) -> Vec<&str> {
        self.directory
            .resources(kind)
            .iter()
            .map(|entry| entry.name.as_str())
            .collect()
    }

    pub fn blob(&mut self, kind: ResourceKind, id: u32) -> Vec<u8> {
        self.archive.read_key(&kind.key(id)).unwrap()
    }

    /// Asserts that every group and resource referenced from any collection exists.
    pub fn assert_closed(&mut self) {
        let names: Vec<String> = self
            .group_names()
            .into_iter()
            .map(str::to_owned)
            .collect();
        for name in &names {
            let collection = self.collection(name);
            for dependency in collection.dependencies() {
                assert!(
                    names.iter().any(|n| n == dependency),
                    "{name} depends on {dependency}, which is missing"
                );
            }
            for kind in ResourceKind::ALL {
                let mut ids: Vec<u32> = collection
                    .resource_refs(kind)
                    .iter()
                    .map(|reference| reference.id)
                    .collect();
                for part in &collection.parts {
                    match kind {
                        ResourceKind::Image => {
                            ids.extend(part.image);
                            ids.extend(&part.tweens);
                        }
                        ResourceKind::Sample => ids.extend(part.sample),
                        ResourceKind::Font => ids.extend(part.font),
                    }
                }
                for id in ids {
                    assert!(
                        self.directory.resource(kind, id).is_some(),
                        "{name} references {kind} {id}, which is missing"
                    );
                    assert!(self.archive.contains_key(&kind.key(id)));
                }
            }
        }
    }
}
