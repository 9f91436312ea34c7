use edjekit_core::{primitive::ConstU16, string::ArchiveString, Deserialize, Serialize};

use crate::{format, key::ResourceKind};

/// Table of contents of a layout archive, stored under [`format::DIRECTORY_KEY`].
///
/// Lists every collection by name and every resource blob by id, without the collection bodies
/// themselves; those live under their own keys and are only decoded when asked for.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Directory {
    pub version: ConstU16<{ format::DIRECTORY_FORMAT_VERSION }>,
    pub collections: Vec<CollectionEntry>,
    pub images: Vec<ResourceEntry>,
    pub samples: Vec<ResourceEntry>,
    pub fonts: Vec<ResourceEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CollectionEntry {
    pub id: u32,
    pub name: ArchiveString,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ResourceEntry {
    pub id: u32,
    /// Name the resource was compiled from, e.g. the original image file name.
    pub name: ArchiveString,
}

impl Directory {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn collection(&self, name: &str) -> Option<&CollectionEntry> {
        self.collections.iter().find(|entry| entry.name == name)
    }

    pub fn resources(&self, kind: ResourceKind) -> &[ResourceEntry] {
        match kind {
            ResourceKind::Image => &self.images,
            ResourceKind::Sample => &self.samples,
            ResourceKind::Font => &self.fonts,
        }
    }

    pub fn resources_mut(&mut self, kind: ResourceKind) -> &mut Vec<ResourceEntry> {
        match kind {
            ResourceKind::Image => &mut self.images,
            ResourceKind::Sample => &mut self.samples,
            ResourceKind::Font => &mut self.fonts,
        }
    }

    pub fn resource(&self, kind: ResourceKind, id: u32) -> Option<&ResourceEntry> {
        self.resources(kind).iter().find(|entry| entry.id == id)
    }
}
