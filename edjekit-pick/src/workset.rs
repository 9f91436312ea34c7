use std::collections::HashMap;

use edjekit_archive::Collection;
use tracing::debug;

use crate::{
    error::{ConflictError, PickError},
    merge::MergeTable,
    source::{ArchiveId, SourceSet},
};

/// A group selected for the output, together with its decoded collection.
#[derive(Debug, Clone)]
pub struct ResolvedGroup {
    pub archive: ArchiveId,
    pub collection: Collection,
}

impl ResolvedGroup {
    pub fn name(&self) -> &str {
        self.collection.name.as_str()
    }
}

/// Everything that will end up in the output archive: the resolved groups, in resolution order,
/// and the merge table of the resources they use.
#[derive(Debug, Default)]
pub struct WorkSet {
    groups: Vec<ResolvedGroup>,
    /// Which archive each output group name was claimed by. Since names are unique in the
    /// output, this is also the set of resolved groups.
    owners: HashMap<String, ArchiveId>,
    merge: MergeTable,
}

impl WorkSet {
    pub fn new(dedupe: bool) -> Self {
        Self {
            merge: MergeTable::new(dedupe),
            ..Default::default()
        }
    }

    pub fn is_resolved(&self, archive: ArchiveId, name: &str) -> bool {
        self.owners.get(name) == Some(&archive)
    }

    /// Marks group `name` of `archive` as part of the output. Fails if another archive already
    /// provided a group with the same name, since names must be unique in the output.
    pub fn claim(
        &mut self,
        archive: ArchiveId,
        name: &str,
        sources: &SourceSet,
    ) -> Result<(), PickError> {
        if let Some(&owner) = self.owners.get(name) {
            if owner != archive {
                return Err(ConflictError::DuplicateGroupName {
                    name: name.to_owned(),
                    first: sources.path(owner).to_owned(),
                    second: sources.path(archive).to_owned(),
                }
                .into());
            }
        }
        debug!(%archive, group = name, "Claiming group");
        self.owners.insert(name.to_owned(), archive);
        Ok(())
    }

    /// Adds a claimed group's collection to the output.
    pub fn push(&mut self, group: ResolvedGroup) {
        self.groups.push(group);
    }

    pub fn groups(&self) -> &[ResolvedGroup] {
        &self.groups
    }

    pub fn merge_table(&self) -> &MergeTable {
        &self.merge
    }

    pub fn merge_table_mut(&mut self) -> &mut MergeTable {
        &mut self.merge
    }
}
