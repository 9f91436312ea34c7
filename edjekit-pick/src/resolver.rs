use std::collections::VecDeque;

use edjekit_archive::ResourceKind;
use tracing::{debug, trace};

use crate::{
    error::{CorruptError, PickError},
    merge::ResourceKey,
    source::{ArchiveId, SourceSet},
    workset::{ResolvedGroup, WorkSet},
};

/// Adds group `name` of `archive` to the work set, along with every group it transitively
/// depends on and every resource those groups reference.
pub fn resolve(
    sources: &mut SourceSet,
    archive: ArchiveId,
    name: &str,
    workset: &mut WorkSet,
) -> Result<(), PickError> {
    let source = sources.get(archive);
    if !source.has_group(name) {
        return Err(PickError::MissingGroup {
            path: source.path().to_owned(),
            group: name.to_owned(),
        });
    }
    resolve_queue(sources, archive, VecDeque::from([name.to_owned()]), workset)
}

/// Adds every group of `archive` to the work set, in directory order.
pub fn resolve_all(
    sources: &mut SourceSet,
    archive: ArchiveId,
    workset: &mut WorkSet,
) -> Result<(), PickError> {
    let names = sources
        .get(archive)
        .list_groups()
        .map(str::to_owned)
        .collect();
    resolve_queue(sources, archive, names, workset)
}

/// Breadth-first walk over group dependencies. A group is claimed before its dependencies are
/// queued, so cycles terminate and every group is visited once.
fn resolve_queue(
    sources: &mut SourceSet,
    archive: ArchiveId,
    mut queue: VecDeque<String>,
    workset: &mut WorkSet,
) -> Result<(), PickError> {
    while let Some(name) = queue.pop_front() {
        if workset.is_resolved(archive, &name) {
            trace!(group = %name, "Group already resolved");
            continue;
        }
        workset.claim(archive, &name, sources)?;

        let source = sources.get_mut(archive);
        let collection = source.describe(&name)?;
        debug!(
            group = %name,
            images = collection.images.len(),
            samples = collection.samples.len(),
            fonts = collection.fonts.len(),
            groups = collection.groups.len(),
            parts = collection.parts.len(),
            "Resolving group"
        );

        for kind in ResourceKind::ALL {
            for reference in collection.resource_refs(kind) {
                let key = ResourceKey {
                    archive,
                    kind,
                    local_id: reference.id,
                };
                workset.merge_table_mut().assign(key, || {
                    let entry = source.resource(kind, reference.id).ok_or_else(|| {
                        CorruptError::DanglingResourceRef {
                            path: source.path().to_owned(),
                            group: name.clone(),
                            kind,
                            id: reference.id,
                        }
                    })?;
                    let resource_name = entry.name.clone();
                    let bytes = source.fetch_blob(kind, reference.id)?;
                    Ok::<_, CorruptError>((resource_name, bytes))
                })?;
            }
        }

        for dependency in collection.dependencies() {
            if !source.has_group(dependency) {
                return Err(CorruptError::DanglingGroupRef {
                    path: source.path().to_owned(),
                    group: name,
                    target: dependency.to_owned(),
                }
                .into());
            }
            if !workset.is_resolved(archive, dependency) {
                trace!(group = %name, dependency, "Queueing dependency");
                queue.push_back(dependency.to_owned());
            }
        }

        workset.push(ResolvedGroup {
            archive,
            collection,
        });
    }
    Ok(())
}
