use std::{
    collections::HashMap,
    fs,
    io::Write,
    path::{Path, PathBuf},
};

use edjekit_archive::{
    format::{self, DIRECTORY_KEY},
    sections::ArchiveFlags,
    CollectionEntry, Directory, ResourceEntry, ResourceKind, Welder,
};
use edjekit_core::binary;
use tracing::{debug, info, warn};

use crate::{
    error::{ConflictError, CorruptError, PickError, WriteError},
    merge::ResourceKey,
    request::PickOptions,
    source::{ArchiveId, SourceSet},
    workset::WorkSet,
};

/// What a pick produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickReport {
    pub output: PathBuf,
    pub groups: usize,
    pub images: usize,
    pub samples: usize,
    pub fonts: usize,
    /// Size of the output archive in bytes.
    pub size: usize,
    /// Whether the archive was actually written out.
    pub written: bool,
}

impl PickReport {
    pub fn resources(&self, kind: ResourceKind) -> usize {
        match kind {
            ResourceKind::Image => self.images,
            ResourceKind::Sample => self.samples,
            ResourceKind::Font => self.fonts,
        }
    }
}

/// An output archive assembled in memory, ready to be written.
#[derive(Debug)]
pub struct Assembled {
    pub bytes: Vec<u8>,
    pub report: PickReport,
}

/// Builds the output archive from the work set: a fresh directory, every resolved collection with
/// its resource ids rewritten to output ids, and every resource blob of the merge table.
pub fn assemble(
    output: &Path,
    workset: &WorkSet,
    sources: &SourceSet,
    options: &PickOptions,
) -> Result<Assembled, PickError> {
    let merge = workset.merge_table();

    let mut directory = Directory::new();
    let mut owners: HashMap<&str, ArchiveId> = HashMap::new();
    for (id, group) in workset.groups().iter().enumerate() {
        if let Some(&owner) = owners.get(group.name()) {
            return Err(ConflictError::DuplicateGroupName {
                name: group.name().to_owned(),
                first: sources.path(owner).to_owned(),
                second: sources.path(group.archive).to_owned(),
            }
            .into());
        }
        owners.insert(group.name(), group.archive);
        directory.collections.push(CollectionEntry {
            id: output_id(id)?,
            name: group.collection.name.clone(),
        });
    }
    for kind in ResourceKind::ALL {
        directory
            .resources_mut(kind)
            .extend(merge.records(kind).iter().map(|record| ResourceEntry {
                id: record.new_id,
                name: record.name.clone(),
            }));
    }

    let mut welder = Welder::new();
    if merge.dedupe() {
        welder.set_flags(ArchiveFlags::DEDUPLICATED);
    }
    welder
        .write_key(DIRECTORY_KEY, &encode(&directory)?, options.compression)
        .map_err(WriteError::from)?;

    for (id, group) in workset.groups().iter().enumerate() {
        let mut collection = group.collection.clone();
        collection.remap_resources(|kind, local_id| {
            merge
                .lookup(ResourceKey {
                    archive: group.archive,
                    kind,
                    local_id,
                })
                .ok_or_else(|| CorruptError::DanglingResourceRef {
                    path: sources.path(group.archive).to_owned(),
                    group: group.name().to_owned(),
                    kind,
                    id: local_id,
                })
        })?;
        welder
            .write_key(
                &format::collection_key(output_id(id)?),
                &encode(&collection)?,
                options.compression,
            )
            .map_err(WriteError::from)?;
    }

    for kind in ResourceKind::ALL {
        for record in merge.records(kind) {
            welder
                .write_key(&kind.key(record.new_id), &record.bytes, options.compression)
                .map_err(WriteError::from)?;
        }
    }

    let bytes = welder.weld().map_err(WriteError::from)?;
    let report = PickReport {
        output: output.to_owned(),
        groups: directory.collections.len(),
        images: directory.images.len(),
        samples: directory.samples.len(),
        fonts: directory.fonts.len(),
        size: bytes.len(),
        written: false,
    };
    debug!(?report, "Assembled output archive");
    Ok(Assembled { bytes, report })
}

fn output_id(index: usize) -> Result<u32, PickError> {
    u32::try_from(index).map_err(|_| WriteError::from(edjekit_archive::WeldError::ArchiveTooBig).into())
}

fn encode(value: &impl binary::Serialize) -> Result<Vec<u8>, PickError> {
    binary::serialize(value).map_err(|source| WriteError::Encode(source).into())
}

/// Writes `bytes` to `path` atomically: the data goes to a temporary file in the same directory,
/// which then replaces `path`. On failure `path` is left as it was.
pub fn persist(path: &Path, bytes: &[u8]) -> Result<(), WriteError> {
    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut prefix = std::ffi::OsString::from(".");
    if let Some(file_name) = path.file_name() {
        prefix.push(file_name);
    }
    prefix.push(".");

    let mut builder = tempfile::Builder::new();
    builder.prefix(&prefix).suffix(".tmp");
    // Created like any other new file, so the umask applies.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(fs::Permissions::from_mode(0o666));
    }
    let mut temp = builder
        .tempfile_in(directory)
        .map_err(|source| WriteError::from_io(directory, source))?;
    debug!(temp = ?temp.path(), "Writing to temporary file");

    // A replaced file keeps its permissions.
    if let Ok(metadata) = fs::metadata(path) {
        if metadata.is_file() {
            temp.as_file()
                .set_permissions(metadata.permissions())
                .map_err(|source| WriteError::from_io(temp.path(), source))?;
        }
    }

    // Dropping `temp` on the error paths below deletes the temporary file.
    temp.write_all(bytes)
        .and_then(|_| temp.as_file().sync_all())
        .map_err(|source| WriteError::from_io(temp.path(), source))?;

    temp.persist(path).map_err(|error| {
        let source = error.error;
        match error.file.keep() {
            Ok((_, temp_path)) => {
                warn!(?temp_path, ?path, "Cannot replace the output file; keeping the temporary file");
                WriteError::RenameFailed {
                    temp: temp_path,
                    path: path.to_owned(),
                    source,
                }
            }
            Err(_) => WriteError::from_io(path, source),
        }
    })?;

    info!(?path, size = bytes.len(), "Wrote output archive");
    Ok(())
}

/// Assembles the output archive and writes it to `output`.
pub fn write(
    output: &Path,
    workset: &WorkSet,
    sources: &SourceSet,
    options: &PickOptions,
) -> Result<PickReport, PickError> {
    let Assembled { bytes, mut report } = assemble(output, workset, sources, options)?;
    persist(output, &bytes)?;
    report.written = true;
    Ok(report)
}
