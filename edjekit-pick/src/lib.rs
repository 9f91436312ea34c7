//! Picks groups out of layout archives and merges them into a new archive.
//!
//! A [`PickRequest`] names groups (or whole archives) to include. Every named group is resolved
//! together with all groups it depends on and all resources they reference; the result is written
//! as a single self-consistent archive with resource ids renumbered densely.

pub mod error;
pub mod merge;
pub mod request;
pub mod resolver;
pub mod source;
pub mod workset;
pub mod writer;

use std::path::Path;

use tracing::info;

pub use error::{
    pick_err_str, ConflictError, CorruptError, FileError, PickError, Status, UsageError,
    WriteError,
};
pub use request::{Inclusion, PickOptions, PickRequest, MERGE_DEDUPE};
pub use writer::PickReport;

use crate::{
    source::{SourceArchive, SourceSet},
    workset::WorkSet,
};

/// Opens every source archive of the request and resolves its inclusions, in request order.
fn resolve_request(
    request: &PickRequest,
    sources: &mut SourceSet,
    workset: &mut WorkSet,
) -> Result<(), PickError> {
    for inclusion in &request.inclusions {
        let archive = sources.open(inclusion.file())?;
        match inclusion {
            Inclusion::All(_) => resolver::resolve_all(sources, archive, workset)?,
            Inclusion::Group { group, .. } => resolver::resolve(sources, archive, group, workset)?,
        }
    }
    Ok(())
}

/// Performs a pick. Nothing is written unless the whole request resolves cleanly; with
/// [`PickOptions::dry_run`] set, nothing is written at all.
///
/// Every source archive is opened at most once and all of them are closed before this returns,
/// whether or not the pick succeeded.
pub fn pick_run(request: &PickRequest) -> Result<PickReport, PickError> {
    if request.options.dry_run {
        info!(output = ?request.output, "Dry run; not writing the output archive");
        return pick_check(request);
    }

    let mut sources = SourceSet::new();
    let mut workset = WorkSet::new(request.options.dedupe);
    resolve_request(request, &mut sources, &mut workset)?;
    let report = writer::write(&request.output, &workset, &sources, &request.options)?;
    info!(
        output = ?report.output,
        groups = report.groups,
        images = report.images,
        samples = report.samples,
        fonts = report.fonts,
        "Pick complete"
    );
    Ok(report)
}

/// Checks whether a pick would succeed and reports what it would write, without touching the
/// output path.
pub fn pick_check(request: &PickRequest) -> Result<PickReport, PickError> {
    let mut sources = SourceSet::new();
    let mut workset = WorkSet::new(request.options.dedupe);
    resolve_request(request, &mut sources, &mut workset)?;
    let assembled = writer::assemble(&request.output, &workset, &sources, &request.options)?;
    Ok(assembled.report)
}

/// Names of all groups in the archive at `path`, in directory order.
pub fn pick_list_groups(path: impl AsRef<Path>) -> Result<Vec<String>, PickError> {
    let archive = SourceArchive::open(path.as_ref())?;
    Ok(archive.list_groups().map(str::to_owned).collect())
}
