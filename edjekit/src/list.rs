use std::{ffi::OsStr, path::PathBuf};

use clap::Parser;
use edjekit_pick::pick_list_groups;
use tracing::{debug, warn};
use walkdir::WalkDir;

#[derive(Debug, Parser)]
pub struct Args {
    /// Archives, or directories containing archives, whose groups should be listed.
    ///
    /// Directories will be searched recursively for .edj files.
    paths: Vec<PathBuf>,

    /// Only print group names, without the archive they come from.
    #[clap(short, long)]
    quiet: bool,
}

pub fn list(args: Args) -> anyhow::Result<()> {
    let mut archive_paths = vec![];
    for path in args.paths {
        if path.is_dir() {
            for entry in WalkDir::new(&path).sort_by_file_name() {
                let entry = entry?;
                let path = entry.path();
                if path.is_file() && path.extension() == Some(OsStr::new("edj")) {
                    archive_paths.push(path.to_owned());
                }
            }
        } else {
            archive_paths.push(path);
        }
    }
    debug!("{} archives to list", archive_paths.len());

    let mut failures = 0;
    for path in &archive_paths {
        let groups = match pick_list_groups(path) {
            Ok(groups) => groups,
            Err(error) if archive_paths.len() > 1 => {
                warn!(?path, "{error}");
                failures += 1;
                continue;
            }
            Err(error) => return Err(error.into()),
        };

        if args.quiet {
            for group in groups {
                println!("{group}");
            }
        } else {
            println!("{}:", path.display());
            for group in groups {
                println!("  {group}");
            }
        }
    }

    if failures > 0 {
        anyhow::bail!("{failures} of {} archives could not be listed", archive_paths.len());
    }
    Ok(())
}
