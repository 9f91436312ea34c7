use std::path::Path;

use anyhow::Context;
use clap::Subcommand;
use edjekit_archive::{
    format::{self, DIRECTORY_KEY},
    Collection, Directory, KeyedArchive, ResourceKind,
};
use tracing::{debug, info};

#[derive(Clone, Subcommand)]
pub enum Dump {
    /// Dump summarising information about the archive (aka the archive header).
    Summary,

    /// Dump the key table.
    Keys,
    /// Dump the table of groups and resources.
    Directory,
    /// Dump a single group.
    Collection {
        /// Name of the group.
        name: String,
    },

    /// Read and decompress every key, then exit. Used for diagnosing problems with decompression.
    TestDecompression,
}

pub fn dump(filename: &Path, dump: Dump) -> anyhow::Result<()> {
    info!(?filename, "Opening archive");
    let mut archive = KeyedArchive::open(filename)?;

    match dump {
        Dump::Summary => {
            debug!("Printing summary");
            println!("{:#?}", archive.summary());
        }
        Dump::Keys => {
            debug!("Printing key table");
            for (i, entry) in archive.entries().iter().enumerate() {
                println!(
                    "{i:6} {:?} at 0x{:08x}, {} bytes stored as {} ({} bytes)",
                    entry.key.as_str(),
                    entry.offset,
                    entry.size,
                    entry.compression,
                    entry.stored_size,
                );
            }
        }
        Dump::Directory => {
            let directory = read_directory(&mut archive)?;

            debug!("Printing directory");
            println!("groups:");
            for entry in &directory.collections {
                println!("{:6} {:?}", entry.id, entry.name.as_str());
            }
            for kind in ResourceKind::ALL {
                println!("{}:", kind.plural());
                for entry in directory.resources(kind) {
                    println!("{:6} {:?}", entry.id, entry.name.as_str());
                }
            }
        }
        Dump::Collection { name } => {
            let directory = read_directory(&mut archive)?;
            let entry = directory
                .collection(&name)
                .with_context(|| format!("group {name:?} does not exist"))?;

            debug!(id = entry.id, "Reading collection");
            let collection = archive
                .read_record::<Collection>(&format::collection_key(entry.id))
                .with_context(|| format!("cannot read group {name:?}"))?;
            println!("{collection:#?}");
        }
        Dump::TestDecompression => {
            let keys: Vec<String> = archive.keys().map(str::to_owned).collect();
            for key in &keys {
                archive.read_key(key)?;
            }
            info!("{} keys decompressed successfully", keys.len());
        }
    }

    archive.close();
    Ok(())
}

fn read_directory(archive: &mut KeyedArchive) -> anyhow::Result<Directory> {
    debug!("Reading directory");
    archive
        .read_record::<Directory>(DIRECTORY_KEY)
        .context("cannot read the archive directory")
}
