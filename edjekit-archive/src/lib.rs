//! Keyed-blob archive container and the layout records stored in it.
//!
//! A [`KeyedArchive`] is opened for reading and hands out blobs by key; a [`Welder`] collects
//! blobs and assembles a new archive. Layout archives store a [`Directory`] under
//! [`format::DIRECTORY_KEY`], one [`Collection`] per group, and one blob per image, sample, and
//! font.

pub mod collection;
pub mod compression;
pub mod directory;
pub mod error;
pub mod format;
pub mod key;
pub mod reader;
pub mod sections;
pub mod welder;

pub use collection::{Collection, GroupRef, GroupRefKind, Part, ResourceRef};
pub use compression::Compression;
pub use directory::{CollectionEntry, Directory, ResourceEntry};
pub use error::{ArchiveError, WeldError};
pub use key::ResourceKind;
pub use reader::KeyedArchive;
pub use welder::Welder;
