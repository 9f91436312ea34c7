use edjekit_core::{string::ArchiveString, Deserialize, Serialize};

use crate::compression::Compression;

/// Locates one keyed blob inside the data section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct KeyTableEntry {
    pub key: ArchiveString,
    pub compression: Compression,
    /// Absolute offset of the stored bytes.
    pub offset: u32,
    pub stored_size: u32,
    /// Size after decompression.
    pub size: u32,
}
