use edjekit_core::{
    primitive::{ConstU16, ConstU32},
    serializable_bitflags,
    uuid::Uuid,
    Deserialize, Serialize,
};

use crate::format;

/// Archive header. Always at offset 0.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Summary {
    pub magic: ConstU32<{ format::ARCHIVE_MAGIC }>,
    pub file_version: ConstU16<{ format::ARCHIVE_FORMAT_VERSION }>,
    pub flags: ArchiveFlags,
    /// Derived from the data section's bytes, so identical archives get identical ids.
    pub content_id: Uuid,

    pub key_table_len: u32,
    pub key_table_offset: u32,
    pub data_offset: u32,
    pub data_size: u32,
}

bitflags::bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ArchiveFlags: u16 {
        /// Resources were deduplicated by content when the archive was written.
        const DEDUPLICATED = 0x0001;
    }
}

serializable_bitflags!(ArchiveFlags);
