//! Constants of the keyed-blob archive format and the key names layout archives use.

/// `"EDJK"` when written out little-endian.
pub const ARCHIVE_MAGIC: u32 = 0x4B4A4445;
pub const ARCHIVE_FORMAT_VERSION: u16 = 1;
pub const DIRECTORY_FORMAT_VERSION: u16 = 1;

/// Key under which the [`Directory`][crate::Directory] is stored.
pub const DIRECTORY_KEY: &str = "edje/file";
pub const COLLECTION_KEY_PREFIX: &str = "edje/collections/";
pub const IMAGE_KEY_PREFIX: &str = "edje/images/";
pub const SAMPLE_KEY_PREFIX: &str = "edje/sounds/";
pub const FONT_KEY_PREFIX: &str = "edje/fonts/";

/// Resource ids start here in every layout archive.
pub const FIRST_RESOURCE_ID: u32 = 0;

pub fn collection_key(id: u32) -> String {
    format!("{COLLECTION_KEY_PREFIX}{id}")
}
