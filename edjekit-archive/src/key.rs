use std::fmt;

use crate::format;

/// The kinds of resource blob a collection can reference by numeric id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ResourceKind {
    Image,
    Sample,
    Font,
}

impl ResourceKind {
    /// All kinds, in the order their blobs are laid out in an archive.
    pub const ALL: [ResourceKind; 3] = [Self::Image, Self::Sample, Self::Font];

    pub fn key_prefix(self) -> &'static str {
        match self {
            Self::Image => format::IMAGE_KEY_PREFIX,
            Self::Sample => format::SAMPLE_KEY_PREFIX,
            Self::Font => format::FONT_KEY_PREFIX,
        }
    }

    /// Key of the blob holding resource `id` of this kind.
    pub fn key(self, id: u32) -> String {
        format!("{}{id}", self.key_prefix())
    }

    pub fn plural(self) -> &'static str {
        match self {
            Self::Image => "images",
            Self::Sample => "samples",
            Self::Font => "fonts",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Image => "image",
            Self::Sample => "sample",
            Self::Font => "font",
        })
    }
}
