use std::{io, path::PathBuf};

use edjekit_core::binary;
use thiserror::Error;

use crate::compression::Compression;

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("cannot open archive {path:?}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("archive {path:?} has an invalid header")]
    BadHeader {
        path: PathBuf,
        #[source]
        source: binary::Error,
    },
    #[error("archive {path:?} has an unreadable key table")]
    BadKeyTable {
        path: PathBuf,
        #[source]
        source: binary::Error,
    },
    #[error("key {key:?} is not present in archive {path:?}")]
    KeyNotFound { path: PathBuf, key: String },
    #[error("cannot read key {key:?} from archive {path:?}")]
    Read {
        path: PathBuf,
        key: String,
        #[source]
        source: binary::Error,
    },
    #[error("cannot decode the record stored under key {key:?} in archive {path:?}")]
    Decode {
        path: PathBuf,
        key: String,
        #[source]
        source: binary::Error,
    },
    #[error("cannot decompress key {key:?} ({compression:?}): {reason}")]
    Decompress {
        key: String,
        compression: Compression,
        reason: String,
    },
}

#[derive(Debug, Error)]
pub enum WeldError {
    #[error("key {0:?} was written twice")]
    DuplicateKey(String),
    #[error("archive is too big (its size exceeds the unsigned 32-bit integer limit)")]
    ArchiveTooBig,
    #[error("cannot compress key {key:?} ({compression:?}): {reason}")]
    Compress {
        key: String,
        compression: Compression,
        reason: String,
    },
    #[error("cannot serialize archive structure")]
    Serialize(#[from] binary::Error),
}
