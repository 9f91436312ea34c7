use std::{fmt, io, path::PathBuf};

use edjekit_archive::{ArchiveError, ResourceKind, WeldError};
use edjekit_core::binary;
use thiserror::Error;

/// Why a pick failed. Each variant belongs to exactly one [`Status`] category.
#[derive(Debug, Error)]
pub enum PickError {
    #[error(transparent)]
    Usage(#[from] UsageError),
    #[error(transparent)]
    File(#[from] FileError),
    #[error(transparent)]
    Corrupt(#[from] CorruptError),
    #[error(transparent)]
    Conflict(#[from] ConflictError),
    #[error("group {group:?} does not exist in {path:?}")]
    MissingGroup { path: PathBuf, group: String },
    #[error(transparent)]
    Write(#[from] WriteError),
}

#[derive(Debug, Error)]
pub enum UsageError {
    #[error("no output file given (use -o <file>)")]
    MissingOutput,
    #[error("nothing to pick (use -i <file> -g <group>, or -a <file>)")]
    NoInclusions,
    #[error("unknown argument {0:?}")]
    UnknownFlag(String),
    #[error("{0} expects a value")]
    MissingValue(String),
    #[error("group {0:?} is not preceded by an input file (use -i <file> first)")]
    GroupWithoutInput(String),
    #[error("input {0:?} names no groups (follow it with -g <group>, or use -a <file>)")]
    InputWithoutGroups(PathBuf),
    #[error("output file given more than once")]
    DuplicateOutput,
    #[error("{0}")]
    InvalidCompression(String),
}

#[derive(Debug, Error)]
pub enum FileError {
    #[error("cannot open source archive {path:?}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: ArchiveError,
    },
}

#[derive(Debug, Error)]
pub enum CorruptError {
    #[error("{path:?} contains no groups")]
    EmptyCollectionTable { path: PathBuf },
    #[error("cannot read the directory of {path:?}")]
    UnreadableDirectory {
        path: PathBuf,
        #[source]
        source: ArchiveError,
    },
    #[error("cannot read group {group:?} from {path:?}")]
    UnreadableCollection {
        path: PathBuf,
        group: String,
        #[source]
        source: ArchiveError,
    },
    #[error("{path:?} lists group {expected:?}, but its record is named {found:?}")]
    NameMismatch {
        path: PathBuf,
        expected: String,
        found: String,
    },
    #[error("group {group:?} in {path:?} references group {target:?}, which does not exist")]
    DanglingGroupRef {
        path: PathBuf,
        group: String,
        target: String,
    },
    #[error("group {group:?} in {path:?} references {kind} {id}, which does not exist")]
    DanglingResourceRef {
        path: PathBuf,
        group: String,
        kind: ResourceKind,
        id: u32,
    },
    #[error("cannot read {kind} {id} from {path:?}")]
    MissingBlob {
        path: PathBuf,
        kind: ResourceKind,
        id: u32,
        #[source]
        source: ArchiveError,
    },
}

#[derive(Debug, Error)]
pub enum ConflictError {
    #[error("group {name:?} exists in both {first:?} and {second:?}")]
    DuplicateGroupName {
        name: String,
        first: PathBuf,
        second: PathBuf,
    },
}

#[derive(Debug, Error)]
pub enum WriteError {
    #[error("not enough disk space to write {path:?}")]
    DiskFull {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("permission denied while writing {path:?}")]
    PermissionDenied {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cannot move the finished archive {temp:?} to {path:?} (the temporary file was kept)")]
    RenameFailed {
        temp: PathBuf,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cannot write {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cannot encode the output archive")]
    Encode(#[from] binary::Error),
    #[error("cannot assemble the output archive")]
    Weld(#[from] WeldError),
}

impl WriteError {
    /// Sorts an I/O failure on `path` into the matching variant.
    pub fn from_io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            io::ErrorKind::StorageFull => Self::DiskFull { path, source },
            io::ErrorKind::PermissionDenied => Self::PermissionDenied { path, source },
            _ => Self::Io { path, source },
        }
    }
}

/// Outcome category of a pick, for callers that only care about the kind of failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    NoError,
    Usage,
    File,
    Corrupt,
    Conflict,
    MissingGroup,
    Write,
}

impl Status {
    pub const ALL: [Status; 7] = [
        Self::NoError,
        Self::Usage,
        Self::File,
        Self::Corrupt,
        Self::Conflict,
        Self::MissingGroup,
        Self::Write,
    ];

    /// Process exit code for this status. Each failure category gets its own nonzero code.
    pub fn exit_code(self) -> u8 {
        match self {
            Self::NoError => 0,
            Self::Usage => 2,
            Self::File => 3,
            Self::Corrupt => 4,
            Self::Conflict => 5,
            Self::MissingGroup => 6,
            Self::Write => 7,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(pick_err_str(*self))
    }
}

impl PickError {
    pub fn status(&self) -> Status {
        match self {
            Self::Usage(_) => Status::Usage,
            Self::File(_) => Status::File,
            Self::Corrupt(_) => Status::Corrupt,
            Self::Conflict(_) => Status::Conflict,
            Self::MissingGroup { .. } => Status::MissingGroup,
            Self::Write(_) => Status::Write,
        }
    }
}

/// Human-readable description of a status category.
pub fn pick_err_str(status: Status) -> &'static str {
    match status {
        Status::NoError => "no error",
        Status::Usage => "invalid command line",
        Status::File => "cannot open a source archive",
        Status::Corrupt => "source archive is corrupt or has no groups",
        Status::Conflict => "the same group name is provided by more than one source archive",
        Status::MissingGroup => "requested group does not exist",
        Status::Write => "cannot write the output archive",
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn exit_codes_are_distinct() {
        let codes: HashSet<_> = Status::ALL.iter().map(|status| status.exit_code()).collect();
        assert_eq!(codes.len(), Status::ALL.len());
        assert_eq!(Status::NoError.exit_code(), 0);
    }

    #[test]
    fn every_status_has_a_description() {
        for status in Status::ALL {
            assert!(!pick_err_str(status).is_empty());
        }
    }

    #[test]
    fn io_errors_are_classified() {
        let full = WriteError::from_io("out.edj", io::Error::from(io::ErrorKind::StorageFull));
        assert!(matches!(full, WriteError::DiskFull { .. }));
        let denied =
            WriteError::from_io("out.edj", io::Error::from(io::ErrorKind::PermissionDenied));
        assert!(matches!(denied, WriteError::PermissionDenied { .. }));
        let other = WriteError::from_io("out.edj", io::Error::from(io::ErrorKind::Other));
        assert!(matches!(other, WriteError::Io { .. }));
    }

    #[test]
    fn errors_map_to_their_category() {
        let error = PickError::from(UsageError::NoInclusions);
        assert_eq!(error.status(), Status::Usage);
        let error = PickError::MissingGroup {
            path: "a.edj".into(),
            group: "Main".into(),
        };
        assert_eq!(error.status(), Status::MissingGroup);
    }
}
