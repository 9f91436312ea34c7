use std::{
    borrow::Borrow,
    fmt::{self, Debug, Display},
    io::{Read, Write},
    ops::Deref,
};

use crate::binary::{
    Deserialize, Deserializer, Error, ErrorKind, ResultContextExt, Serialize, Serializer,
};

/// Length-prefixed UTF-8 string as stored in archives: a `u32` byte length followed by the bytes,
/// without a NUL terminator.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Default, Hash)]
pub struct ArchiveString {
    string: String,
}

impl ArchiveString {
    pub fn as_str(&self) -> &str {
        &self.string
    }

    pub fn into_string(self) -> String {
        self.string
    }
}

impl Debug for ArchiveString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Debug::fmt(&self.string, f)
    }
}

impl Display for ArchiveString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.string, f)
    }
}

impl Deref for ArchiveString {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.string
    }
}

impl Borrow<str> for ArchiveString {
    fn borrow(&self) -> &str {
        &self.string
    }
}

impl From<String> for ArchiveString {
    fn from(string: String) -> Self {
        Self { string }
    }
}

impl From<&str> for ArchiveString {
    fn from(string: &str) -> Self {
        Self {
            string: string.to_owned(),
        }
    }
}

impl PartialEq<str> for ArchiveString {
    fn eq(&self, other: &str) -> bool {
        self.string == other
    }
}

impl PartialEq<&str> for ArchiveString {
    fn eq(&self, other: &&str) -> bool {
        self.string == *other
    }
}

impl Deserialize for ArchiveString {
    fn deserialize(deserializer: &mut Deserializer<impl Read>) -> Result<Self, Error> {
        let length = deserializer
            .deserialize::<u32>()
            .context("cannot read string length")?;
        let bytes = deserializer
            .read_byte_vec(u64::from(length))
            .with_context(|| format!("cannot read string of length {length}"))?;
        let string = String::from_utf8(bytes).map_err(|error| {
            ErrorKind::Deserialize.make(format!("string is not valid UTF-8: {error}"))
        })?;
        Ok(Self { string })
    }
}

impl Serialize for ArchiveString {
    fn serialize(&self, serializer: &mut Serializer<impl Write>) -> Result<(), Error> {
        let length = u32::try_from(self.string.len()).map_err(|_| {
            ErrorKind::Serialize.make(format!(
                "string of length {} is too long to serialize",
                self.string.len()
            ))
        })?;
        length.serialize(serializer)?;
        serializer
            .write_bytes(self.string.as_bytes())
            .context("cannot serialize string")
    }
}

#[cfg(test)]
mod tests {
    use crate::binary::{deserialize, serialize};

    use super::ArchiveString;

    #[test]
    fn string_is_length_prefixed_without_terminator() {
        let bytes = serialize(&ArchiveString::from("Main")).unwrap();
        assert_eq!(bytes, b"\x04\0\0\0Main");
        assert_eq!(deserialize::<ArchiveString>(&bytes).unwrap(), "Main");
    }

    #[test]
    fn invalid_utf8_is_rejected() {
        assert!(deserialize::<ArchiveString>(b"\x02\0\0\0\xC3\x28").is_err());
    }

    #[test]
    fn oversized_length_is_rejected_before_allocating() {
        let error = deserialize::<ArchiveString>(b"\xFF\xFF\xFF\x7Fabc").unwrap_err();
        assert!(error.root_message().contains("only 3 are left"));
    }
}
