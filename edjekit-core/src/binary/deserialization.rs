mod deserializer;

pub use deserializer::*;

use std::io::Read;

use uuid::Uuid;

use crate::binary::error::ResultContextExt;

use super::{Error, ErrorKind};

/// Implemented by everything deserializable from bytes.
pub trait Deserialize: Sized {
    /// Deserializes the value from bytes.
    fn deserialize(deserializer: &mut Deserializer<impl Read>) -> Result<Self, Error>;
}

impl Deserialize for () {
    fn deserialize(_: &mut Deserializer<impl Read>) -> Result<Self, Error> {
        Ok(())
    }
}

macro_rules! deserialize_primitive_le {
    ($T:ty) => {
        impl Deserialize for $T {
            fn deserialize(deserializer: &mut Deserializer<impl Read>) -> Result<Self, Error> {
                let mut buf = [0; std::mem::size_of::<$T>()];
                deserializer.read_bytes(&mut buf)?;
                Ok(<$T>::from_le_bytes(buf))
            }
        }
    };
}

deserialize_primitive_le!(u8);
deserialize_primitive_le!(u16);
deserialize_primitive_le!(u32);
deserialize_primitive_le!(u64);

deserialize_primitive_le!(i8);
deserialize_primitive_le!(i16);
deserialize_primitive_le!(i32);
deserialize_primitive_le!(i64);

/// `Option<T>` is serialized as a `u8` presence tag (0 or 1), followed by the value if the tag
/// is 1.
impl<T> Deserialize for Option<T>
where
    T: Deserialize,
{
    fn deserialize(deserializer: &mut Deserializer<impl Read>) -> Result<Self, Error> {
        let tag = deserializer
            .deserialize::<u8>()
            .context("cannot read option tag")?;
        match tag {
            0 => Ok(None),
            1 => Ok(Some(
                deserializer
                    .deserialize()
                    .context("cannot deserialize option value")?,
            )),
            other => Err(ErrorKind::Deserialize.make(format!(
                "option tag must be 0 or 1, but got {other}"
            ))),
        }
    }
}

/// `Vec<T>` is serialized as a `u32` size followed by the vector's elements.
impl<T> Deserialize for Vec<T>
where
    T: Deserialize,
{
    fn deserialize(deserializer: &mut Deserializer<impl Read>) -> Result<Self, Error> {
        let len = deserializer
            .deserialize::<u32>()
            .context("cannot read array length")? as usize;
        // Don't trust the length for preallocation; a corrupt length would otherwise ask for
        // gigabytes up front.
        let remaining = usize::try_from(deserializer.remaining()).unwrap_or(usize::MAX);
        let mut vec = Vec::with_capacity(len.min(remaining));
        for i in 0..len {
            vec.push(deserializer.deserialize().with_context(|| {
                format!("cannot deserialize array field {i} (array of length {len})")
            })?);
        }
        Ok(vec)
    }
}

impl Deserialize for Uuid {
    fn deserialize(deserializer: &mut Deserializer<impl Read>) -> Result<Self, Error> {
        let mut buf = [0; 16];
        deserializer.read_bytes(&mut buf)?;
        Ok(Uuid::from_bytes(buf))
    }
}

impl<R> Deserializer<R> {
    /// Convenience function that deserializes a type implementing [`Deserialize`] from the current
    /// stream position.
    pub fn deserialize<T>(&mut self) -> Result<T, Error>
    where
        R: Read,
        T: Deserialize,
    {
        T::deserialize(self)
    }
}

/// Convenience function that deserializes a type implementing [`Deserialize`] from a buffer.
///
/// Bytes left over after the value are an error; a record stored under a key must span the
/// whole blob.
pub fn deserialize<T>(buffer: &[u8]) -> Result<T, Error>
where
    T: Deserialize,
{
    let mut deserializer = Deserializer::from_buffer(buffer);
    let value = T::deserialize(&mut deserializer)?;
    let trailing = deserializer.remaining();
    if trailing != 0 {
        return Err(ErrorKind::Deserialize.make(format!(
            "{trailing} trailing bytes after the end of the value"
        )));
    }
    Ok(value)
}
