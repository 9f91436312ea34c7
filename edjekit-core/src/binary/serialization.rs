mod serializer;

pub use serializer::*;

use std::io::{Cursor, Write};

use uuid::Uuid;

use crate::binary::error::ResultContextExt;

use super::{Error, ErrorKind};

/// Implemented by everything serializable to bytes.
pub trait Serialize {
    /// Serializes the value to bytes.
    fn serialize(&self, serializer: &mut Serializer<impl Write>) -> Result<(), Error>;
}

impl Serialize for () {
    fn serialize(&self, _: &mut Serializer<impl Write>) -> Result<(), Error> {
        Ok(())
    }
}

macro_rules! serialize_primitive_le {
    ($T:ty) => {
        impl Serialize for $T {
            fn serialize(&self, serializer: &mut Serializer<impl Write>) -> Result<(), Error> {
                serializer.write_bytes(&self.to_le_bytes())
            }
        }
    };
}

serialize_primitive_le!(u8);
serialize_primitive_le!(u16);
serialize_primitive_le!(u32);
serialize_primitive_le!(u64);

serialize_primitive_le!(i8);
serialize_primitive_le!(i16);
serialize_primitive_le!(i32);
serialize_primitive_le!(i64);

impl<T> Serialize for Option<T>
where
    T: Serialize,
{
    fn serialize(&self, serializer: &mut Serializer<impl Write>) -> Result<(), Error> {
        match self {
            None => 0_u8.serialize(serializer),
            Some(value) => {
                1_u8.serialize(serializer)?;
                value
                    .serialize(serializer)
                    .context("cannot serialize option value")
            }
        }
    }
}

impl<T> Serialize for Vec<T>
where
    T: Serialize,
{
    fn serialize(&self, serializer: &mut Serializer<impl Write>) -> Result<(), Error> {
        self.as_slice().serialize(serializer)
    }
}

impl<T> Serialize for [T]
where
    T: Serialize,
{
    fn serialize(&self, serializer: &mut Serializer<impl Write>) -> Result<(), Error> {
        let len = u32::try_from(self.len()).map_err(|_| {
            ErrorKind::Serialize.make(format!(
                "array of length {} does not fit in a u32 length prefix",
                self.len()
            ))
        })?;
        len.serialize(serializer)
            .context("cannot serialize length of array")?;
        for (i, element) in self.iter().enumerate() {
            element
                .serialize(serializer)
                .with_context(|| format!("cannot serialize array element at index {i}"))?;
        }
        Ok(())
    }
}

impl Serialize for Uuid {
    fn serialize(&self, serializer: &mut Serializer<impl Write>) -> Result<(), Error> {
        serializer.write_bytes(self.as_bytes())
    }
}

/// Convenience function that serializes a value into a freshly allocated buffer.
pub fn serialize(value: &impl Serialize) -> Result<Vec<u8>, Error> {
    let mut buffer = vec![];
    value.serialize(&mut Serializer::new(Cursor::new(&mut buffer)))?;
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use crate::binary::{deserialize, serialize};

    #[test]
    fn optional_values_carry_a_presence_tag() {
        assert_eq!(serialize(&None::<u16>).unwrap(), vec![0]);
        assert_eq!(serialize(&Some(0x0102_u16)).unwrap(), vec![1, 0x02, 0x01]);
    }

    #[test]
    fn nested_arrays_read_back() {
        let value = vec![vec![1_u32, 2], vec![], vec![3]];
        let bytes = serialize(&value).unwrap();
        assert_eq!(deserialize::<Vec<Vec<u32>>>(&bytes).unwrap(), value);
    }
}
