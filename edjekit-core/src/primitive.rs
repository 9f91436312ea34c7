use std::{
    fmt,
    io::{Read, Write},
};

use crate::binary::{Deserialize, Deserializer, Error, ErrorKind, Serialize, Serializer};

macro_rules! const_primitive {
    ($Underlying:ty, $NewType:tt) => {
        #[doc = concat!("Always serializes to the same `", stringify!($Underlying), "`.\n\nDuring deserialization if the value is not that constant, an error is thrown.")]
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Hash)]
        pub struct $NewType<const VALUE: $Underlying>;

        impl<const VALUE: $Underlying> Deserialize for $NewType<VALUE> {
            fn deserialize(deserializer: &mut Deserializer<impl Read>) -> Result<Self, Error> {
                let value = deserializer.deserialize::<$Underlying>()?;
                if value != VALUE {
                    Err(ErrorKind::Deserialize.make(format!("constant {VALUE:#x} expected, but got {value:#x}")))
                } else {
                    Ok(Self)
                }
            }
        }

        impl<const VALUE: $Underlying> Serialize for $NewType<VALUE> {
            fn serialize(&self, serializer: &mut Serializer<impl Write>) -> Result<(), Error> {
                VALUE.serialize(serializer)
            }
        }

        impl<const VALUE: $Underlying> fmt::Debug for $NewType<VALUE> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Debug::fmt(&VALUE, f)
            }
        }

        impl<const VALUE: $Underlying> fmt::Display for $NewType<VALUE> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&VALUE, f)
            }
        }
    }
}

const_primitive!(u8, ConstU8);
const_primitive!(u16, ConstU16);
const_primitive!(u32, ConstU32);

#[cfg(test)]
mod tests {
    use crate::binary::{deserialize, serialize};

    use super::{ConstU16, ConstU32};

    #[test]
    fn constants_serialize_to_their_value() {
        assert_eq!(
            serialize(&ConstU32::<0x4B4A4445>).unwrap(),
            vec![0x45, 0x44, 0x4A, 0x4B]
        );
    }

    #[test]
    fn mismatched_constant_is_rejected() {
        assert!(deserialize::<ConstU16<1>>(&[1, 0]).is_ok());
        let error = deserialize::<ConstU16<1>>(&[2, 0]).unwrap_err();
        assert_eq!(error.root_message(), "constant 0x1 expected, but got 0x2");
    }
}
