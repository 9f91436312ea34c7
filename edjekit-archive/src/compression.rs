use std::{
    fmt,
    io::{Read, Write},
    str::FromStr,
};

use edjekit_core::binary::{self, Deserialize, Deserializer, ErrorKind, Serialize, Serializer};
use flate2::{read::ZlibDecoder, write::ZlibEncoder};
use rust_lzo::{LZOContext, LZOError};
use tracing::trace;

/// Upper bound on the buffer reserved up front for a zlib blob, relative to its stored size. The
/// declared size comes from the archive and is not trusted for allocation.
const ZLIB_PREALLOCATION_RATIO: usize = 8;

/// How a blob's bytes are stored in the data section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Compression {
    #[default]
    None,
    Zlib,
    Lzo,
}

impl Compression {
    const NONE: u32 = 0;
    const ZLIB: u32 = 1;
    const LZO: u32 = 2;

    pub fn compress(self, data: &[u8]) -> Result<Vec<u8>, String> {
        match self {
            Self::None => Ok(data.to_vec()),
            Self::Zlib => {
                let mut encoder = ZlibEncoder::new(Vec::new(), flate2::Compression::default());
                encoder.write_all(data).map_err(|error| error.to_string())?;
                encoder.finish().map_err(|error| error.to_string())
            }
            Self::Lzo => {
                let mut context = LZOContext::new();
                let mut output = Vec::with_capacity(data.len() + data.len() / 16 + 64 + 3);
                let result = context.compress(data, &mut output);
                if result != LZOError::OK {
                    return Err(format!("LZO error {}", lzo_error_name(result)));
                }
                Ok(output)
            }
        }
    }

    pub fn decompress(self, stored: &[u8], size: usize) -> Result<Vec<u8>, String> {
        trace!(
            compression = ?self,
            stored_size = stored.len(),
            size,
            "Decompressing blob"
        );
        let output = match self {
            Self::None => stored.to_vec(),
            Self::Zlib => {
                // One byte past `size` is enough to tell that the stream is too long.
                let limit = u64::try_from(size).map_or(u64::MAX, |size| size.saturating_add(1));
                let mut output =
                    Vec::with_capacity(size.min(stored.len().saturating_mul(ZLIB_PREALLOCATION_RATIO)));
                ZlibDecoder::new(stored)
                    .take(limit)
                    .read_to_end(&mut output)
                    .map_err(|error| error.to_string())?;
                if output.len() > size {
                    return Err(format!(
                        "expected {size} bytes after decompression, but the stream holds more"
                    ));
                }
                output
            }
            Self::Lzo => {
                let mut output = vec![0; size];
                let (decompressed, result) = LZOContext::decompress_to_slice(stored, &mut output);
                if result != LZOError::OK {
                    return Err(format!("LZO error {}", lzo_error_name(result)));
                }
                let len = decompressed.len();
                output.truncate(len);
                output
            }
        };
        if output.len() != size {
            return Err(format!(
                "expected {size} bytes after decompression, but got {}",
                output.len()
            ));
        }
        Ok(output)
    }
}

fn lzo_error_name(error: LZOError) -> &'static str {
    match error {
        LZOError::OK => "OK",
        LZOError::ERROR => "ERROR",
        LZOError::OUT_OF_MEMORY => "OUT_OF_MEMORY",
        LZOError::NOT_COMPRESSIBLE => "NOT_COMPRESSIBLE",
        LZOError::INPUT_OVERRUN => "INPUT_OVERRUN",
        LZOError::OUTPUT_OVERRUN => "OUTPUT_OVERRUN",
        LZOError::LOOKBEHIND_OVERRUN => "LOOKBEHIND_OVERRUN",
        LZOError::EOF_NOT_FOUND => "EOF_NOT_FOUND",
        LZOError::INPUT_NOT_CONSUMED => "INPUT_NOT_CONSUMED",
        LZOError::NOT_YET_IMPLEMENTED => "NOT_YET_IMPLEMENTED",
        LZOError::INVALID_ARGUMENT => "INVALID_ARGUMENT",
    }
}

impl fmt::Display for Compression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::None => "none",
            Self::Zlib => "zlib",
            Self::Lzo => "lzo",
        })
    }
}

impl FromStr for Compression {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(Self::None),
            "zlib" => Ok(Self::Zlib),
            "lzo" => Ok(Self::Lzo),
            _ => Err(format!(
                "invalid compression {s:?}; it must be 'none', 'zlib', or 'lzo'"
            )),
        }
    }
}

impl Deserialize for Compression {
    fn deserialize(deserializer: &mut Deserializer<impl Read>) -> Result<Self, binary::Error> {
        match deserializer.deserialize::<u32>()? {
            Self::NONE => Ok(Self::None),
            Self::ZLIB => Ok(Self::Zlib),
            Self::LZO => Ok(Self::Lzo),
            other => Err(ErrorKind::Deserialize.make(format!("unsupported compression kind {other}"))),
        }
    }
}

impl Serialize for Compression {
    fn serialize(&self, serializer: &mut Serializer<impl Write>) -> Result<(), binary::Error> {
        match self {
            Self::None => Self::NONE,
            Self::Zlib => Self::ZLIB,
            Self::Lzo => Self::LZO,
        }
        .serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::Compression;

    fn sample() -> Vec<u8> {
        b"layout layout layout layout layout layout layout layout"
            .iter()
            .copied()
            .cycle()
            .take(4096)
            .collect()
    }

    #[test]
    fn zlib_shrinks_repetitive_data_and_restores_it() {
        let data = sample();
        let stored = Compression::Zlib.compress(&data).unwrap();
        assert!(stored.len() < data.len());
        assert_eq!(Compression::Zlib.decompress(&stored, data.len()).unwrap(), data);
    }

    #[test]
    fn lzo_restores_data() {
        let data = sample();
        let stored = Compression::Lzo.compress(&data).unwrap();
        assert_eq!(Compression::Lzo.decompress(&stored, data.len()).unwrap(), data);
    }

    #[test]
    fn size_mismatch_is_reported() {
        let data = sample();
        let stored = Compression::Zlib.compress(&data).unwrap();
        assert!(Compression::Zlib.decompress(&stored, data.len() + 1).is_err());
        assert!(Compression::None.decompress(&data, 3).is_err());
    }

    #[test]
    fn zlib_streams_longer_than_declared_are_cut_off() {
        let zeros = vec![0; 16 * 1024 * 1024];
        let stored = Compression::Zlib.compress(&zeros).unwrap();
        assert!(stored.len() < 64 * 1024);

        let error = Compression::Zlib.decompress(&stored, 10).unwrap_err();
        assert!(error.contains("holds more"), "{error}");
        // A huge declared size does not change the result for a short stream.
        let data = sample();
        let stored = Compression::Zlib.compress(&data).unwrap();
        assert!(Compression::Zlib.decompress(&stored, u32::MAX as usize).is_err());
    }

    #[test]
    fn parses_from_command_line_names() {
        assert_eq!("lzo".parse::<Compression>().unwrap(), Compression::Lzo);
        assert!("gzip".parse::<Compression>().is_err());
    }
}
