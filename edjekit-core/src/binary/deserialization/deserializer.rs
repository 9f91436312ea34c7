use std::{
    io::{Cursor, Read, Seek, SeekFrom},
    ops::Deref,
};

use crate::binary::{Error, ErrorKind, ResultContextExt, ResultMapToBinaryErrorExt};

/// Reads values from a stream of known length, tracking the position so that errors can say
/// where they happened and lengths read from the stream can be checked against what is left.
#[derive(Debug, Clone, Copy)]
pub struct Deserializer<R> {
    len: u64,
    position: u64,
    stream: R,
}

impl<R> Deserializer<R> {
    pub fn stream_len(&self) -> u64 {
        self.len
    }

    pub fn stream_position(&self) -> u64 {
        self.position
    }

    /// Number of bytes between the current position and the end of the stream.
    pub fn remaining(&self) -> u64 {
        self.len.saturating_sub(self.position)
    }

    pub fn read_bytes(&mut self, out_bytes: &mut [u8]) -> Result<(), Error>
    where
        R: Read,
    {
        let position = self.position;
        self.stream
            .read_exact(out_bytes)
            .map_err_to_binary_error(ErrorKind::Deserialize)
            .with_context(|| format!("at stream position {position:08x}"))?;
        self.position += out_bytes.len() as u64;
        Ok(())
    }

    /// Reads `len` bytes into a new buffer. Lengths past the end of the stream fail before
    /// anything is allocated.
    pub fn read_byte_vec(&mut self, len: u64) -> Result<Vec<u8>, Error>
    where
        R: Read,
    {
        let remaining = self.remaining();
        if len > remaining {
            return Err(ErrorKind::Deserialize.make(format!(
                "{len} bytes requested at stream position {:08x}, but only {remaining} are left",
                self.position
            )));
        }
        let mut bytes = vec![0; len as usize];
        self.read_bytes(&mut bytes)?;
        Ok(bytes)
    }

    pub fn seek(&mut self, whence: SeekFrom) -> Result<u64, Error>
    where
        R: Seek,
    {
        self.position = self
            .stream
            .seek(whence)
            .map_err_to_binary_error(ErrorKind::Deserialize)?;
        Ok(self.position)
    }
}

impl<T> Deserializer<Cursor<T>>
where
    T: Deref<Target = [u8]>,
{
    pub fn from_buffer(buffer: T) -> Self {
        Self {
            len: buffer.len() as u64,
            position: 0,
            stream: Cursor::new(buffer),
        }
    }
}

impl<R> Deserializer<R>
where
    R: Read + Seek,
{
    /// Wraps a seekable stream, starting at its current position.
    pub fn new(mut stream: R) -> Result<Self, Error> {
        let position = stream
            .stream_position()
            .map_err_to_binary_error(ErrorKind::Deserialize)
            .context("cannot obtain current stream position")?;
        let len = stream
            .seek(SeekFrom::End(0))
            .and_then(|len| stream.seek(SeekFrom::Start(position)).map(|_| len))
            .map_err_to_binary_error(ErrorKind::Deserialize)
            .context("cannot obtain stream length")?;
        Ok(Self {
            len,
            position,
            stream,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::Deserializer;

    #[test]
    fn byte_vecs_cannot_outrun_the_stream() {
        let mut deserializer = Deserializer::from_buffer(&b"abcdef"[..]);
        assert_eq!(deserializer.read_byte_vec(4).unwrap(), b"abcd");
        assert_eq!(deserializer.remaining(), 2);
        assert!(deserializer.read_byte_vec(u64::from(u32::MAX)).is_err());
        assert_eq!(deserializer.read_byte_vec(2).unwrap(), b"ef");
        assert_eq!(deserializer.remaining(), 0);
    }
}
