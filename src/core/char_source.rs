use std::io::{self, ErrorKind, Read};
use std::str::Chars;

// bytes pulled from the underlying reader per read call
const BYTE_BUFFER_SIZE: usize = 8192;

/// Pull based producer of chars, the segmenters only ever talk to this.
pub trait CharSource {
    /// Read up to `dst.len()` chars into `dst`.
    ///
    /// Returns the number of chars written, `Ok(0)` on a non-empty `dst`
    /// means end of stream.
    fn read(&mut self, dst: &mut [char]) -> io::Result<usize>;
}

impl<S: CharSource + ?Sized> CharSource for &mut S {
    fn read(&mut self, dst: &mut [char]) -> io::Result<usize> {
        (**self).read(dst)
    }
}

impl<S: CharSource + ?Sized> CharSource for Box<S> {
    fn read(&mut self, dst: &mut [char]) -> io::Result<usize> {
        (**self).read(dst)
    }
}

/// Chars of a borrowed string.
#[derive(Debug, Clone)]
pub struct StrSource<'a> {
    chars: Chars<'a>,
}

impl<'a> StrSource<'a> {
    pub fn new(text: &'a str) -> Self {
        StrSource {
            chars: text.chars(),
        }
    }
}

impl<'a> From<&'a str> for StrSource<'a> {
    fn from(text: &'a str) -> Self {
        StrSource::new(text)
    }
}

impl CharSource for StrSource<'_> {
    fn read(&mut self, dst: &mut [char]) -> io::Result<usize> {
        let mut count = 0;
        for (slot, c) in dst.iter_mut().zip(&mut self.chars) {
            *slot = c;
            count += 1;
        }
        Ok(count)
    }
}

/// Decodes utf-8 from a byte reader on demand.
///
/// A multi-byte sequence split across two reads is carried over to the next
/// call. Malformed input, or a stream that stops in the middle of a sequence,
/// is reported as `ErrorKind::InvalidData`.
pub struct ReaderSource<R> {
    reader: R,
    bytes: Box<[u8]>,
    // undecoded bytes live in bytes[start..end]
    start: usize,
    end: usize,
    eof: bool,
}

impl<R: Read> ReaderSource<R> {
    pub fn new(reader: R) -> Self {
        ReaderSource {
            reader,
            bytes: vec![0u8; BYTE_BUFFER_SIZE].into_boxed_slice(),
            start: 0,
            end: 0,
            eof: false,
        }
    }

    pub fn into_inner(self) -> R {
        self.reader
    }

    // decode as many complete chars as fit into dst
    fn decode_into(&mut self, dst: &mut [char]) -> io::Result<usize> {
        let pending = &self.bytes[self.start..self.end];
        let valid = match std::str::from_utf8(pending) {
            Ok(s) => s,
            Err(e) => {
                if e.valid_up_to() == 0 && e.error_len().is_some() {
                    return Err(io::Error::new(ErrorKind::InvalidData, e));
                }
                // the prefix up to valid_up_to is known good utf-8
                std::str::from_utf8(&pending[..e.valid_up_to()])
                    .map_err(|e| io::Error::new(ErrorKind::InvalidData, e))?
            }
        };
        let mut count = 0;
        let mut consumed = 0;
        for (slot, c) in dst.iter_mut().zip(valid.chars()) {
            *slot = c;
            count += 1;
            consumed += c.len_utf8();
        }
        self.start += consumed;
        Ok(count)
    }

    fn fill_bytes(&mut self) -> io::Result<()> {
        // keep the undecoded tail, drop what is already handed out
        self.bytes.copy_within(self.start..self.end, 0);
        self.end -= self.start;
        self.start = 0;
        loop {
            match self.reader.read(&mut self.bytes[self.end..]) {
                Ok(0) => {
                    self.eof = true;
                    return Ok(());
                }
                Ok(n) => {
                    self.end += n;
                    return Ok(());
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }
}

impl<R: Read> CharSource for ReaderSource<R> {
    fn read(&mut self, dst: &mut [char]) -> io::Result<usize> {
        if dst.is_empty() {
            return Ok(0);
        }
        loop {
            let count = self.decode_into(dst)?;
            if count > 0 {
                return Ok(count);
            }
            if self.eof {
                if self.start < self.end {
                    return Err(io::Error::new(
                        ErrorKind::InvalidData,
                        "stream ended inside a utf-8 sequence",
                    ));
                }
                return Ok(0);
            }
            self.fill_bytes()?;
        }
    }
}
