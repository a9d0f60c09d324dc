use bytes::Bytes;
use http_body::{Frame, SizeHint};
use std::convert::Infallible;
use std::fmt;
use std::io::{self, Read, Seek, SeekFrom};
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

#[derive(Clone, PartialEq, Eq)]
enum Payload {
    Raw(Bytes),
    Text(Arc<str>),
}

impl Payload {
    fn as_bytes(&self) -> &[u8] {
        match self {
            Payload::Raw(bytes) => bytes,
            Payload::Text(text) => text.as_bytes(),
        }
    }
}

///
/// A replayable response body.
///
/// The payload is shared between clones while every clone keeps its own read
/// cursor, so one registered response can answer any number of requests,
/// concurrently, without the readers stepping on each other.
///
/// Reading the body to exhaustion rewinds the cursor: after a read returns
/// `0`, the next read starts over from the first byte.
///
/// ## Example
///
/// ```
/// use std::io::Read;
///
/// let mut body = intercepto::Body::from("hello");
///
/// let mut first = String::new();
/// body.read_to_string(&mut first).unwrap();
///
/// let mut second = String::new();
/// body.read_to_string(&mut second).unwrap();
///
/// assert_eq!("hello", first);
/// assert_eq!("hello", second);
/// ```
///
#[derive(Clone, PartialEq, Eq)]
pub struct Body {
    payload: Payload,
    position: usize,
}

impl Body {
    /// A body without content.
    pub fn empty() -> Self {
        Self::from_bytes(Bytes::new())
    }

    /// A body replaying the given text.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            payload: Payload::Text(Arc::from(text.into())),
            position: 0,
        }
    }

    /// A body replaying the given bytes.
    pub fn from_bytes(bytes: impl Into<Bytes>) -> Self {
        Self {
            payload: Payload::Raw(bytes.into()),
            position: 0,
        }
    }

    /// The size of the whole payload, regardless of the cursor.
    pub fn len(&self) -> usize {
        self.payload.as_bytes().len()
    }

    /// Whether the payload is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The whole payload, regardless of the cursor.
    pub fn as_bytes(&self) -> &[u8] {
        self.payload.as_bytes()
    }

    /// The whole payload as text, when it is valid UTF-8.
    pub fn as_str(&self) -> Option<&str> {
        match &self.payload {
            Payload::Text(text) => Some(text),
            Payload::Raw(bytes) => std::str::from_utf8(bytes).ok(),
        }
    }

    /// The current cursor position.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Moves the cursor back to the first byte.
    pub fn rewind(&mut self) {
        self.position = 0;
    }

    ///
    /// Returns a fresh body over the same payload with its cursor at the
    /// first byte. This is what responders hand out for every request.
    ///
    pub fn replay(&self) -> Self {
        Self {
            payload: self.payload.clone(),
            position: 0,
        }
    }

    fn remaining(&self) -> &[u8] {
        self.as_bytes().get(self.position..).unwrap_or(&[])
    }
}

impl Default for Body {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut debug = f.debug_struct("Body");
        match &self.payload {
            Payload::Text(text) => debug.field("text", text),
            Payload::Raw(bytes) => debug.field("bytes", bytes),
        };
        debug.field("position", &self.position).finish()
    }
}

impl From<&str> for Body {
    fn from(value: &str) -> Self {
        Self::from_text(value)
    }
}

impl From<String> for Body {
    fn from(value: String) -> Self {
        Self::from_text(value)
    }
}

impl From<Vec<u8>> for Body {
    fn from(value: Vec<u8>) -> Self {
        Self::from_bytes(value)
    }
}

impl From<&[u8]> for Body {
    fn from(value: &[u8]) -> Self {
        Self::from_bytes(Bytes::copy_from_slice(value))
    }
}

impl From<Bytes> for Body {
    fn from(value: Bytes) -> Self {
        Self::from_bytes(value)
    }
}

impl Read for Body {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let remaining = self.remaining();
        if remaining.is_empty() {
            self.rewind();
            return Ok(0);
        }

        let read = remaining.len().min(buf.len());
        buf[..read].copy_from_slice(&remaining[..read]);
        self.position += read;

        Ok(read)
    }
}

impl Seek for Body {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let target = match pos {
            SeekFrom::Start(offset) => Some(offset),
            SeekFrom::End(offset) => (self.len() as u64).checked_add_signed(offset),
            SeekFrom::Current(offset) => (self.position as u64).checked_add_signed(offset),
        };

        let target = target
            .and_then(|target| usize::try_from(target).ok())
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::InvalidInput,
                    "invalid seek to a negative or overflowing position",
                )
            })?;

        self.position = target;
        Ok(target as u64)
    }
}

impl http_body::Body for Body {
    type Data = Bytes;
    type Error = Infallible;

    fn poll_frame(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        let this = self.get_mut();
        if this.position >= this.len() {
            this.rewind();
            return Poll::Ready(None);
        }

        let chunk = match &this.payload {
            Payload::Raw(bytes) => bytes.slice(this.position..),
            Payload::Text(text) => Bytes::copy_from_slice(&text.as_bytes()[this.position..]),
        };
        this.position = this.len();

        Poll::Ready(Some(Ok(Frame::data(chunk))))
    }

    fn is_end_stream(&self) -> bool {
        self.position >= self.len()
    }

    fn size_hint(&self) -> SizeHint {
        SizeHint::with_exact(self.remaining().len() as u64)
    }
}
