//! Scrubbed upload buffer
//!
//! Request bodies are collected into an [`UploadBuffer`] that zeroes every
//! allocation it owned, both on an explicit [`UploadBuffer::scrub`] and on drop.

use std::fmt::Display;

use chrono::{DateTime, Utc};
use http_body_util::BodyExt;
use hyper::body::{Body, Bytes};

use crate::error::UploadError;

/// Upper bound on capacity reserved up front from a body's size hint
const PREALLOC_LIMIT: u64 = 8 * 1024 * 1024;

/// Per-request in-memory copy of an upload body
pub struct UploadBuffer {
    bytes: Vec<u8>,
    created_at: DateTime<Utc>,
}

impl UploadBuffer {
    pub fn new() -> Self {
        Self::with_created_at(Utc::now())
    }

    pub const fn with_created_at(created_at: DateTime<Utc>) -> Self {
        Self {
            bytes: Vec::new(),
            created_at,
        }
    }

    /// Read an entire request body into a new buffer.
    ///
    /// The buffer is stamped with the time the last frame arrived. On a read
    /// error the partially filled buffer is dropped, which zeroes it.
    pub async fn drain<B>(mut body: B) -> Result<Self, UploadError>
    where
        B: Body<Data = Bytes> + Unpin,
        B::Error: Display,
    {
        let mut buffer = Self::new();
        let hint = body.size_hint().exact().unwrap_or_else(|| body.size_hint().lower());
        buffer.bytes.reserve(usize::try_from(hint.min(PREALLOC_LIMIT)).unwrap_or(0));

        while let Some(frame) = body.frame().await {
            let frame = frame.map_err(|e| UploadError::BodyRead(e.to_string()))?;
            if let Ok(data) = frame.into_data() {
                buffer.extend(&data);
            }
        }
        buffer.created_at = Utc::now();
        Ok(buffer)
    }

    /// Append bytes, zeroing the old allocation whenever the buffer grows
    pub fn extend(&mut self, data: &[u8]) {
        let needed = self.bytes.len() + data.len();
        if needed > self.bytes.capacity() {
            let mut grown = Vec::with_capacity(needed.max(self.bytes.capacity() * 2));
            grown.extend_from_slice(&self.bytes);
            wipe(&mut self.bytes);
            self.bytes = grown;
        }
        self.bytes.extend_from_slice(data);
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Zero the contents and release the allocation
    pub fn scrub(&mut self) {
        wipe(&mut self.bytes);
        self.bytes = Vec::new();
    }
}

impl Default for UploadBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for UploadBuffer {
    fn drop(&mut self) {
        wipe(&mut self.bytes);
    }
}

impl std::fmt::Debug for UploadBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadBuffer")
            .field("len", &self.bytes.len())
            .field("created_at", &self.created_at)
            .finish_non_exhaustive()
    }
}

fn wipe(bytes: &mut Vec<u8>) {
    bytes.fill(0);
    // Keep the zeroing store from being optimized away
    std::hint::black_box(bytes.as_mut_slice());
    bytes.clear();
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::Full;
    use hyper::body::Frame;
    use std::collections::VecDeque;
    use std::future::Future;
    use std::pin::Pin;
    use std::time::Duration;
    use std::task::{Context, Poll};

    /// Body yielding pre-baked frames, optionally failing part way
    struct Chunks(VecDeque<Result<Bytes, &'static str>>);

    /// Body whose frames each arrive after a delay
    struct Trickle {
        delay: Duration,
        sleep: Option<Pin<Box<tokio::time::Sleep>>>,
        chunks: VecDeque<Bytes>,
    }

    impl Body for Trickle {
        type Data = Bytes;
        type Error = &'static str;

        fn poll_frame(
            self: Pin<&mut Self>,
            cx: &mut Context<'_>,
        ) -> Poll<Option<Result<Frame<Bytes>, Self::Error>>> {
            let this = self.get_mut();
            if this.chunks.is_empty() {
                return Poll::Ready(None);
            }
            let delay = this.delay;
            let sleep = this
                .sleep
                .get_or_insert_with(|| Box::pin(tokio::time::sleep(delay)));
            if sleep.as_mut().poll(cx).is_pending() {
                return Poll::Pending;
            }
            this.sleep = None;
            Poll::Ready(this.chunks.pop_front().map(|chunk| Ok(Frame::data(chunk))))
        }
    }

    impl Body for Chunks {
        type Data = Bytes;
        type Error = &'static str;

        fn poll_frame(
            mut self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
        ) -> Poll<Option<Result<Frame<Bytes>, Self::Error>>> {
            Poll::Ready(self.0.pop_front().map(|chunk| chunk.map(Frame::data)))
        }
    }

    #[tokio::test]
    async fn test_drain_full_body() {
        let buffer = UploadBuffer::drain(Full::new(Bytes::from_static(b"\x01\x02\x03")))
            .await
            .unwrap();
        assert_eq!(buffer.as_bytes(), &[1, 2, 3]);
        assert_eq!(buffer.len(), 3);
    }

    #[tokio::test]
    async fn test_drain_multiple_frames() {
        let body = Chunks(VecDeque::from(vec![
            Ok(Bytes::from_static(b"abc")),
            Ok(Bytes::from_static(b"")),
            Ok(Bytes::from_static(b"defgh")),
        ]));
        let buffer = UploadBuffer::drain(body).await.unwrap();
        assert_eq!(buffer.as_bytes(), b"abcdefgh");
    }

    #[tokio::test]
    async fn test_drain_stamps_completion_time() {
        let body = Trickle {
            delay: Duration::from_millis(150),
            sleep: None,
            chunks: VecDeque::from(vec![Bytes::from_static(b"ab"), Bytes::from_static(b"cd")]),
        };

        let started = Utc::now();
        let buffer = UploadBuffer::drain(body).await.unwrap();
        let finished = Utc::now();

        assert_eq!(buffer.as_bytes(), b"abcd");
        assert!(buffer.created_at() >= started + chrono::Duration::milliseconds(300));
        assert!(buffer.created_at() <= finished);
    }

    #[tokio::test]
    async fn test_drain_empty_body() {
        let buffer = UploadBuffer::drain(Full::new(Bytes::new())).await.unwrap();
        assert!(buffer.is_empty());
    }

    #[tokio::test]
    async fn test_drain_read_error() {
        let body = Chunks(VecDeque::from(vec![
            Ok(Bytes::from_static(b"partial")),
            Err("connection reset"),
        ]));
        let err = UploadBuffer::drain(body).await.unwrap_err();
        assert!(matches!(err, UploadError::BodyRead(ref m) if m.contains("connection reset")));
    }

    #[test]
    fn test_extend_grows() {
        let mut buffer = UploadBuffer::new();
        for chunk in [&b"ab"[..], b"cdef", b"g", b"hijklmnop"] {
            buffer.extend(chunk);
        }
        assert_eq!(buffer.as_bytes(), b"abcdefghijklmnop");
    }

    #[test]
    fn test_scrub_clears() {
        let mut buffer = UploadBuffer::new();
        buffer.extend(b"secret payload");
        buffer.scrub();
        assert!(buffer.is_empty());
        assert_eq!(buffer.as_bytes(), b"");

        // Scrubbing twice is harmless
        buffer.scrub();
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_debug_hides_contents() {
        let mut buffer = UploadBuffer::new();
        buffer.extend(b"hunter2");
        let debug = format!("{buffer:?}");
        assert!(debug.contains("len: 7"));
        assert!(!debug.contains("hunter2"));
    }
}
