use std::pin::Pin;

use futures::Stream;

use crate::error::InvokeError;

pub type ByteChunkStream = Pin<Box<dyn Stream<Item = Result<Vec<u8>, InvokeError>> + Send>>;
pub type SnapshotStream = Pin<Box<dyn Stream<Item = Result<String, InvokeError>> + Send>>;

/// Accumulates UTF-8 across chunk boundaries so a multi-byte character split
/// between two network reads never decodes as garbage.
#[derive(Default)]
pub struct Utf8Accumulator {
    pending: Vec<u8>,
}

impl Utf8Accumulator {
    /// Decodes as much of the buffered input as possible; an incomplete
    /// trailing sequence is held back for the next chunk.
    pub fn decode(&mut self, chunk: &[u8]) -> String {
        self.pending.extend_from_slice(chunk);
        let mut out = String::new();
        loop {
            match std::str::from_utf8(&self.pending) {
                Ok(s) => {
                    out.push_str(s);
                    self.pending.clear();
                    return out;
                }
                Err(e) => {
                    let valid = e.valid_up_to();
                    out.push_str(&String::from_utf8_lossy(&self.pending[..valid]));
                    match e.error_len() {
                        // Truly invalid bytes: replace and keep going.
                        Some(skip) => {
                            self.pending.drain(..valid + skip);
                            out.push(char::REPLACEMENT_CHARACTER);
                        }
                        // Incomplete sequence at the end of the buffer.
                        None => {
                            self.pending.drain(..valid);
                            return out;
                        }
                    }
                }
            }
        }
    }

    /// Call once at end of stream. A dangling partial sequence at that point
    /// is decoded lossily rather than dropped.
    pub fn flush(&mut self) -> String {
        if self.pending.is_empty() {
            return String::new();
        }
        let tail = String::from_utf8_lossy(&self.pending).into_owned();
        self.pending.clear();
        tail
    }
}

/// How the completion text arrives from the transport, chosen once per
/// response.
pub enum CompletionBody {
    /// Incremental reads; one growing snapshot per decoded chunk.
    Streamed(ByteChunkStream),
    /// The whole body in one piece; exactly one snapshot.
    Whole(Vec<u8>),
}

/// Content types the runtime uses when it streams the completion. Anything
/// else is read as a whole body.
pub(crate) fn prefers_incremental(content_type: Option<&str>) -> bool {
    matches!(content_type, Some(ct)
        if ct.starts_with("text/event-stream") || ct.starts_with("application/octet-stream"))
}

impl CompletionBody {
    /// Monotonically growing full-text snapshots: every item carries the
    /// entire completion so far, so the consumer never concatenates deltas.
    /// Chunks that decode to nothing (a partial multi-byte sequence) produce
    /// no snapshot.
    pub fn snapshots(self) -> SnapshotStream {
        Box::pin(async_stream::try_stream! {
            match self {
                CompletionBody::Whole(bytes) => {
                    let mut decoder = Utf8Accumulator::default();
                    let mut text = decoder.decode(&bytes);
                    text.push_str(&decoder.flush());
                    yield text;
                }
                CompletionBody::Streamed(stream) => {
                    let mut stream = stream;
                    let mut decoder = Utf8Accumulator::default();
                    let mut accumulated = String::new();
                    while let Some(chunk) = tokio_stream::StreamExt::next(&mut stream).await {
                        let chunk = chunk?;
                        let piece = decoder.decode(&chunk);
                        if piece.is_empty() {
                            continue;
                        }
                        accumulated.push_str(&piece);
                        yield accumulated.clone();
                    }
                    let tail = decoder.flush();
                    if !tail.is_empty() {
                        accumulated.push_str(&tail);
                        yield accumulated.clone();
                    }
                }
            }
        })
    }
}
