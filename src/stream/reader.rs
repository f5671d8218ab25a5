use super::decoder::Utf8Decoder;
use super::event::{self, StreamEvent};
use super::framing::Framing;

/// What a stream amounted to once the transport ended.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FinalResult {
    /// Concatenation of every `Chunk` text, in order.
    pub accumulated_text: String,
    /// The side-channel payload, if the producer sent one.
    pub info_result: Option<String>,
    /// An explicit `done` marker was seen.
    pub done: bool,
    /// Message of the in-band `Error`, if one was seen.
    pub error: Option<String>,
}

impl FinalResult {
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReaderState {
    Streaming,
    Done,
    Failed,
}

/// Turns raw response-body chunks into ordered [`StreamEvent`]s.
///
/// One reader per request: it owns its buffer and accumulated text and is
/// consumed by [`finish`](Self::finish). Chunk boundaries do not matter; a
/// frame split over several calls is emitted once its delimiter arrives.
///
/// `InfoResult` frames are never returned from [`process`](Self::process).
/// They are cached and handed back in the [`FinalResult`].
#[derive(Debug)]
pub struct StreamEventReader {
    framing: Framing,
    decoder: Utf8Decoder,
    buffer: String,
    accumulated: String,
    info_result: Option<String>,
    error: Option<String>,
    state: ReaderState,
}

impl StreamEventReader {
    pub fn new(framing: Framing) -> Self {
        Self {
            framing,
            decoder: Utf8Decoder::new(),
            buffer: String::new(),
            accumulated: String::new(),
            info_result: None,
            error: None,
            state: ReaderState::Streaming,
        }
    }

    pub fn framing(&self) -> Framing {
        self.framing
    }

    /// Text of all chunks seen so far.
    pub fn accumulated_text(&self) -> &str {
        &self.accumulated
    }

    /// True once `Done` or `Error` has been emitted. Further input is
    /// accepted (so the transport can be drained) but ignored.
    pub fn is_closed(&self) -> bool {
        self.state != ReaderState::Streaming
    }

    /// Feed one transport chunk and return the events it completed.
    pub fn process(&mut self, raw: &[u8]) -> Vec<StreamEvent> {
        if self.is_closed() {
            tracing::trace!(bytes = raw.len(), "draining input after terminal event");
            return Vec::new();
        }

        let text = self.decoder.decode(raw);
        self.buffer.push_str(&text);

        let mut events = Vec::new();
        for payload in self.framing.drain_frames(&mut self.buffer) {
            let event = match event::parse_frame(&payload) {
                Ok(Some(ev)) => ev,
                Ok(None) => {
                    tracing::debug!(%payload, "ignoring unrecognized event");
                    continue;
                }
                Err(e) => {
                    tracing::warn!(error = %e, %payload, "discarding malformed frame");
                    continue;
                }
            };

            match event {
                StreamEvent::InfoResult { text } => {
                    if self.info_result.is_some() {
                        tracing::debug!("replacing earlier info result");
                    }
                    self.info_result = Some(text);
                }
                StreamEvent::Chunk { ref text } => {
                    self.accumulated.push_str(text);
                    events.push(event);
                }
                StreamEvent::Done => {
                    self.state = ReaderState::Done;
                    events.push(event);
                    break;
                }
                StreamEvent::Error { ref message } => {
                    self.error = Some(message.clone());
                    self.state = ReaderState::Failed;
                    events.push(event);
                    break;
                }
            }
        }

        if self.is_closed() {
            self.buffer.clear();
        }
        events
    }

    /// Close the reader once the transport reports end-of-stream.
    pub fn finish(self) -> FinalResult {
        if !self.is_closed() && (!self.buffer.trim().is_empty() || self.decoder.has_pending()) {
            tracing::warn!(
                buffered = self.buffer.len(),
                pending_bytes = self.decoder.pending_len(),
                "stream ended mid-frame; discarding tail"
            );
        }

        FinalResult {
            accumulated_text: self.accumulated,
            info_result: self.info_result,
            done: self.state == ReaderState::Done,
            error: self.error,
        }
    }
}
