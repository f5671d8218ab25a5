use super::{FinalResult, StreamEvent, StreamEventReader};
use crate::error::{BoxError, StreamError};
use futures_core::Stream;
use tokio_stream::StreamExt;

/// Drive a response body through `reader`, calling `on_event` per event.
///
/// The body is always read to its end, even after a terminal event, so the
/// connection is released cleanly. The cached `InfoResult` (if any) is passed
/// to `on_event` once, after the body ends, unless the stream reported an
/// error. A failing read aborts with [`StreamError::Transport`].
pub async fn pump<S, B, E, F>(
    mut body: S,
    mut reader: StreamEventReader,
    mut on_event: F,
) -> Result<FinalResult, StreamError>
where
    S: Stream<Item = Result<B, E>> + Unpin,
    B: AsRef<[u8]>,
    E: Into<BoxError>,
    F: FnMut(StreamEvent),
{
    while let Some(item) = body.next().await {
        let bytes = item.map_err(|e| StreamError::Transport(e.into()))?;
        for event in reader.process(bytes.as_ref()) {
            on_event(event);
        }
    }

    let result = reader.finish();
    if !result.is_error() {
        if let Some(text) = &result.info_result {
            on_event(StreamEvent::InfoResult { text: text.clone() });
        }
    }

    tracing::debug!(
        chars = result.accumulated_text.chars().count(),
        done = result.done,
        error = result.error.is_some(),
        "stream finished"
    );
    Ok(result)
}
