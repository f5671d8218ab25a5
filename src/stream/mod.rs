//! Incremental reader for the backend's event streams.
//!
//! The backend answers plan, chat and guide requests with a long-lived body
//! of JSON events. Bytes arrive in arbitrary pieces; [`StreamEventReader`]
//! reassembles them into [`StreamEvent`]s and [`pump`] drives a reader from
//! an async body.

mod decoder;
mod event;
mod framing;
mod pump;
mod reader;

pub use decoder::Utf8Decoder;
pub use event::{classify, parse_frame, StreamEvent};
pub use framing::Framing;
pub use pump::pump;
pub use reader::{FinalResult, StreamEventReader};
