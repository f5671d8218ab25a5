/// Incremental UTF-8 decoder.
///
/// Network chunks can end in the middle of a multi-byte character. The
/// incomplete tail is kept and prepended to the next chunk. Invalid sequences
/// are replaced with U+FFFD instead of failing the stream.
#[derive(Debug, Default)]
pub struct Utf8Decoder {
    pending: Vec<u8>,
}

impl Utf8Decoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode as much of `input` as possible.
    pub fn decode(&mut self, input: &[u8]) -> String {
        let mut bytes = std::mem::take(&mut self.pending);
        bytes.extend_from_slice(input);

        let mut out = String::with_capacity(bytes.len());
        let mut rest = bytes.as_slice();

        loop {
            match std::str::from_utf8(rest) {
                Ok(s) => {
                    out.push_str(s);
                    break;
                }
                Err(e) => {
                    let (valid, after) = rest.split_at(e.valid_up_to());
                    // `valid` was checked above, so this never substitutes.
                    out.push_str(&String::from_utf8_lossy(valid));

                    match e.error_len() {
                        Some(n) => {
                            out.push(char::REPLACEMENT_CHARACTER);
                            rest = &after[n..];
                        }
                        None => {
                            // Truncated sequence at the end; wait for more bytes.
                            self.pending = after.to_vec();
                            break;
                        }
                    }
                }
            }
        }

        out
    }

    /// True when an incomplete multi-byte sequence is still buffered.
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Number of buffered bytes, for diagnostics.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}
