/// How the backend delimits events on the wire.
///
/// Neither variant is strict SSE; both are what the travel backend actually
/// emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Framing {
    /// Events are separated by a blank line (`\n\n`). Each unit is trimmed and
    /// may carry a `data:` prefix. Empty units are keep-alive pings.
    #[default]
    BlankLine,

    /// One payload per line. Only lines starting with `data: ` count; the
    /// rest (comments, `event:`, `id:`) are ignored.
    DataLine,
}

const BLANK_LINE: &str = "\n\n";
const DATA_PREFIX_LOOSE: &str = "data:";
const DATA_PREFIX: &str = "data: ";

impl Framing {
    /// Remove every complete frame from `buf` and return their payloads.
    ///
    /// Whatever follows the last delimiter stays in `buf` for the next call.
    pub(crate) fn drain_frames(self, buf: &mut String) -> Vec<String> {
        let mut out = Vec::new();
        let consumed = match self {
            Framing::BlankLine => drain_blank_line(buf, &mut out),
            Framing::DataLine => drain_data_lines(buf, &mut out),
        };
        buf.drain(..consumed);
        out
    }
}

fn drain_blank_line(buf: &str, out: &mut Vec<String>) -> usize {
    let mut start = 0;
    while let Some(rel) = buf[start..].find(BLANK_LINE) {
        let unit = buf[start..start + rel].trim();
        start += rel + BLANK_LINE.len();

        let payload = match unit.strip_prefix(DATA_PREFIX_LOOSE) {
            Some(rest) => rest.trim(),
            None => unit,
        };
        if payload.is_empty() {
            tracing::trace!("keep-alive frame");
            continue;
        }
        out.push(payload.to_string());
    }
    start
}

fn drain_data_lines(buf: &str, out: &mut Vec<String>) -> usize {
    let mut start = 0;
    while let Some(rel) = buf[start..].find('\n') {
        let line = &buf[start..start + rel];
        start += rel + 1;

        let line = line.strip_suffix('\r').unwrap_or(line);
        match line.strip_prefix(DATA_PREFIX) {
            Some(payload) if !payload.trim().is_empty() => out.push(payload.to_string()),
            Some(_) => tracing::trace!("empty data line"),
            None => {}
        }
    }
    start
}
