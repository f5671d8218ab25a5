//! End-to-end behaviour of the stream reader over whole bodies.

use tripstream::stream::{pump, FinalResult, Framing, StreamEvent, StreamEventReader};
use tripstream::StreamError;

fn chunk(text: &str) -> StreamEvent {
    StreamEvent::Chunk {
        text: text.to_string(),
    }
}

/// Feed `parts` one at a time and return every event plus the final result.
fn run(framing: Framing, parts: &[&[u8]]) -> (Vec<StreamEvent>, FinalResult) {
    let mut reader = StreamEventReader::new(framing);
    let mut events = Vec::new();
    for part in parts {
        events.extend(reader.process(part));
    }
    (events, reader.finish())
}

const SCENARIO_A: &str =
    "data: {\"chunk\":\"Hel\"}\n\ndata: {\"chunk\":\"lo\"}\n\ndata: {\"done\":true}\n\n";

#[test]
fn test_chunks_then_done() {
    for framing in [Framing::BlankLine, Framing::DataLine] {
        let (events, result) = run(framing, &[SCENARIO_A.as_bytes()]);
        assert_eq!(events, vec![chunk("Hel"), chunk("lo"), StreamEvent::Done]);
        assert_eq!(result.accumulated_text, "Hello");
        assert!(result.done);
    }
}

#[test]
fn test_info_result_only_after_end() {
    let body = "{\"info_collection_result\":\"trip facts\"}\n\n{\"chunk\":\"Day 1...\"}\n\n";
    let (events, result) = run(Framing::BlankLine, &[body.as_bytes()]);
    assert_eq!(events, vec![chunk("Day 1...")]);
    assert_eq!(result.info_result.as_deref(), Some("trip facts"));
    assert!(!result.done);
}

#[test]
fn test_error_stops_the_same_delivery() {
    let body = "data: {\"error\":\"quota exceeded\"}\n\ndata: {\"chunk\":\"late\"}\n\n";
    let mut reader = StreamEventReader::new(Framing::DataLine);
    assert_eq!(
        reader.process(body.as_bytes()),
        vec![StreamEvent::Error {
            message: "quota exceeded".into()
        }]
    );
    assert!(reader.process(b"data: {\"chunk\":\"later\"}\n").is_empty());

    let result = reader.finish();
    assert_eq!(result.error.as_deref(), Some("quota exceeded"));
    assert!(result.accumulated_text.is_empty());
}

#[test]
fn test_empty_units_are_pings() {
    let body = "{\"chunk\":\"a\"}\n\n\n\n{\"chunk\":\"b\"}\n\n\n\n";
    let (events, _) = run(Framing::BlankLine, &[body.as_bytes()]);
    assert_eq!(events, vec![chunk("a"), chunk("b")]);

    let body = "data: {\"chunk\":\"a\"}\n\n\n: keep-alive\ndata: {\"chunk\":\"b\"}\n";
    let (events, _) = run(Framing::DataLine, &[body.as_bytes()]);
    assert_eq!(events, vec![chunk("a"), chunk("b")]);
}

#[test]
fn test_any_split_point_gives_same_events() {
    let body = "data: {\"chunk\":\"Día 1: 西安 🏯\"}\n\n\
                {\"info_collection_result\":\"2 位旅客\"}\n\n\
                data: {\"chunk\":\"兵马俑\"}\n\n\
                data: {\"done\":true}\n\n";
    let bytes = body.as_bytes();

    for framing in [Framing::BlankLine, Framing::DataLine] {
        let whole = run(framing, &[bytes]);
        assert_eq!(whole.1.accumulated_text, "Día 1: 西安 🏯兵马俑");

        for i in 0..=bytes.len() {
            let split = run(framing, &[&bytes[..i], &bytes[i..]]);
            assert_eq!(split, whole, "split at byte {i} ({framing:?})");
        }

        let singles: Vec<&[u8]> = bytes.chunks(1).collect();
        assert_eq!(run(framing, &singles), whole, "byte at a time ({framing:?})");
    }
}

#[test]
fn test_malformed_and_unknown_frames_are_skipped() {
    let body = "{\"chunk\":\"a\"}\n\nnot json\n\n{\"mood\":\"sunny\"}\n\n[1,2]\n\n{\"chunk\":\"b\"}\n\n";
    let (events, result) = run(Framing::BlankLine, &[body.as_bytes()]);
    assert_eq!(events, vec![chunk("a"), chunk("b")]);
    assert!(result.error.is_none());
}

#[test]
fn test_multiple_fields_resolve_by_precedence() {
    let body = "data: {\"chunk\":\"c\",\"error\":\"e\"}\n\
                data: {\"done\":false,\"error\":\"e2\"}\n";
    let (events, result) = run(Framing::DataLine, &[body.as_bytes()]);
    assert_eq!(
        events,
        vec![chunk("c"), StreamEvent::Error { message: "e2".into() }]
    );
    assert_eq!(result.accumulated_text, "c");
    assert_eq!(result.error.as_deref(), Some("e2"));
}

#[test]
fn test_truncated_tail_is_dropped() {
    let (events, result) = run(Framing::BlankLine, &[b"{\"chunk\":\"a\"}\n\n{\"chunk\":\"b".as_slice()]);
    assert_eq!(events, vec![chunk("a")]);
    assert_eq!(result.accumulated_text, "a");
    assert!(!result.done);
}

#[tokio::test]
async fn test_pump_reports_transport_failure() {
    let items: Vec<Result<&'static [u8], std::io::Error>> = vec![
        Ok(b"data: {\"chunk\":\"par\"}\n".as_slice()),
        Err(std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset")),
    ];
    let mut seen = Vec::new();
    let err = pump(
        tokio_stream::iter(items),
        StreamEventReader::new(Framing::DataLine),
        |ev| seen.push(ev),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, StreamError::Transport(_)));
    assert_eq!(seen, vec![chunk("par")]);
}

#[tokio::test]
async fn test_pump_withholds_info_after_error() {
    let items: Vec<Result<&'static [u8], std::io::Error>> = vec![
        Ok(b"{\"info_collection_result\":\"facts\"}\n\n".as_slice()),
        Ok(b"{\"error\":\"planner offline\"}\n\n".as_slice()),
    ];
    let mut seen = Vec::new();
    let result = pump(
        tokio_stream::iter(items),
        StreamEventReader::new(Framing::BlankLine),
        |ev| seen.push(ev),
    )
    .await
    .unwrap();

    assert_eq!(
        seen,
        vec![StreamEvent::Error {
            message: "planner offline".into()
        }]
    );
    assert!(result.is_error());
}
