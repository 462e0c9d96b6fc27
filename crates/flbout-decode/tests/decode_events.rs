mod common;

use std::time::{Duration, UNIX_EPOCH};

use common::{push_plain, push_with_metadata, sample_batch, Field, Ts};
use flbout_decode::{
    BodyShape, DecodeError, DecodeStatus, Event, EventStreamDecoder, TimeEncoding, Value,
};

fn decode_all(buf: &[u8]) -> Result<Vec<Event>, DecodeError> {
    EventStreamDecoder::new(buf).collect()
}

#[test]
fn single_plain_event_then_end_of_stream() {
    let mut buf = Vec::new();
    push_plain(
        &mut buf,
        Ts::EventTime(0x5ea9_17e0, 0),
        &[("schema", Field::Int(1))],
    );

    let mut decoder = EventStreamDecoder::new(&buf);
    let first = decoder.next_event();
    assert_eq!(DecodeStatus::of(&first), DecodeStatus::Ok);
    let event = first.unwrap().unwrap();

    assert_eq!(event.timestamp.unix_seconds(), 0x5ea9_17e0);
    assert_eq!(event.record.get("schema").and_then(Value::as_i64), Some(1));
    assert_eq!(event.record.get("not-there"), None);

    let second = decoder.next_event();
    assert_eq!(DecodeStatus::of(&second), DecodeStatus::EndOfStream);
}

#[test]
fn metadata_shape_yields_only_record_map() {
    let mut buf = Vec::new();
    push_with_metadata(
        &mut buf,
        Ts::EventTime(10, 20),
        &[("tag", Field::Str("meta-only"))],
        &[("log", Field::Str("hello"))],
    );

    let events = decode_all(&buf).unwrap();
    assert_eq!(events.len(), 1);
    let event = &events[0];

    assert_eq!(event.shape, BodyShape::WithMetadata);
    assert_eq!(event.record.len(), 1);
    assert_eq!(event.record.get("log").and_then(Value::as_str), Some("hello"));
    assert_eq!(event.record.get("tag"), None);
    assert_eq!(
        event.timestamp.to_system_time(),
        Some(UNIX_EPOCH + Duration::new(10, 20))
    );
}

#[test]
fn mixed_batch_decodes_in_order() {
    let events = decode_all(&sample_batch()).unwrap();
    assert_eq!(events.len(), 3);

    let shapes: Vec<BodyShape> = events.iter().map(|e| e.shape).collect();
    assert_eq!(
        shapes,
        [BodyShape::Plain, BodyShape::WithMetadata, BodyShape::Plain]
    );

    let served = &events[1];
    assert_eq!(served.timestamp.nanoseconds(), 123_456_789);
    assert_eq!(served.record.get("status").and_then(Value::as_i64), Some(200));
    assert_eq!(served.record.get("latency").and_then(Value::as_f64), Some(0.25));
    let k8s = served
        .record
        .get("kubernetes")
        .and_then(Value::as_map)
        .expect("kubernetes should be a map");
    assert_eq!(k8s.get("pod_name").and_then(Value::as_str), Some("web-1"));
    assert_eq!(
        k8s.get("labels").and_then(Value::as_array).map(<[Value]>::len),
        Some(2)
    );
    assert_eq!(served.record.get("otlp"), None);

    let stopped = &events[2];
    assert_eq!(stopped.timestamp.encoding(), TimeEncoding::Integer);
    assert_eq!(stopped.timestamp.seconds(), 1_588_477_922);
    assert_eq!(stopped.record.get("clean"), Some(&Value::Bool(true)));
    assert_eq!(stopped.record.get("error"), Some(&Value::Nil));
    assert_eq!(
        stopped.record.get("raw").and_then(Value::as_bytes),
        Some(&[0x00, 0xff][..])
    );
}

#[test]
fn record_keys_keep_wire_order() {
    let events = decode_all(&sample_batch()).unwrap();
    let keys: Vec<String> = events[1].record.keys().map(|k| k.to_string()).collect();
    assert_eq!(keys, ["log", "status", "latency", "kubernetes"]);
}

#[test]
fn decoding_twice_is_identical() {
    let buf = sample_batch();
    let snapshot = buf.clone();

    let first = decode_all(&buf).unwrap();
    let second = decode_all(&buf).unwrap();

    assert_eq!(first, second);
    assert_eq!(buf, snapshot);
}

#[test]
fn independent_decoders_share_one_buffer() {
    let owned = sample_batch();
    let buf = owned.as_slice();
    let expected = decode_all(buf).unwrap();

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| scope.spawn(move || decode_all(buf).unwrap()))
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), expected);
        }
    });
}

#[test]
fn truncating_last_event_is_decode_error() {
    let buf = sample_batch();
    let events_before_last = 2;
    let mut boundary = EventStreamDecoder::new(&buf);
    for _ in 0..events_before_last {
        boundary.next_event().unwrap().unwrap();
    }
    let last_start = boundary.position();

    for cut in last_start + 1..buf.len() {
        let mut decoder = EventStreamDecoder::new(&buf[..cut]);
        for _ in 0..events_before_last {
            assert!(decoder.next_event().unwrap().is_some());
        }
        let result = decoder.next_event();
        assert_eq!(
            DecodeStatus::of(&result),
            DecodeStatus::DecodeError,
            "cut at {cut} should fail"
        );
        assert!(matches!(result, Err(DecodeError::OutOfBounds { .. })));
    }
}

#[test]
fn top_level_arity_three_is_decode_error() {
    let mut buf = Vec::new();
    rmp::encode::write_array_len(&mut buf, 3).unwrap();
    rmp::encode::write_uint(&mut buf, 1).unwrap();
    rmp::encode::write_map_len(&mut buf, 0).unwrap();
    rmp::encode::write_nil(&mut buf).unwrap();

    let mut decoder = EventStreamDecoder::new(&buf);
    assert!(matches!(
        decoder.next_event(),
        Err(DecodeError::UnexpectedArity {
            expected: 2,
            found: 3,
            ..
        })
    ));
}

#[test]
fn empty_buffer_is_immediately_end_of_stream() {
    let mut decoder = EventStreamDecoder::new(&[]);
    assert_eq!(decoder.next_event(), Ok(None));
    assert_eq!(decoder.next(), None);
}

#[test]
fn wide_length_encodings_are_accepted() {
    let long = "x".repeat(70_000);
    let items: Vec<Field<'_>> = (0..20).map(Field::Int).collect();
    let mut buf = Vec::new();
    push_plain(
        &mut buf,
        Ts::Seconds(u64::from(u32::MAX) + 1),
        &[("long", Field::Str(&long)), ("items", Field::Array(&items))],
    );

    let event = decode_all(&buf).unwrap().remove(0);
    assert_eq!(event.timestamp.seconds(), 4_294_967_296);
    assert_eq!(
        event.record.get("long").and_then(Value::as_str).map(str::len),
        Some(70_000)
    );
    assert_eq!(
        event.record.get("items").and_then(Value::as_array).map(<[Value]>::len),
        Some(20)
    );
}

#[test]
fn record_converts_to_json() {
    let events = decode_all(&sample_batch()).unwrap();
    assert_eq!(
        events[1].record.to_json(),
        serde_json::json!({
            "log": "request served",
            "status": 200,
            "latency": 0.25,
            "kubernetes": {"pod_name": "web-1", "labels": ["a", "b"]}
        })
    );
}

/// Event written with an `array32` outer header:
///
/// ```text
/// 0      5    6    7          11         15
/// dd 00 00 00 02 | d7 | 00 | 5e a9 17 e0 | 00 00 00 00 | 80
/// ```
#[test]
fn event_time_payload_offsets_are_pinned() {
    let mut buf = vec![0xdd, 0x00, 0x00, 0x00, 0x02];
    buf.extend_from_slice(&[0xd7, 0x00]);
    buf.extend_from_slice(&0x5ea9_17e0u32.to_be_bytes());
    buf.extend_from_slice(&7u32.to_be_bytes());
    buf.push(0x80);

    let manual_seconds = u32::from_be_bytes(buf[7..11].try_into().unwrap());
    let manual_subseconds = u32::from_be_bytes(buf[11..15].try_into().unwrap());

    let event = decode_all(&buf).unwrap().remove(0);
    assert_eq!(event.timestamp.seconds(), i64::from(manual_seconds));
    assert_eq!(event.timestamp.nanoseconds(), manual_subseconds);
    assert_eq!(event.timestamp.seconds(), 0x5ea9_17e0);
    assert_eq!(event.timestamp.nanoseconds(), 7);
    assert_eq!(
        event.timestamp.encoding(),
        TimeEncoding::EventTime { ext_type: 0 }
    );
}

#[test]
fn nested_timestamp_array_is_not_reinterpreted() {
    // [[fixext8, {}], {}] with array32 headers. Fluent Bit v2 can emit this
    // header-first layout; only `[ts, map]` and `[ts, [meta, map]]` are read,
    // so it must fail at the timestamp instead of being guessed at.
    let mut buf = vec![0xdd, 0x00, 0x00, 0x00, 0x02];
    buf.extend_from_slice(&[0xdd, 0x00, 0x00, 0x00, 0x02]);
    buf.extend_from_slice(&[0xd7, 0x00, 0x64, 0xa4, 0x6b, 0xaa, 0x01, 0x9b, 0xfc, 0xc0]);
    buf.push(0x80);
    buf.push(0x80);

    let err = decode_all(&buf).unwrap_err();
    assert_eq!(
        err,
        DecodeError::UnexpectedType {
            context: "timestamp",
            tag: 0xdd,
            offset: 5
        }
    );
}
