//! Fixture encoders for decoder integration tests.

#![allow(dead_code)]

use rmp::encode;

/// A record field value to encode.
#[derive(Clone, Copy)]
pub enum Field<'a> {
    Str(&'a str),
    Int(i64),
    Float(f64),
    Bool(bool),
    Nil,
    Bin(&'a [u8]),
    Array(&'a [Field<'a>]),
    Map(&'a [(&'a str, Field<'a>)]),
}

/// Encoding used for the event timestamp.
#[derive(Clone, Copy)]
pub enum Ts {
    /// `fixext8` with type 0: seconds + nanoseconds.
    EventTime(u32, u32),
    /// Plain integer seconds.
    Seconds(u64),
}

pub fn write_ts(buf: &mut Vec<u8>, ts: Ts) {
    match ts {
        Ts::EventTime(seconds, nanoseconds) => {
            encode::write_ext_meta(buf, 8, 0).unwrap();
            buf.extend_from_slice(&seconds.to_be_bytes());
            buf.extend_from_slice(&nanoseconds.to_be_bytes());
        }
        Ts::Seconds(seconds) => {
            encode::write_uint(buf, seconds).unwrap();
        }
    }
}

pub fn write_field(buf: &mut Vec<u8>, field: &Field<'_>) {
    match field {
        Field::Str(s) => encode::write_str(buf, s).unwrap(),
        Field::Int(n) => {
            encode::write_sint(buf, *n).unwrap();
        }
        Field::Float(v) => encode::write_f64(buf, *v).unwrap(),
        Field::Bool(b) => encode::write_bool(buf, *b).unwrap(),
        Field::Nil => encode::write_nil(buf).unwrap(),
        Field::Bin(b) => encode::write_bin(buf, b).unwrap(),
        Field::Array(items) => {
            encode::write_array_len(buf, items.len() as u32).unwrap();
            for item in items.iter() {
                write_field(buf, item);
            }
        }
        Field::Map(entries) => write_map(buf, entries),
    }
}

pub fn write_map(buf: &mut Vec<u8>, entries: &[(&str, Field<'_>)]) {
    encode::write_map_len(buf, entries.len() as u32).unwrap();
    for (key, value) in entries {
        encode::write_str(buf, key).unwrap();
        write_field(buf, value);
    }
}

/// Append `[ts, record]`.
pub fn push_plain(buf: &mut Vec<u8>, ts: Ts, record: &[(&str, Field<'_>)]) {
    encode::write_array_len(buf, 2).unwrap();
    write_ts(buf, ts);
    write_map(buf, record);
}

/// Append `[ts, [metadata, record]]`.
pub fn push_with_metadata(
    buf: &mut Vec<u8>,
    ts: Ts,
    metadata: &[(&str, Field<'_>)],
    record: &[(&str, Field<'_>)],
) {
    encode::write_array_len(buf, 2).unwrap();
    write_ts(buf, ts);
    encode::write_array_len(buf, 2).unwrap();
    write_map(buf, metadata);
    write_map(buf, record);
}

/// A small batch mixing both body shapes and both timestamp encodings.
pub fn sample_batch() -> Vec<u8> {
    let mut buf = Vec::new();
    push_plain(
        &mut buf,
        Ts::EventTime(0x5ea9_17e0, 0),
        &[("schema", Field::Int(1)), ("log", Field::Str("started"))],
    );
    push_with_metadata(
        &mut buf,
        Ts::EventTime(0x5ea9_17e1, 123_456_789),
        &[("otlp", Field::Map(&[("trace_id", Field::Str("abc"))]))],
        &[
            ("log", Field::Str("request served")),
            ("status", Field::Int(200)),
            ("latency", Field::Float(0.25)),
            (
                "kubernetes",
                Field::Map(&[
                    ("pod_name", Field::Str("web-1")),
                    ("labels", Field::Array(&[Field::Str("a"), Field::Str("b")])),
                ]),
            ),
        ],
    );
    push_plain(
        &mut buf,
        Ts::Seconds(1_588_477_922),
        &[
            ("log", Field::Str("stopped")),
            ("clean", Field::Bool(true)),
            ("error", Field::Nil),
            ("raw", Field::Bin(&[0x00, 0xff])),
        ],
    );
    buf
}
