use std::iter::FusedIterator;

use bytes::Bytes;
use rmp::Marker;
use tracing::{debug, trace};

use crate::config::{DecoderConfig, DuplicateKeys, Utf8Mode};
use crate::cursor::BufferCursor;
use crate::error::{DecodeError, Result};
use crate::event::{BodyShape, Event};
use crate::time::EventTime;
use crate::value::{Key, Record, Value};

/// Arity of the outer event array and of the metadata body.
const EVENT_ARITY: usize = 2;

/// EventTime payload: seconds (4B BE) + nanoseconds (4B BE).
const EVENT_TIME_LEN: usize = 8;

/// Outcome of a single decode step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeStatus {
    /// A complete event was decoded.
    Ok,
    /// The buffer is consumed; no event is pending.
    EndOfStream,
    /// The input is malformed. The stream must not be read further.
    DecodeError,
}

impl DecodeStatus {
    pub fn of<T>(result: &Result<Option<T>>) -> Self {
        match result {
            Ok(Some(_)) => DecodeStatus::Ok,
            Ok(None) => DecodeStatus::EndOfStream,
            Err(_) => DecodeStatus::DecodeError,
        }
    }
}

/// A tag byte together with the length or scalar it introduces.
#[derive(Debug, Clone, Copy)]
enum Kind {
    Nil,
    Bool(bool),
    Int(i64),
    UInt(u64),
    F32(f32),
    F64(f64),
    Str(usize),
    Bin(usize),
    Array(usize),
    Map(usize),
    Ext(usize),
}

#[derive(Debug, Clone, Copy)]
struct Header {
    tag: u8,
    offset: usize,
    kind: Kind,
}

impl Header {
    fn unexpected(&self, context: &'static str) -> DecodeError {
        DecodeError::UnexpectedType {
            context,
            tag: self.tag,
            offset: self.offset,
        }
    }
}

/// Decodes Fluent Bit events one at a time from a borrowed batch.
///
/// After the first error the decoder is poisoned: [`next_event`] keeps
/// returning [`DecodeError::Poisoned`] and the iterator yields `None`.
///
/// [`next_event`]: EventStreamDecoder::next_event
#[derive(Debug, Clone)]
pub struct EventStreamDecoder<'a> {
    cursor: BufferCursor<'a>,
    config: DecoderConfig,
    failed: bool,
}

impl<'a> EventStreamDecoder<'a> {
    /// Create a decoder over `buf` with default configuration.
    pub fn new(buf: &'a [u8]) -> Self {
        Self::with_config(buf, DecoderConfig::default())
    }

    /// Create a decoder over `buf` with explicit configuration.
    pub fn with_config(buf: &'a [u8], config: DecoderConfig) -> Self {
        Self::from_cursor(BufferCursor::new(buf), config)
    }

    /// Continue decoding from an existing cursor position.
    pub fn from_cursor(cursor: BufferCursor<'a>, config: DecoderConfig) -> Self {
        Self {
            cursor,
            config,
            failed: false,
        }
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Offset of the next unread byte.
    pub fn position(&self) -> usize {
        self.cursor.position()
    }

    pub fn remaining(&self) -> usize {
        self.cursor.remaining()
    }

    pub fn is_poisoned(&self) -> bool {
        self.failed
    }

    /// Decode the next event.
    ///
    /// Returns `Ok(None)` once the buffer is cleanly exhausted.
    pub fn next_event(&mut self) -> Result<Option<Event>> {
        if self.failed {
            return Err(DecodeError::Poisoned);
        }
        let result = self.decode_event();
        if result.is_err() {
            self.failed = true;
        }
        result
    }

    fn decode_event(&mut self) -> Result<Option<Event>> {
        if self.cursor.remaining() == 0 {
            debug!(offset = self.cursor.position(), "end of event stream");
            return Ok(None);
        }

        let start = self.cursor.position();
        let depth = self.enter(0)?;
        let header = self.read_header()?;
        match header.kind {
            Kind::Array(EVENT_ARITY) => {}
            Kind::Array(found) => {
                return Err(DecodeError::UnexpectedArity {
                    context: "event",
                    expected: EVENT_ARITY,
                    found,
                })
            }
            _ => return Err(header.unexpected("event")),
        }

        let timestamp = self.read_timestamp()?;
        let (record, shape) = self.read_body(depth)?;

        trace!(
            offset = start,
            size = self.cursor.position() - start,
            shape = shape.as_str(),
            fields = record.len(),
            "decoded event"
        );
        Ok(Some(Event::new(timestamp, record, shape)))
    }

    fn read_timestamp(&mut self) -> Result<EventTime> {
        if Marker::from_u8(self.cursor.peek_byte()?) == Marker::FixExt8 {
            // Tag and type byte precede the payload: seconds at +2, nanoseconds at +6.
            self.cursor.read_u8()?;
            let ext_type = self.cursor.read_u8()? as i8;
            let seconds = self.cursor.read_u32()?;
            let nanoseconds = self.cursor.read_u32()?;
            return Ok(EventTime::from_event_time(seconds, nanoseconds, ext_type));
        }

        let header = self.read_header()?;
        match header.kind {
            Kind::Int(seconds) => Ok(EventTime::from_seconds(seconds)),
            // Seconds past i64::MAX clamp rather than wrap.
            Kind::UInt(_) => Ok(EventTime::from_seconds(i64::MAX)),
            _ => Err(header.unexpected("timestamp")),
        }
    }

    fn read_body(&mut self, depth: usize) -> Result<(Record, BodyShape)> {
        let depth = self.enter(depth)?;
        let header = self.read_header()?;
        match header.kind {
            Kind::Map(len) => Ok((self.read_map(len, depth)?, BodyShape::Plain)),
            Kind::Array(EVENT_ARITY) => {
                self.skip_value(depth)?;
                let record_depth = self.enter(depth)?;
                let inner = self.read_header()?;
                match inner.kind {
                    Kind::Map(len) => Ok((
                        self.read_map(len, record_depth)?,
                        BodyShape::WithMetadata,
                    )),
                    _ => Err(inner.unexpected("event record")),
                }
            }
            Kind::Array(found) => Err(DecodeError::UnexpectedArity {
                context: "event body",
                expected: EVENT_ARITY,
                found,
            }),
            _ => Err(header.unexpected("event body")),
        }
    }

    /// Read a tag byte and its length or scalar payload.
    fn read_header(&mut self) -> Result<Header> {
        let offset = self.cursor.position();
        let tag = self.cursor.read_u8()?;
        let kind = match Marker::from_u8(tag) {
            Marker::Reserved => return Err(DecodeError::UnsupportedFormatTag { tag, offset }),
            Marker::Null => Kind::Nil,
            Marker::False => Kind::Bool(false),
            Marker::True => Kind::Bool(true),
            Marker::FixPos(n) => Kind::Int(i64::from(n)),
            Marker::FixNeg(n) => Kind::Int(i64::from(n)),
            Marker::U8 => unsigned(u64::from(self.cursor.read_u8()?)),
            Marker::U16 => unsigned(u64::from(self.cursor.read_u16()?)),
            Marker::U32 => unsigned(u64::from(self.cursor.read_u32()?)),
            Marker::U64 => unsigned(self.cursor.read_u64()?),
            Marker::I8 => Kind::Int(i64::from(self.cursor.read_u8()? as i8)),
            Marker::I16 => Kind::Int(i64::from(self.cursor.read_u16()? as i16)),
            Marker::I32 => Kind::Int(i64::from(self.cursor.read_u32()? as i32)),
            Marker::I64 => Kind::Int(self.cursor.read_u64()? as i64),
            Marker::F32 => Kind::F32(f32::from_bits(self.cursor.read_u32()?)),
            Marker::F64 => Kind::F64(f64::from_bits(self.cursor.read_u64()?)),
            Marker::FixStr(n) => Kind::Str(usize::from(n)),
            Marker::Str8 => Kind::Str(self.len8()?),
            Marker::Str16 => Kind::Str(self.len16()?),
            Marker::Str32 => Kind::Str(self.len32()?),
            Marker::Bin8 => Kind::Bin(self.len8()?),
            Marker::Bin16 => Kind::Bin(self.len16()?),
            Marker::Bin32 => Kind::Bin(self.len32()?),
            Marker::FixArray(n) => Kind::Array(usize::from(n)),
            Marker::Array16 => Kind::Array(self.len16()?),
            Marker::Array32 => Kind::Array(self.len32()?),
            Marker::FixMap(n) => Kind::Map(usize::from(n)),
            Marker::Map16 => Kind::Map(self.len16()?),
            Marker::Map32 => Kind::Map(self.len32()?),
            Marker::FixExt1 => Kind::Ext(1),
            Marker::FixExt2 => Kind::Ext(2),
            Marker::FixExt4 => Kind::Ext(4),
            Marker::FixExt8 => Kind::Ext(EVENT_TIME_LEN),
            Marker::FixExt16 => Kind::Ext(16),
            Marker::Ext8 => Kind::Ext(self.len8()?),
            Marker::Ext16 => Kind::Ext(self.len16()?),
            Marker::Ext32 => Kind::Ext(self.len32()?),
        };
        Ok(Header { tag, offset, kind })
    }

    fn read_value(&mut self, depth: usize) -> Result<Value> {
        let header = self.read_header()?;
        let value = match header.kind {
            Kind::Nil => Value::Nil,
            Kind::Bool(b) => Value::Bool(b),
            Kind::Int(n) => Value::Int(n),
            Kind::UInt(n) => Value::UInt(n),
            Kind::F32(v) => Value::F32(v),
            Kind::F64(v) => Value::F64(v),
            Kind::Str(len) => Value::String(self.read_str(len)?),
            Kind::Bin(len) => Value::Binary(Bytes::copy_from_slice(self.cursor.read_bytes(len)?)),
            Kind::Array(len) => {
                let depth = self.enter(depth)?;
                self.ensure_available(len, 1)?;
                let mut items = Vec::with_capacity(len);
                for _ in 0..len {
                    items.push(self.read_value(depth)?);
                }
                Value::Array(items)
            }
            Kind::Map(len) => {
                let depth = self.enter(depth)?;
                Value::Map(self.read_map(len, depth)?)
            }
            Kind::Ext(len) => {
                let ext_type = self.cursor.read_u8()? as i8;
                let data = Bytes::copy_from_slice(self.cursor.read_bytes(len)?);
                Value::Ext { ext_type, data }
            }
        };
        Ok(value)
    }

    /// Read `len` key/value pairs. `depth` is the depth of the map itself.
    fn read_map(&mut self, len: usize, depth: usize) -> Result<Record> {
        self.ensure_available(len, 2)?;
        let mut record = Record::with_capacity(len);
        for _ in 0..len {
            let key = self.read_key()?;
            let value = self.read_value(depth)?;
            match self.config.duplicate_keys {
                DuplicateKeys::LastWins => {
                    record.insert(key, value);
                }
                DuplicateKeys::FirstWins => record.insert_if_absent(key, value),
                DuplicateKeys::Reject => {
                    if record.contains_key(&key) {
                        return Err(DecodeError::DuplicateKey {
                            key: key.to_string(),
                        });
                    }
                    record.insert(key, value);
                }
            }
        }
        Ok(record)
    }

    fn read_key(&mut self) -> Result<Key> {
        let header = self.read_header()?;
        match header.kind {
            Kind::Str(len) => Ok(Key::String(self.read_str(len)?)),
            Kind::Bin(len) => Ok(Key::Binary(Bytes::copy_from_slice(
                self.cursor.read_bytes(len)?,
            ))),
            _ => Err(DecodeError::InvalidKey {
                tag: header.tag,
                offset: header.offset,
            }),
        }
    }

    fn read_str(&mut self, len: usize) -> Result<String> {
        let offset = self.cursor.position();
        let bytes = self.cursor.read_bytes(len)?;
        match std::str::from_utf8(bytes) {
            Ok(s) => Ok(s.to_owned()),
            Err(_) if self.config.utf8 == Utf8Mode::Lossy => {
                Ok(String::from_utf8_lossy(bytes).into_owned())
            }
            Err(_) => Err(DecodeError::InvalidUtf8 { offset }),
        }
    }

    /// Walk over one value without materializing it.
    fn skip_value(&mut self, depth: usize) -> Result<()> {
        let header = self.read_header()?;
        let (items, skip) = match header.kind {
            Kind::Nil
            | Kind::Bool(_)
            | Kind::Int(_)
            | Kind::UInt(_)
            | Kind::F32(_)
            | Kind::F64(_) => (0, 0),
            Kind::Str(len) | Kind::Bin(len) => (0, len),
            // Type byte plus payload.
            Kind::Ext(len) => (0, len.saturating_add(1)),
            Kind::Array(len) => (len, 0),
            Kind::Map(len) => (len.saturating_mul(2), 0),
        };
        self.cursor.read_bytes(skip)?;
        if items > 0 {
            let depth = self.enter(depth)?;
            self.ensure_available(items, 1)?;
            for _ in 0..items {
                self.skip_value(depth)?;
            }
        }
        Ok(())
    }

    fn enter(&self, depth: usize) -> Result<usize> {
        let next = depth + 1;
        if next > self.config.max_depth {
            return Err(DecodeError::DepthLimitExceeded {
                max: self.config.max_depth,
            });
        }
        Ok(next)
    }

    /// Reject element counts that cannot fit in the remaining bytes before allocating.
    fn ensure_available(&self, count: usize, min_size: usize) -> Result<()> {
        let needed = count.saturating_mul(min_size);
        let remaining = self.cursor.remaining();
        if needed > remaining {
            return Err(DecodeError::OutOfBounds {
                needed,
                remaining,
                offset: self.cursor.position(),
            });
        }
        Ok(())
    }

    fn len8(&mut self) -> Result<usize> {
        Ok(usize::from(self.cursor.read_u8()?))
    }

    fn len16(&mut self) -> Result<usize> {
        Ok(usize::from(self.cursor.read_u16()?))
    }

    fn len32(&mut self) -> Result<usize> {
        Ok(self.cursor.read_u32()? as usize)
    }
}

fn unsigned(n: u64) -> Kind {
    match i64::try_from(n) {
        Ok(n) => Kind::Int(n),
        Err(_) => Kind::UInt(n),
    }
}

impl Iterator for EventStreamDecoder<'_> {
    type Item = Result<Event>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        self.next_event().transpose()
    }
}

impl FusedIterator for EventStreamDecoder<'_> {}
