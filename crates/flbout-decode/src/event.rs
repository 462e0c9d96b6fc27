use serde::Serialize;

use crate::time::EventTime;
use crate::value::Record;

/// Layout of the second element of an event array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyShape {
    /// `[timestamp, record]`, emitted by older agents.
    Plain,
    /// `[timestamp, [metadata, record]]`. The metadata map is discarded.
    WithMetadata,
}

impl BodyShape {
    pub fn as_str(self) -> &'static str {
        match self {
            BodyShape::Plain => "plain",
            BodyShape::WithMetadata => "with_metadata",
        }
    }
}

/// One decoded log entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Event {
    pub timestamp: EventTime,
    pub record: Record,
    pub shape: BodyShape,
}

impl Event {
    pub fn new(timestamp: EventTime, record: Record, shape: BodyShape) -> Self {
        Self {
            timestamp,
            record,
            shape,
        }
    }
}
