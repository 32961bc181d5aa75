use std::{fmt::Display, str::FromStr, sync::Arc};
pub use time::OffsetDateTime as Timestamp;

use crate::{SeqPosErr, StreamKeyErr};

/// Maximum string length of a stream key.
pub const MAX_STREAM_KEY_LEN: usize = 249;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
/// Identifies a stream. Aka. topic.
pub struct StreamKey {
    name: Arc<String>,
}

/// Identifies a partition of a topic.
pub type Partition = i32;

/// The tuple (StreamKey, Partition, SeqNo) uniquely identifies a record. Aka. offset.
pub type SeqNo = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Identifies a position in a stream.
pub enum SeqPos {
    Beginning,
    End,
    At(SeqNo),
}

impl StreamKey {
    pub fn new<S: Into<String>>(key: S) -> Result<Self, StreamKeyErr> {
        let key = key.into();
        if is_valid_stream_key(key.as_str()) {
            Ok(Self {
                name: Arc::new(key),
            })
        } else {
            Err(StreamKeyErr::InvalidStreamKey)
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Display for StreamKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

impl FromStr for StreamKey {
    type Err = StreamKeyErr;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StreamKey::new(s)
    }
}

impl Default for SeqPos {
    fn default() -> Self {
        Self::End
    }
}

impl FromStr for SeqPos {
    type Err = SeqPosErr;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "beginning" | "start" | "oldest" => Ok(Self::Beginning),
            "end" | "newest" => Ok(Self::End),
            _ => match s.parse::<SeqNo>() {
                Ok(seq) if seq >= 0 => Ok(Self::At(seq)),
                _ => Err(SeqPosErr::Invalid(s.to_owned())),
            },
        }
    }
}

pub fn is_valid_stream_key(s: &str) -> bool {
    !s.is_empty() && s.len() <= MAX_STREAM_KEY_LEN && s.chars().all(is_valid_stream_key_char)
}

/// Returns true if this character can be used in a stream key.
pub fn is_valid_stream_key_char(c: char) -> bool {
    // https://stackoverflow.com/questions/37062904/what-are-apache-kafka-topic-name-limitations
    c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-')
}
