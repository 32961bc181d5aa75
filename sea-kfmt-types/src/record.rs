use crate::{Partition, SeqNo, StreamKey, Timestamp};

/// Common interface of records, to be implemented by all backends.
///
/// A record is a read-only view; the formatting engine never mutates it.
pub trait Record: Send {
    fn key(&self) -> Option<&[u8]>;

    fn value(&self) -> Option<&[u8]>;

    fn topic(&self) -> &str;

    fn partition(&self) -> Partition;

    fn offset(&self) -> SeqNo;

    fn timestamp(&self) -> Timestamp;

    /// Milliseconds since the Unix epoch.
    fn timestamp_millis(&self) -> i64 {
        (self.timestamp().unix_timestamp_nanos() / 1_000_000) as i64
    }

}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// A record that owns its bytes.
pub struct OwnedRecord {
    key: Option<Vec<u8>>,
    value: Option<Vec<u8>>,
    topic: String,
    partition: Partition,
    offset: SeqNo,
    timestamp: Timestamp,
}

impl Default for OwnedRecord {
    fn default() -> Self {
        Self {
            key: None,
            value: None,
            topic: String::new(),
            partition: 0,
            offset: 0,
            timestamp: Timestamp::UNIX_EPOCH,
        }
    }
}

impl OwnedRecord {
    pub fn new(topic: &StreamKey, partition: Partition, offset: SeqNo) -> Self {
        Self {
            topic: topic.name().to_owned(),
            partition,
            offset,
            ..Default::default()
        }
    }

    pub fn with_key<K: Into<Vec<u8>>>(mut self, key: K) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn with_value<V: Into<Vec<u8>>>(mut self, value: V) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_timestamp(mut self, timestamp: Timestamp) -> Self {
        self.timestamp = timestamp;
        self
    }
}

impl Record for OwnedRecord {
    fn key(&self) -> Option<&[u8]> {
        self.key.as_deref()
    }

    fn value(&self) -> Option<&[u8]> {
        self.value.as_deref()
    }

    fn topic(&self) -> &str {
        &self.topic
    }

    fn partition(&self) -> Partition {
        self.partition
    }

    fn offset(&self) -> SeqNo {
        self.offset
    }

    fn timestamp(&self) -> Timestamp {
        self.timestamp
    }
}

impl<R: Record + Sync> Record for &R {
    fn key(&self) -> Option<&[u8]> {
        (*self).key()
    }

    fn value(&self) -> Option<&[u8]> {
        (*self).value()
    }

    fn topic(&self) -> &str {
        (*self).topic()
    }

    fn partition(&self) -> Partition {
        (*self).partition()
    }

    fn offset(&self) -> SeqNo {
        (*self).offset()
    }

    fn timestamp(&self) -> Timestamp {
        (*self).timestamp()
    }

    fn timestamp_millis(&self) -> i64 {
        (*self).timestamp_millis()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn test_owned_record() {
        let topic = StreamKey::new("hello").unwrap();
        let record = OwnedRecord::new(&topic, 3, 42)
            .with_key("k")
            .with_value(b"v".to_vec())
            .with_timestamp(datetime!(2022-01-02 03:04:05.006 UTC));
        assert_eq!(record.key(), Some(b"k".as_slice()));
        assert_eq!(record.value(), Some(b"v".as_slice()));
        assert_eq!(record.topic(), "hello");
        assert_eq!(record.partition(), 3);
        assert_eq!(record.offset(), 42);
        assert_eq!(record.timestamp_millis(), 1641092645006);
    }

    #[test]
    fn test_absent_fields() {
        let record = OwnedRecord::default();
        assert_eq!(record.key(), None);
        assert_eq!(record.value(), None);
        assert_eq!(record.timestamp_millis(), 0);
    }
}
