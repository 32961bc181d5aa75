use rdkafka::{
    config::ClientConfig,
    producer::{FutureProducer as RawProducer, FutureRecord, Producer},
    util::Timeout,
};
use std::time::Duration;
use tokio::task::spawn_blocking;

use sea_kfmt_format::InputRecord;
use sea_kfmt_types::{Partition, SeqNo, StreamErr, StreamKey};

use crate::{impl_into_string, join_err, stream_err, KafkaErr, KafkaResult};

#[derive(Clone)]
pub struct KafkaProducer {
    inner: RawProducer,
    topic: Option<StreamKey>,
}

#[derive(Debug, Default, Clone)]
pub struct KafkaProducerOptions {
    /// https://kafka.apache.org/documentation/#producerconfigs_acks
    acks: Option<Acks>,
    /// https://kafka.apache.org/documentation/#producerconfigs_linger.ms
    linger: Option<Duration>,
    /// https://kafka.apache.org/documentation/#producerconfigs_compression.type
    compression_type: Option<CompressionType>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum KafkaProducerOptionKey {
    Acks,
    Linger,
    CompressionType,
}

type OptionKey = KafkaProducerOptionKey;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Acks {
    /// do not wait for any acknowledgement
    None,
    /// wait for the partition leader only
    Leader,
    /// wait for the full set of in-sync replicas
    All,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CompressionType {
    None,
    Gzip,
    Snappy,
    Lz4,
    Zstd,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
/// Where a record has been written to.
pub struct Receipt {
    pub partition: Partition,
    pub offset: SeqNo,
}

impl KafkaProducerOptions {
    /// The number of acknowledgments the producer requires the leader to have received
    /// before considering a request complete.
    pub fn set_acks(&mut self, v: Acks) -> &mut Self {
        self.acks = Some(v);
        self
    }
    pub fn acks(&self) -> Option<&Acks> {
        self.acks.as_ref()
    }

    /// How long to wait for more records before sending a batch.
    pub fn set_linger(&mut self, v: Duration) -> &mut Self {
        self.linger = Some(v);
        self
    }
    pub fn linger(&self) -> Option<&Duration> {
        self.linger.as_ref()
    }

    pub fn set_compression_type(&mut self, v: CompressionType) -> &mut Self {
        self.compression_type = Some(v);
        self
    }
    pub fn compression_type(&self) -> Option<&CompressionType> {
        self.compression_type.as_ref()
    }

    pub(crate) fn make_client_config(&self, client_config: &mut ClientConfig) {
        if let Some(v) = self.acks {
            client_config.set(OptionKey::Acks, v);
        }
        if let Some(v) = self.linger {
            client_config.set(OptionKey::Linger, format!("{}", v.as_millis()));
        }
        if let Some(v) = self.compression_type {
            client_config.set(OptionKey::CompressionType, v);
        }
    }
}

impl OptionKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Acks => "acks",
            Self::Linger => "linger.ms",
            Self::CompressionType => "compression.type",
        }
    }
}

impl Acks {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "0",
            Self::Leader => "1",
            Self::All => "all",
        }
    }
}

impl CompressionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Gzip => "gzip",
            Self::Snappy => "snappy",
            Self::Lz4 => "lz4",
            Self::Zstd => "zstd",
        }
    }
}

impl_into_string!(OptionKey);
impl_into_string!(Acks);
impl_into_string!(CompressionType);

impl std::fmt::Debug for KafkaProducer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KafkaProducer")
            .field("topic", &self.topic)
            .finish()
    }
}

impl KafkaProducer {
    /// The topic of records that do not carry one.
    pub fn set_topic(&mut self, topic: StreamKey) -> &mut Self {
        self.topic = Some(topic);
        self
    }
    pub fn topic(&self) -> Option<&StreamKey> {
        self.topic.as_ref()
    }

    /// Send a record, and wait for the broker's acknowledgement. Records without a partition
    /// are placed by the partitioner.
    ///
    /// The record is enqueued when this future is first polled; many sends can be in flight.
    pub async fn send(&self, record: InputRecord) -> KafkaResult<Receipt> {
        let topic = match (record.topic.as_deref(), &self.topic) {
            (Some(topic), _) if !topic.is_empty() => topic,
            (Some(_), Some(default)) => {
                log::warn!("Record has an empty topic, sending to `{default}`");
                default.name()
            }
            (None, Some(default)) => default.name(),
            (_, None) => return Err(StreamErr::NoTopic),
        };
        let mut raw = FutureRecord::<[u8], [u8]>::to(topic);
        if let Some(key) = &record.key {
            raw = raw.key(key.as_slice());
        }
        if let Some(value) = &record.value {
            raw = raw.payload(value.as_slice());
        }
        if let Some(partition) = record.partition {
            raw = raw.partition(partition);
        }
        match self.inner.send(raw, Timeout::Never).await {
            Ok((partition, offset)) => Ok(Receipt { partition, offset }),
            Err((err, _)) => Err(stream_err(err)),
        }
    }

    /// Wait until all in-flight records are delivered.
    pub async fn flush(&self, timeout: Duration) -> KafkaResult<()> {
        let client = self.inner.clone();
        spawn_blocking(move || client.flush(Timeout::After(timeout)))
            .await
            .map_err(join_err)?
            .map_err(stream_err)
    }
}

pub(crate) fn create_producer(client_config: ClientConfig) -> Result<KafkaProducer, KafkaErr> {
    let inner: RawProducer = client_config.create()?;
    Ok(KafkaProducer { inner, topic: None })
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_client_config() {
        let mut options = KafkaProducerOptions::default();
        let mut config = ClientConfig::new();
        options.make_client_config(&mut config);
        assert_eq!(config.get("acks"), None);

        options
            .set_acks(Acks::All)
            .set_linger(Duration::from_millis(5))
            .set_compression_type(CompressionType::Zstd);
        options.make_client_config(&mut config);
        assert_eq!(config.get("acks"), Some("all"));
        assert_eq!(config.get("linger.ms"), Some("5"));
        assert_eq!(config.get("compression.type"), Some("zstd"));

        options.set_acks(Acks::None);
        options.make_client_config(&mut config);
        assert_eq!(config.get("acks"), Some("0"));
    }
}
