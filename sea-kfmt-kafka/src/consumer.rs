use rdkafka::{
    config::ClientConfig,
    consumer::{Consumer, StreamConsumer as RawConsumer},
    error::RDKafkaErrorCode,
    message::BorrowedMessage as RawMessage,
    util::Timeout,
    Message as KafkaMessageTrait, Offset, TopicPartitionList,
};
use std::{fmt::Debug, time::Duration};
use tokio::task::spawn_blocking;

use sea_kfmt_types::{
    export::futures::{Stream, StreamExt},
    Partition, Record, SeqNo, SeqPos, StreamKey, Timestamp,
};

use crate::{impl_into_string, join_err, stream_err, KafkaErr, KafkaResult};

pub struct KafkaConsumer {
    inner: RawConsumer,
    topics: Vec<StreamKey>,
}

#[repr(transparent)]
/// A message borrowed from the consumer. It implements [`Record`], so it can be rendered in place.
pub struct KafkaMessage<'a>(RawMessage<'a>);

#[derive(Debug, Default, Clone)]
pub struct KafkaConsumerOptions {
    /// https://kafka.apache.org/documentation/#connectconfigs_group.id
    group_id: Option<String>,
    /// https://kafka.apache.org/documentation/#connectconfigs_session.timeout.ms
    session_timeout: Option<Duration>,
    /// https://kafka.apache.org/documentation/#consumerconfigs_auto.offset.reset
    auto_offset_reset: Option<AutoOffsetReset>,
    /// https://kafka.apache.org/documentation/#consumerconfigs_enable.auto.commit
    enable_auto_commit: Option<bool>,
    /// https://kafka.apache.org/documentation/#consumerconfigs_auto.commit.interval.ms
    auto_commit_interval: Option<Duration>,
    start: SeqPos,
    partitions: Option<Vec<Partition>>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum KafkaConsumerOptionKey {
    GroupId,
    SessionTimeout,
    AutoOffsetReset,
    EnableAutoCommit,
    AutoCommitInterval,
}

type OptionKey = KafkaConsumerOptionKey;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum AutoOffsetReset {
    /// automatically reset the offset to the earliest offset
    Earliest,
    /// automatically reset the offset to the latest offset
    Latest,
    /// throw exception to the consumer if no previous offset is found for the consumer's group
    NoReset,
}

/// librdkafka always requires a group id, even when the consumer never joins a group.
/// https://github.com/edenhill/librdkafka/issues/3261
const UNGROUPED_ID: &str = "sea-kfmt";

impl KafkaConsumerOptions {
    /// A unique string that identifies the consumer group this consumer belongs to.
    /// With a group, offsets are committed and partitions are balanced among the members,
    /// unless partitions are assigned explicitly.
    pub fn set_group_id(&mut self, id: String) -> &mut Self {
        self.group_id = Some(id);
        self
    }
    pub fn group_id(&self) -> Option<&String> {
        self.group_id.as_ref()
    }

    /// The timeout used to detect worker failures. The worker sends periodic heartbeats
    /// to indicate its liveness to the broker. If no heartbeats are received by the broker
    /// before the expiration of this session timeout, then the broker will remove the worker
    /// from the group and initiate a rebalance.
    pub fn set_session_timeout(&mut self, v: Duration) -> &mut Self {
        self.session_timeout = Some(v);
        self
    }
    pub fn session_timeout(&self) -> Option<&Duration> {
        self.session_timeout.as_ref()
    }

    /// What to do when there is no initial offset in Kafka or if the current offset does
    /// not exist any more on the server.
    ///
    /// If unset, it follows [`Self::start`] in a consumer group.
    pub fn set_auto_offset_reset(&mut self, v: AutoOffsetReset) -> &mut Self {
        self.auto_offset_reset = Some(v);
        self
    }
    pub fn auto_offset_reset(&self) -> Option<&AutoOffsetReset> {
        self.auto_offset_reset.as_ref()
    }

    /// If enabled, the consumer's offset will be periodically committed in the background.
    ///
    /// If unset, defaults to true in a consumer group, false otherwise.
    pub fn set_enable_auto_commit(&mut self, v: bool) -> &mut Self {
        self.enable_auto_commit = Some(v);
        self
    }
    pub fn enable_auto_commit(&self) -> Option<&bool> {
        self.enable_auto_commit.as_ref()
    }

    /// The interval for offsets to be auto-committed. If `enable_auto_commit` is set to false,
    /// this will have no effect.
    pub fn set_auto_commit_interval(&mut self, v: Duration) -> &mut Self {
        self.auto_commit_interval = Some(v);
        self
    }
    pub fn auto_commit_interval(&self) -> Option<&Duration> {
        self.auto_commit_interval.as_ref()
    }

    /// Where to start consuming. Defaults to [`SeqPos::End`].
    ///
    /// A consumer group resumes from its committed offsets, and only falls back to
    /// `Beginning` or `End` when there is none.
    pub fn set_start(&mut self, v: SeqPos) -> &mut Self {
        self.start = v;
        self
    }
    pub fn start(&self) -> &SeqPos {
        &self.start
    }

    /// Only consume these partitions of every topic, instead of all of them.
    pub fn set_partitions(&mut self, v: Vec<Partition>) -> &mut Self {
        self.partitions = Some(v);
        self
    }
    pub fn partitions(&self) -> Option<&[Partition]> {
        self.partitions.as_deref()
    }

    /// Whether the broker assigns partitions, instead of this consumer assigning them itself.
    pub fn is_subscribed(&self) -> bool {
        self.group_id.is_some()
            && self.partitions.is_none()
            && !matches!(self.start, SeqPos::At(_))
    }

    pub(crate) fn make_client_config(&self, client_config: &mut ClientConfig) {
        if let Some(group_id) = &self.group_id {
            client_config.set(OptionKey::GroupId, group_id);
        } else {
            client_config.set(OptionKey::GroupId, UNGROUPED_ID);
        }
        if let Some(v) = self.session_timeout {
            client_config.set(OptionKey::SessionTimeout, format!("{}", v.as_millis()));
        }
        let auto_offset_reset = self.auto_offset_reset.unwrap_or(match self.start {
            SeqPos::Beginning => AutoOffsetReset::Earliest,
            SeqPos::End | SeqPos::At(_) => AutoOffsetReset::Latest,
        });
        client_config.set(OptionKey::AutoOffsetReset, auto_offset_reset);
        // there is nothing to commit to without a group
        let enable_auto_commit = self
            .enable_auto_commit
            .unwrap_or(self.group_id.is_some());
        client_config.set(OptionKey::EnableAutoCommit, enable_auto_commit.to_string());
        if let Some(v) = self.auto_commit_interval {
            client_config.set(OptionKey::AutoCommitInterval, format!("{}", v.as_millis()));
        }
    }
}

impl OptionKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GroupId => "group.id",
            Self::SessionTimeout => "session.timeout.ms",
            Self::AutoOffsetReset => "auto.offset.reset",
            Self::EnableAutoCommit => "enable.auto.commit",
            Self::AutoCommitInterval => "auto.commit.interval.ms",
        }
    }
}

impl AutoOffsetReset {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Earliest => "earliest",
            Self::Latest => "latest",
            Self::NoReset => "none",
        }
    }
}

impl_into_string!(OptionKey);
impl_into_string!(AutoOffsetReset);

impl Debug for KafkaConsumer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KafkaConsumer")
            .field("topics", &self.topics)
            .finish()
    }
}

impl KafkaConsumer {
    pub fn topics(&self) -> &[StreamKey] {
        &self.topics
    }

    /// Messages in the order they are fetched. Order is preserved within each partition.
    /// The Kafka stream never ends.
    pub fn stream(&self) -> impl Stream<Item = KafkaResult<KafkaMessage<'_>>> + '_ {
        self.inner.stream().map(Self::process)
    }

    fn process(res: Result<RawMessage, KafkaErr>) -> KafkaResult<KafkaMessage> {
        match res {
            Ok(mess) => Ok(KafkaMessage(mess)),
            Err(err) => Err(stream_err(err)),
        }
    }
}

impl<'a> KafkaMessage<'a> {
    fn mess(&self) -> &RawMessage {
        &self.0
    }
}

impl<'a> Debug for KafkaMessage<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.mess().fmt(f)
    }
}

impl<'a> Record for KafkaMessage<'a> {
    fn key(&self) -> Option<&[u8]> {
        self.mess().key()
    }

    fn value(&self) -> Option<&[u8]> {
        self.mess().payload()
    }

    fn topic(&self) -> &str {
        self.mess().topic()
    }

    fn partition(&self) -> Partition {
        self.mess().partition()
    }

    fn offset(&self) -> SeqNo {
        self.mess().offset()
    }

    fn timestamp(&self) -> Timestamp {
        Timestamp::from_unix_timestamp_nanos(self.timestamp_millis() as i128 * 1_000_000)
            .unwrap_or(Timestamp::UNIX_EPOCH)
    }

    /// Messages without a timestamp are at the epoch.
    fn timestamp_millis(&self) -> i64 {
        self.mess().timestamp().to_millis().unwrap_or_default()
    }
}

fn offset_of(pos: &SeqPos) -> Offset {
    match pos {
        SeqPos::Beginning => Offset::Beginning,
        SeqPos::End => Offset::End,
        SeqPos::At(seq) => Offset::Offset(*seq),
    }
}

pub(crate) async fn create_consumer(
    client_config: ClientConfig,
    options: &KafkaConsumerOptions,
    topics: Vec<StreamKey>,
    timeout: Duration,
) -> KafkaResult<KafkaConsumer> {
    let consumer: RawConsumer = client_config.create().map_err(stream_err)?;

    if options.is_subscribed() {
        let names: Vec<&str> = topics.iter().map(|s| s.name()).collect();
        consumer.subscribe(&names).map_err(stream_err)?;
        log::debug!("Subscribed to {names:?}");
        return Ok(KafkaConsumer {
            inner: consumer,
            topics,
        });
    }

    let (consumer, partitions) = match options.partitions() {
        Some(partitions) => {
            let partitions = partitions.to_vec();
            let all = topics.iter().map(|t| (t.clone(), partitions.clone()));
            (consumer, all.collect())
        }
        None => {
            // fetching metadata is a blocking call, so we transfer the client into the
            // handler thread, and take back the ownership after it finishes
            let names = topics.clone();
            let (consumer, res) = spawn_blocking(move || {
                let res = fetch_partitions(&consumer, &names, timeout);
                (consumer, res)
            })
            .await
            .map_err(join_err)?;
            (consumer, res?)
        }
    };

    let offset = offset_of(options.start());
    let mut tpl = TopicPartitionList::new();
    for (topic, partitions) in partitions.iter() {
        for partition in partitions {
            tpl.add_partition_offset(topic.name(), *partition, offset)
                .map_err(stream_err)?;
        }
    }
    consumer.assign(&tpl).map_err(stream_err)?;
    log::debug!("Assigned {tpl:?}");

    Ok(KafkaConsumer {
        inner: consumer,
        topics,
    })
}

fn fetch_partitions(
    consumer: &RawConsumer,
    topics: &[StreamKey],
    timeout: Duration,
) -> KafkaResult<Vec<(StreamKey, Vec<Partition>)>> {
    let mut result = Vec::new();
    for topic in topics {
        let metadata = consumer
            .fetch_metadata(Some(topic.name()), Timeout::After(timeout))
            .map_err(stream_err)?;
        let mut partitions = Vec::new();
        for meta in metadata.topics().iter().filter(|m| m.name() == topic.name()) {
            if let Some(err) = meta.error() {
                return Err(stream_err(KafkaErr::MetadataFetch(err.into())));
            }
            partitions.extend(meta.partitions().iter().map(|p| p.id()));
        }
        if partitions.is_empty() {
            return Err(stream_err(KafkaErr::MetadataFetch(
                RDKafkaErrorCode::UnknownTopicOrPartition,
            )));
        }
        partitions.sort_unstable();
        result.push((topic.clone(), partitions));
    }
    Ok(result)
}
