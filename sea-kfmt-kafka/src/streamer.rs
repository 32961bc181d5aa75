use rdkafka::ClientConfig;
use sea_kfmt_types::{StreamErr, StreamKey};
use std::time::Duration;

use crate::{
    create_consumer, create_producer, impl_into_string, Brokers, KafkaConsumer,
    KafkaConsumerOptions, KafkaProducer, KafkaProducerOptions, KafkaResult,
    DEFAULT_TIMEOUT,
};

#[derive(Debug, Clone)]
/// Holds the brokers and the connect options. Nothing will happen until you create a consumer or producer.
pub struct KafkaStreamer {
    brokers: Brokers,
    options: KafkaConnectOptions,
}

#[derive(Debug, Default, Clone)]
pub struct KafkaConnectOptions {
    timeout: Option<Duration>,
    client_id: Option<String>,
    custom_options: Vec<(String, String)>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum KafkaConnectOptionKey {
    BootstrapServers,
    SocketTimeout,
    ClientId,
}

type OptionKey = KafkaConnectOptionKey;

impl KafkaConnectOptions {
    /// Timeout for network requests. Default is 1 min (as of librdkafka 3.2.1)
    pub fn set_timeout(&mut self, v: Duration) -> &mut Self {
        self.timeout = Some(v);
        self
    }
    pub fn timeout(&self) -> KafkaResult<Duration> {
        self.timeout.ok_or(StreamErr::TimeoutNotSet)
    }

    /// Client identifier, sent to the brokers in every request.
    pub fn set_client_id(&mut self, id: String) -> &mut Self {
        self.client_id = Some(id);
        self
    }
    pub fn client_id(&self) -> Option<&String> {
        self.client_id.as_ref()
    }

    /// Set any librdkafka property, i.e. `security.protocol` or `sasl.mechanisms`.
    /// These are applied last, so they override the typed options.
    pub fn add_custom_option<K, V>(&mut self, key: K, value: V) -> &mut Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.custom_options.push((key.into(), value.into()));
        self
    }
    pub fn custom_options(&self) -> impl Iterator<Item = (&str, &str)> {
        self.custom_options
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub(crate) fn make_client_config(&self, client_config: &mut ClientConfig) {
        if let Some(v) = self.timeout {
            client_config.set(OptionKey::SocketTimeout, format!("{}", v.as_millis()));
        }
        if let Some(v) = &self.client_id {
            client_config.set(OptionKey::ClientId, v);
        }
    }

    pub(crate) fn apply_custom_options(&self, client_config: &mut ClientConfig) {
        for (key, value) in self.custom_options() {
            client_config.set(key, value);
        }
    }
}

impl OptionKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BootstrapServers => "bootstrap.servers",
            Self::SocketTimeout => "socket.timeout.ms",
            Self::ClientId => "client.id",
        }
    }
}

impl_into_string!(OptionKey);

/// Parse a `key=value` librdkafka property, as given to `-X`.
pub fn parse_custom_option(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_owned(), value.trim().to_owned()))
        }
        _ => Err(format!("Expected `key=value`, found `{s}`")),
    }
}

impl KafkaStreamer {
    pub fn connect(brokers: Brokers, options: KafkaConnectOptions) -> Self {
        Self { brokers, options }
    }

    pub fn brokers(&self) -> &Brokers {
        &self.brokers
    }

    pub fn options(&self) -> &KafkaConnectOptions {
        &self.options
    }

    /// If `group_id` is set and no partitions are given, the consumer subscribes to the topics
    /// and the broker assigns partitions to the group members. Otherwise, the given (or all)
    /// partitions are assigned directly, starting at `start`.
    pub async fn create_consumer(
        &self,
        topics: &[StreamKey],
        options: KafkaConsumerOptions,
    ) -> KafkaResult<KafkaConsumer> {
        if topics.is_empty() {
            return Err(StreamErr::StreamKeyEmpty);
        }
        let mut client_config = self.client_config();
        options.make_client_config(&mut client_config);
        self.options.apply_custom_options(&mut client_config);
        let timeout = self.options.timeout().unwrap_or(DEFAULT_TIMEOUT);
        create_consumer(client_config, &options, topics.to_vec(), timeout).await
    }

    pub fn create_producer(&self, options: KafkaProducerOptions) -> KafkaResult<KafkaProducer> {
        let mut client_config = self.client_config();
        options.make_client_config(&mut client_config);
        self.options.apply_custom_options(&mut client_config);
        create_producer(client_config).map_err(StreamErr::Backend)
    }

    fn client_config(&self) -> ClientConfig {
        let mut client_config = ClientConfig::new();
        client_config.set(OptionKey::BootstrapServers, self.brokers.bootstrap_servers());
        self.options.make_client_config(&mut client_config);
        client_config
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_client_config() {
        let mut options = KafkaConnectOptions::default();
        assert!(matches!(options.timeout(), Err(StreamErr::TimeoutNotSet)));
        options
            .set_timeout(Duration::from_secs(5))
            .set_client_id("kfmt".to_owned())
            .add_custom_option("security.protocol", "SASL_SSL")
            .add_custom_option("client.id", "overridden");

        let streamer = KafkaStreamer::connect("localhost".parse().unwrap(), options);
        let mut config = streamer.client_config();
        assert_eq!(config.get("bootstrap.servers"), Some("localhost:9092"));
        assert_eq!(config.get("socket.timeout.ms"), Some("5000"));
        assert_eq!(config.get("client.id"), Some("kfmt"));

        streamer.options().apply_custom_options(&mut config);
        assert_eq!(config.get("security.protocol"), Some("SASL_SSL"));
        assert_eq!(config.get("client.id"), Some("overridden"));
    }

    #[test]
    fn test_parse_custom_option() {
        assert_eq!(
            parse_custom_option("sasl.username=alice").unwrap(),
            ("sasl.username".to_owned(), "alice".to_owned())
        );
        assert_eq!(
            parse_custom_option("ssl.key.password=a=b").unwrap(),
            ("ssl.key.password".to_owned(), "a=b".to_owned())
        );
        assert!(parse_custom_option("no-equals").is_err());
        assert!(parse_custom_option("=value").is_err());
    }
}
