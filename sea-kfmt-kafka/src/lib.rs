//! ### `sea-kfmt-kafka`: Kafka / Redpanda Backend
//!
//! This is the Kafka / Redpanda record source and sink for SeaKfmt.
//!
//! `KafkaConnectOptions`, `KafkaConsumerOptions` and `KafkaProducerOptions` have typed parameters,
//! with a passthrough for any other librdkafka setting (TLS, SASL and so on).
//!
//! `KafkaConsumer` either joins a consumer group, or is assigned partitions directly and starts
//! from a [`SeqPos`](sea_kfmt_types::SeqPos). Its messages implement [`Record`](sea_kfmt_types::Record),
//! so they can be rendered by a `sea-kfmt-format` template as they are borrowed from the client.
//!
//! `KafkaProducer` sends records parsed by an input format, and can be flushed before exit.
//!
//! This crate also ships two executables, `kfmt-consume` and `kfmt-produce`
//! (build with `--features executables`).
//!
//! This crate depends on [`rdkafka`](https://docs.rs/rdkafka),
//! which in turn depends on [librdkafka-sys](https://docs.rs/librdkafka-sys), which itself is a wrapper of
//! [librdkafka](https://docs.confluent.io/platform/current/clients/librdkafka/html/index.html).
//!
//! Configuration Reference: <https://kafka.apache.org/documentation/#configuration>

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(missing_debug_implementations)]
#![doc(
    html_logo_url = "https://raw.githubusercontent.com/SeaQL/sea-streamer/main/docs/SeaQL icon.png"
)]

/// The default Kafka port number
pub const KAFKA_PORT: u16 = 9092;

/// The default timeout, if needed but unspecified
pub const DEFAULT_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(60);

mod cluster;
mod consumer;
mod error;
mod producer;
mod streamer;

pub use cluster::*;
pub use consumer::*;
pub use error::*;
pub use producer::*;
pub use streamer::*;

/// Re-export types from `rdkafka`
pub mod export {
    pub use rdkafka;
}

macro_rules! impl_into_string {
    ($name:ident) => {
        impl From<$name> for String {
            fn from(o: $name) -> Self {
                o.as_str().to_owned()
            }
        }
    };
}

pub(crate) use impl_into_string;
