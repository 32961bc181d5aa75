/// Re-export of [`rdkafka::error::KafkaError`].
pub use rdkafka::error::KafkaError as KafkaErr;
use sea_kfmt_types::{runtime_error, StreamErr, StreamResult};

/// Alias for `StreamResult<T, KafkaErr>`.
pub type KafkaResult<T> = StreamResult<T, KafkaErr>;

pub(crate) fn stream_err(err: KafkaErr) -> StreamErr<KafkaErr> {
    StreamErr::Backend(err)
}

/// A blocking client call panicked or was cancelled.
pub(crate) fn join_err(err: tokio::task::JoinError) -> StreamErr<KafkaErr> {
    runtime_error(err)
}
