use anyhow::{bail, Result};
use clap::Parser;
use sea_kfmt_format::{compile_reader, DEFAULT_FORMAT};
use sea_kfmt_kafka::{
    parse_custom_option, Brokers, KafkaConnectOptions, KafkaResult, KafkaStreamer, Receipt,
    DEFAULT_TIMEOUT,
};
use sea_kfmt_types::{
    export::futures::{stream::FuturesUnordered, Future, FutureExt, StreamExt},
    StreamKey,
};

/// Deliveries awaited at once; reading stdin pauses beyond this.
const MAX_IN_FLIGHT: usize = 1024;

#[derive(Debug, Parser)]
#[clap(name = "kfmt-produce", about = "Read records from stdin with a format string and produce them")]
struct Args {
    #[clap(
        long,
        help = "Comma-separated bootstrap brokers, i.e. try `localhost:9092`",
        env = "BROKERS"
    )]
    brokers: Brokers,
    #[clap(long, help = "Topic of records whose format has no `%t`")]
    topic: Option<StreamKey>,
    #[clap(
        long,
        default_value = DEFAULT_FORMAT,
        env = "KFMT_FORMAT",
        help = "Input format, i.e. `%k=%v\\n`"
    )]
    format: String,
    #[clap(
        short = 'X',
        value_parser = parse_custom_option,
        help = "Any librdkafka property as `key=value`; repeatable"
    )]
    config: Vec<(String, String)>,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let Args {
        brokers,
        topic,
        format,
        config,
    } = Args::parse();

    let input = compile_reader(&format)?;
    if topic.is_none() && !input.has_topic() {
        bail!("Either `--topic` or a `%t` in the format is required");
    }

    let mut connect = KafkaConnectOptions::default();
    for (key, value) in config {
        connect.add_custom_option(key, value);
    }
    let streamer = KafkaStreamer::connect(brokers, connect);
    let mut producer = streamer.create_producer(Default::default())?;
    if let Some(topic) = topic {
        producer.set_topic(topic);
    }

    let stdin = std::io::stdin();
    let mut reader = stdin.lock();
    let mut pending = FuturesUnordered::new();
    let mut count: u64 = 0;

    while let Some(record) = input.read(&mut reader)? {
        pending.push(producer.send(record));
        // a send is only enqueued once polled; do not hold it until the next read returns
        count += settle(&mut pending)?;
        while pending.len() >= MAX_IN_FLIGHT {
            if let Some(receipt) = pending.next().await {
                receipt?;
                count += 1;
            }
        }
    }
    while let Some(receipt) = pending.next().await {
        receipt?;
        count += 1;
    }
    producer.flush(DEFAULT_TIMEOUT).await?;
    log::info!("Produced {count} records");

    Ok(())
}

/// Poll every pending delivery once, without waiting. Returns how many have completed.
fn settle<F>(pending: &mut FuturesUnordered<F>) -> KafkaResult<u64>
where
    F: Future<Output = KafkaResult<Receipt>>,
{
    let mut settled = 0;
    while let Some(Some(receipt)) = pending.next().now_or_never() {
        receipt?;
        settled += 1;
    }
    Ok(settled)
}

#[cfg(test)]
mod test {
    use super::*;
    use sea_kfmt_types::{export::futures::future::poll_fn, StreamErr};
    use std::{cell::Cell, task::Poll};

    #[test]
    fn test_settle_polls_new_sends() {
        let polled = Cell::new(0);
        let receipt = Receipt {
            partition: 0,
            offset: 1,
        };
        let mut pending = FuturesUnordered::new();
        pending.push(
            poll_fn(|_| {
                polled.set(polled.get() + 1);
                Poll::Ready(Ok(receipt))
            })
            .boxed_local(),
        );
        pending.push(
            poll_fn(|_| {
                polled.set(polled.get() + 1);
                Poll::Pending
            })
            .boxed_local(),
        );
        assert_eq!(settle(&mut pending).unwrap(), 1);
        assert_eq!(polled.get(), 2);
        assert_eq!(pending.len(), 1);
    }

    #[test]
    fn test_settle_fails_on_delivery_error() {
        let mut pending = FuturesUnordered::new();
        pending.push(poll_fn(|_| Poll::Ready(Err(StreamErr::NoTopic))).boxed_local());
        assert!(matches!(settle(&mut pending), Err(StreamErr::NoTopic)));
    }
}
