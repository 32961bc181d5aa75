use anyhow::Result;
use clap::Parser;
use sea_kfmt_format::{compile, exit_on_cutoff, Driver, DEFAULT_FORMAT};
use sea_kfmt_kafka::{
    parse_custom_option, Brokers, KafkaConnectOptions, KafkaConsumerOptions, KafkaStreamer,
};
use sea_kfmt_types::{Partition, SeqPos, StreamKey};
use std::io::{stdout, BufWriter, Write};

#[derive(Debug, Parser)]
#[clap(name = "kfmt-consume", about = "Consume records and print them with a format string")]
struct Args {
    #[clap(
        long,
        help = "Comma-separated bootstrap brokers, i.e. try `localhost:9092`",
        env = "BROKERS"
    )]
    brokers: Brokers,
    #[clap(long = "topic", required = true, help = "Topic to consume; repeat for more")]
    topics: Vec<StreamKey>,
    #[clap(long, help = "Consume as a member of this group, committing offsets")]
    group: Option<String>,
    #[clap(
        long,
        default_value = "end",
        help = "Where to start: `beginning`, `end` or an offset"
    )]
    offset: SeqPos,
    #[clap(
        long,
        value_delimiter = ',',
        help = "Comma-separated partitions to consume, instead of all"
    )]
    partitions: Vec<Partition>,
    #[clap(
        long,
        default_value = DEFAULT_FORMAT,
        env = "KFMT_FORMAT",
        help = "Output format, i.e. `%t:%p:%o %k=%v\\n`"
    )]
    format: String,
    #[clap(long, default_value_t = 0, help = "Exit after this many records; 0 is unbounded")]
    num: u64,
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
        topics,
        group,
        offset,
        partitions,
        format,
        num,
        config,
    } = Args::parse();

    // a bad format fails before connecting
    let template = compile(&format)?;

    let mut connect = KafkaConnectOptions::default();
    for (key, value) in config {
        connect.add_custom_option(key, value);
    }
    let streamer = KafkaStreamer::connect(brokers, connect);

    let mut options = KafkaConsumerOptions::default();
    options.set_start(offset);
    if let Some(group) = group {
        options.set_group_id(group);
    }
    if !partitions.is_empty() {
        options.set_partitions(partitions);
    }
    let consumer = streamer.create_consumer(&topics, options).await?;

    let mut driver = Driver::new(template, BufWriter::new(stdout().lock()));
    driver.set_max(num);
    let outcome = driver.drive(consumer.stream()).await?;
    exit_on_cutoff(outcome, driver.sink_mut());
    driver.sink_mut().flush()?;

    Ok(())
}
