use sea_kfmt_types::StreamErr;
use std::{fmt::Display, str::FromStr};

use crate::{KafkaErr, KAFKA_PORT};

#[derive(Debug, Clone, PartialEq, Eq)]
/// The bootstrap brokers of a cluster, i.e. `localhost:9092,broker-2`.
/// A node without a port is assumed to listen on [`KAFKA_PORT`].
pub struct Brokers {
    nodes: Vec<String>,
}

impl Brokers {
    pub fn new<I, S>(nodes: I) -> Result<Self, StreamErr<KafkaErr>>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let nodes: Vec<String> = nodes
            .into_iter()
            .map(|node| {
                let node: String = node.into();
                node.trim().to_owned()
            })
            .filter(|node| !node.is_empty())
            .map(with_port)
            .collect();
        if nodes.is_empty() {
            return Err(StreamErr::Connect("No broker specified".to_owned()));
        }
        Ok(Self { nodes })
    }

    pub fn nodes(&self) -> &[String] {
        &self.nodes
    }

    /// The value of `bootstrap.servers`.
    pub fn bootstrap_servers(&self) -> String {
        self.nodes.join(",")
    }
}

fn with_port(node: String) -> String {
    // `[::1]` is a bare IPv6 address
    if node.contains(':') && !node.ends_with(']') {
        node
    } else {
        format!("{node}:{KAFKA_PORT}")
    }
}

impl FromStr for Brokers {
    type Err = StreamErr<KafkaErr>;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.split(','))
    }
}

impl Display for Brokers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.bootstrap_servers())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_brokers() {
        let brokers: Brokers = "localhost:9092".parse().unwrap();
        assert_eq!(brokers.nodes(), ["localhost:9092"]);

        let brokers: Brokers = "kafka-1, kafka-2:19092,,".parse().unwrap();
        assert_eq!(brokers.bootstrap_servers(), "kafka-1:9092,kafka-2:19092");

        let brokers: Brokers = "[::1],[::1]:9093".parse().unwrap();
        assert_eq!(brokers.to_string(), "[::1]:9092,[::1]:9093");

        assert!(matches!(
            " , ".parse::<Brokers>(),
            Err(StreamErr::Connect(_))
        ));
    }
}
