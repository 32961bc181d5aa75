//! <div align="center">
//!
//!   <img src="https://raw.githubusercontent.com/SeaQL/sea-orm/master/docs/SeaQL logo dual.png" width="280"/>
//!
//!   <h1>SeaKfmt</h1>
//!
//!   <p>
//!     <strong>🌊 Render Kafka records with format strings, and parse them back</strong>
//!   </p>
//!
//! </div>
//!
//! SeaKfmt compiles a small format-string language into a template, and renders a stream of
//! records (key, value, topic, partition, offset, timestamp) into bytes, one record at a time.
//!
//! ```
//! use sea_kfmt::{compile, render, OwnedRecord, StreamKey};
//!
//! let template = compile("%t:%p:%o %S %s\\n").unwrap();
//! let record = OwnedRecord::new(&StreamKey::new("hello").unwrap(), 0, 7).with_value("world");
//! assert_eq!(render(&template, &record).unwrap(), b"hello:0:7 5 world\n");
//! ```
//!
//! The same language describes input: `compile_reader("%k=%v\\n")` parses `key=value` lines
//! into records to be produced.
//!
//! ## Architecture
//!
//! `sea-kfmt` is the facade crate re-exporting implementation from a number of sub-crates:
//!
//! + [sea-kfmt-types](https://github.com/SeaQL/sea-kfmt/tree/main/sea-kfmt-types)
//! + [sea-kfmt-format](https://github.com/SeaQL/sea-kfmt/tree/main/sea-kfmt-format)
//! + [sea-kfmt-kafka](https://github.com/SeaQL/sea-kfmt/tree/main/sea-kfmt-kafka), with the
//!   `kfmt-consume` and `kfmt-produce` executables

#![cfg_attr(docsrs, feature(doc_cfg))]

pub use sea_kfmt_format::*;
pub use sea_kfmt_types::*;

#[cfg(feature = "sea-kfmt-kafka")]
#[cfg_attr(docsrs, doc(cfg(feature = "kafka")))]
pub use sea_kfmt_kafka as kafka;
