//! # 🌊 SeaKfmt Types
//!
//! This crate defines the record model shared by the formatting engine and the Kafka backend,
//! but does not provide any implementation.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(missing_debug_implementations)]

mod error;
mod record;
mod stream;

pub use error::*;
pub use record::*;
pub use stream::*;

pub mod export;
