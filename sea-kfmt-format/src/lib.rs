//! ### `sea-kfmt-format`: the record templating engine
//!
//! A format string is compiled once into a [`Template`], which then renders any number of
//! records into bytes. The same language is used to parse records out of an input stream
//! on the produce side, see [`InputFormat`].
//!
//! Literal text is copied verbatim, except for `\` and `%`:
//!
//! ```ignore
//! \n \r \t       newline, carriage return, tab
//! \xHH           one byte, from two hex digits
//! %s %v          value
//! %S %V          length of value, decimal
//! %R             length of value, 8 bytes big endian
//! %k             key
//! %K             length of key, decimal
//! %t             topic
//! %p             partition
//! %o             offset
//! %T             timestamp, milliseconds since epoch
//! %T{strftime[%Y-%m-%d]}  timestamp, formatted
//! %%             a literal `%`
//! ```
//!
//! The strftime pattern is enclosed by any delimiter; `{`, `[` and `(` are closed by their
//! counterpart, anything else closes itself. The delimiter may be repeated so that the pattern
//! can contain it: `%T{strftime[[%H:%M [UTC] ]]}`. The pattern ends at the first run of as
//! many closers as there were openers.
//!
//! ```
//! use sea_kfmt_format::{Renderer, Template};
//! use sea_kfmt_types::{OwnedRecord, StreamKey};
//!
//! let template: Template = "%t:%p:%o:%k=%v\\n".parse().unwrap();
//! let record = OwnedRecord::new(&StreamKey::new("foo").unwrap(), 3, 42)
//!     .with_key("k")
//!     .with_value("v");
//! let mut renderer = Renderer::new();
//! assert_eq!(renderer.render(&template, &record).unwrap(), b"foo:3:42:k=v\n");
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(missing_debug_implementations)]

mod compiler;
mod delimit;
mod directive;
mod driver;
mod error;
mod escape;
mod extract;
mod funnel;
mod input;
mod render;
mod template;

pub use compiler::*;
pub use delimit::*;
pub use driver::*;
pub use error::*;
pub use extract::*;
pub use funnel::*;
pub use input::*;
pub use render::*;
pub use template::*;

/// The format used when none is given: the value followed by a newline.
pub const DEFAULT_FORMAT: &str = "%v\\n";
