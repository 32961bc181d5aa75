pub use futures;
pub use time;
